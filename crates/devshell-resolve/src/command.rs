//! Utilities for executing [commands](Command).

use std::{
    io,
    process::{Command, Output},
};

/// An error indicating failure while executing some command.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub enum CommandExecError {
    /// IO error occurred while spawning some command.
    #[error("IO error occurred while calling `{command}`: {source}")]
    Io {
        /// Rendering of the command which was called.
        command: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The command ran but exited unsuccessfully.
    #[error("calling `{command}` was not successful: {stderr}")]
    ExecFail {
        /// Rendering of the command which was called.
        command: String,
        /// Captured standard error of the command.
        stderr: String,
    },
}

/// Renders a command the way it would be typed into a shell.
fn render(command: &Command) -> String {
    let mut rendered = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// Executes the command, returning its output.
///
/// # Errors
///
/// Returns an error if the command cannot be spawned or exits unsuccessfully.
pub(crate) fn execute_command(command: &mut Command) -> Result<Output, CommandExecError> {
    log::trace!("executing `{}`", render(command));
    let output = match command.output() {
        Ok(output) => output,
        Err(source) => {
            return Err(CommandExecError::Io {
                command: render(command),
                source,
            })
        }
    };
    if !output.status.success() {
        return Err(CommandExecError::ExecFail {
            command: render(command),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}
