//! Command line tool for resolving declarative dev-shell manifests.
//!
//! This program reads a `devshell.toml` manifest naming native dependencies
//! and a toolchain, resolves it against a package source, and prints the
//! resulting environment variables as `export` lines for the ambient shell
//! to eval:
//!
//! ```text
//! eval "$(devshell resolve)"
//! ```
//!
//! Actually materializing the packages and exporting the variables is the
//! shell's job; this tool only computes the descriptor.

pub mod manifest;
pub mod resolve_cmd;
pub mod show;

/// All of the available subcommands for `devshell`
#[derive(clap::Subcommand)]
#[non_exhaustive]
pub enum Command {
    /// Resolve the manifest and print shell `export` lines.
    Resolve(resolve_cmd::Resolve),

    /// Show some useful values.
    Show(show::Show),
}

impl Command {
    /// Runs the command
    ///
    /// # Errors
    /// Any errors during execution, usually printed to the user
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Self::Resolve(resolve) => resolve.run()?,
            Self::Show(show) => show.run()?,
        }
        Ok(())
    }
}

/// The struct representing the main CLI.
#[derive(clap::Parser)]
#[clap(author, version, about, subcommand_required = true)]
#[non_exhaustive]
pub struct Cli {
    /// The command to run.
    #[clap(subcommand)]
    pub command: Command,
}
