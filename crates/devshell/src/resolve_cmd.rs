//! `devshell resolve`

use std::path::PathBuf;

use devshell_resolve::descriptor::{resolve, EnvironmentDescriptor};
use devshell_resolve::toolchain::RustupFetcher;

use crate::manifest::{Manifest, DEFAULT_MANIFEST_FILE};

/// Arguments for resolving a manifest into shell exports.
#[derive(Debug, Clone, clap::Parser)]
#[non_exhaustive]
pub struct Resolve {
    /// Path to the `devshell.toml` manifest.
    #[clap(long, short, default_value = DEFAULT_MANIFEST_FILE)]
    pub manifest: PathBuf,

    /// Install the requested toolchain and components through `rustup` when
    /// they are missing, instead of failing the resolution.
    #[clap(long, action)]
    pub auto_install_toolchain: bool,
}

impl Resolve {
    /// Resolve the manifest and print one `export` line per variable,
    /// suitable for `eval "$(devshell resolve)"`.
    ///
    /// A missing toolchain fails the resolution unless
    /// `--auto-install-toolchain` was given, in which case it is installed
    /// through `rustup` as part of the fetch. Any rustup failure aborts
    /// with nothing printed.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded or resolution fails.
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        let descriptor = self.resolve_manifest()?;
        print!("{}", render_exports(&descriptor));
        Ok(())
    }

    /// Loads the manifest and resolves it with the real rustup fetcher.
    pub(crate) fn resolve_manifest(&self) -> anyhow::Result<EnvironmentDescriptor> {
        let manifest = Manifest::load(&self.manifest)?;
        log::debug!("resolving manifest {}", self.manifest.display());

        let descriptor = resolve(
            &manifest.dependency_specs(),
            &manifest.toolchain_spec(),
            &manifest.package_source(),
            &RustupFetcher::new(self.auto_install_toolchain),
        )?;
        Ok(descriptor)
    }
}

/// Renders the descriptor's exports as eval-able POSIX shell.
pub(crate) fn render_exports(descriptor: &EnvironmentDescriptor) -> String {
    let mut rendered = String::new();
    for (name, value) in &descriptor.exports {
        rendered.push_str("export ");
        rendered.push_str(name);
        rendered.push('=');
        rendered.push_str(&sh_single_quote(value));
        rendered.push('\n');
    }
    rendered
}

/// Single-quotes a value for POSIX shells; embedded quotes become `'\''`.
fn sh_single_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for character in value.chars() {
        if character == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(character);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod test {
    use clap::Parser as _;
    use devshell_resolve::descriptor::{BACKTRACE_VAR, SEARCH_PATH_VAR};
    use devshell_resolve::toolchain::Toolchain;

    use super::*;

    #[test_log::test]
    fn toolchain_install_is_opt_in() {
        let default_args = Resolve::parse_from(["resolve"]);
        assert!(!default_args.auto_install_toolchain);

        let opted_in = Resolve::parse_from(["resolve", "--auto-install-toolchain"]);
        assert!(opted_in.auto_install_toolchain);
    }

    fn descriptor(search_path: &str) -> EnvironmentDescriptor {
        EnvironmentDescriptor {
            dependencies: Vec::new(),
            toolchain: Toolchain {
                channel: "stable".to_owned(),
                components: Vec::new(),
            },
            exports: vec![
                (SEARCH_PATH_VAR.to_owned(), search_path.to_owned()),
                (BACKTRACE_VAR.to_owned(), "1".to_owned()),
            ],
        }
    }

    #[test_log::test]
    fn exports_render_one_line_per_variable() {
        let rendered = render_exports(&descriptor("/base/lib:/a/lib"));
        assert_eq!(
            rendered,
            format!("export {SEARCH_PATH_VAR}='/base/lib:/a/lib'\nexport {BACKTRACE_VAR}='1'\n")
        );
    }

    #[test_log::test]
    fn embedded_quote_survives_quoting() {
        assert_eq!(sh_single_quote("it's"), "'it'\\''s'");
    }

    #[test_log::test]
    fn plain_value_is_just_wrapped() {
        assert_eq!(sh_single_quote("/base/lib"), "'/base/lib'");
    }
}
