//! `devshell show`

use std::path::PathBuf;

use devshell_resolve::{
    descriptor::resolve,
    toolchain::{Toolchain, ToolchainFetcher, ToolchainSpec, ToolchainUnavailableError},
};

use crate::manifest::{Manifest, DEFAULT_MANIFEST_FILE};

/// `devshell show`
#[derive(Debug, Clone, clap::Parser)]
#[non_exhaustive]
pub struct Show {
    /// Path to the `devshell.toml` manifest.
    #[clap(long, short, default_value = DEFAULT_MANIFEST_FILE)]
    pub manifest: PathBuf,

    /// What to show.
    #[clap(subcommand)]
    pub command: ShowCommand,
}

/// All of the `show` subcommands.
#[derive(Debug, Clone, clap::Subcommand)]
#[non_exhaustive]
pub enum ShowCommand {
    /// The derived dynamic-linker search path.
    SearchPath,

    /// The whole resolved descriptor, as JSON.
    Descriptor,
}

/// Renders the toolchain the spec names without touching `rustup`.
///
/// `show` is a read-only inspection command, so it must not install
/// anything as a side effect.
struct PlannedFetcher;

impl ToolchainFetcher for PlannedFetcher {
    fn fetch(&self, spec: &ToolchainSpec) -> Result<Toolchain, ToolchainUnavailableError> {
        Ok(Toolchain {
            channel: spec.channel.rustup_name(),
            components: spec.components.clone(),
        })
    }
}

impl Show {
    /// Prints the requested value to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded or resolution fails.
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        let manifest = Manifest::load(&self.manifest)?;
        let descriptor = resolve(
            &manifest.dependency_specs(),
            &manifest.toolchain_spec(),
            &manifest.package_source(),
            &PlannedFetcher,
        )?;

        match self.command {
            ShowCommand::SearchPath => println!("{}", descriptor.search_path()),
            ShowCommand::Descriptor => {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use devshell_resolve::{dependency::DependencySpec, source::PackageSource};

    use super::*;

    #[test_log::test]
    fn planned_fetcher_echoes_the_spec() {
        let spec = ToolchainSpec::default().with_component("rust-src");
        let toolchain = PlannedFetcher.fetch(&spec).unwrap();
        assert_eq!(toolchain.channel, "stable");
        assert_eq!(toolchain.components, ["rust-src"]);
    }

    #[test_log::test]
    fn descriptor_serializes_to_json() {
        let descriptor = resolve(
            &[DependencySpec::from("wayland")],
            &ToolchainSpec::default(),
            &PackageSource::system(),
            &PlannedFetcher,
        )
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&descriptor).unwrap()).unwrap();
        assert_eq!(json["toolchain"]["channel"], "stable");
        assert_eq!(json["dependencies"][0]["name"], "wayland");
    }
}
