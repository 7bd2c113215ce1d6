//! Loading of the `devshell.toml` manifest.
//!
//! The manifest is the one piece of user configuration: which packages the
//! shell needs, which toolchain, and optionally a package source overriding
//! the built-in system channel. Everything omitted falls back to the
//! conventional defaults, so an empty file is a valid manifest.

use std::{collections::HashMap, fs, io, path::Path};

use devshell_resolve::{
    dependency::{Dependency, DependencySpec},
    source::PackageSource,
    toolchain::{ToolchainChannel, ToolchainSpec},
};

/// Conventional manifest file name, looked up in the working directory.
pub const DEFAULT_MANIFEST_FILE: &str = "devshell.toml";

/// Dependency names assumed when the manifest does not list any:
/// the native windowing/graphics set the built-in source carries.
pub const DEFAULT_DEPENDENCIES: [&str; 4] =
    ["wayland", "libxkbcommon", "pkg-config", "vulkan-loader"];

/// A parsed `devshell.toml`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct Manifest {
    /// Requested packages, in search-path precedence order.
    /// `None` means the conventional default set, while an explicit empty
    /// list is kept as-is and rejected later at resolution time.
    pub dependencies: Option<Vec<DependencySpec>>,

    /// Toolchain selection.
    #[serde(default)]
    pub toolchain: ToolchainTable,

    /// Package source overrides.
    #[serde(default)]
    pub source: SourceTable,
}

/// The `[toolchain]` table.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct ToolchainTable {
    /// Release channel; `stable` when omitted.
    pub channel: Option<ToolchainChannel>,
    /// Optional component extensions, e.g. `rust-src` for editor tooling.
    #[serde(default)]
    pub components: Vec<String>,
}

/// The `[source]` table: overrides applied on top of the built-in system
/// channel.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct SourceTable {
    /// Base library path; first segment of the derived search path.
    pub base_lib_dir: Option<String>,
    /// Per-package overrides, keyed by package name.
    #[serde(default)]
    pub packages: HashMap<String, PackageTable>,
}

/// A `[source.packages.<name>]` table.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct PackageTable {
    /// Directory containing the package's shared libraries.
    pub lib_dir: String,
}

impl Manifest {
    /// Reads and parses the manifest at `path`. A missing file yields the
    /// all-defaults manifest.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    #[inline]
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                log::debug!("no manifest at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ManifestError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Self::parse(&contents).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses manifest text.
    ///
    /// # Errors
    ///
    /// Fails if the text is not valid TOML or fails validation.
    #[inline]
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The dependency requests, falling back to [`DEFAULT_DEPENDENCIES`].
    #[inline]
    #[must_use]
    pub fn dependency_specs(&self) -> Vec<DependencySpec> {
        self.dependencies.clone().unwrap_or_else(|| {
            DEFAULT_DEPENDENCIES
                .iter()
                .copied()
                .map(DependencySpec::from)
                .collect()
        })
    }

    /// The toolchain spec the manifest selects.
    #[inline]
    #[must_use]
    pub fn toolchain_spec(&self) -> ToolchainSpec {
        let channel = self
            .toolchain
            .channel
            .clone()
            .unwrap_or(ToolchainChannel::Stable);
        let mut spec = ToolchainSpec::new(channel);
        for component in &self.toolchain.components {
            spec = spec.with_component(component);
        }
        spec
    }

    /// The package source: the built-in system channel with the manifest's
    /// overrides applied on top.
    #[inline]
    #[must_use]
    pub fn package_source(&self) -> PackageSource {
        let mut source = PackageSource::system();
        if let Some(base_lib_dir) = &self.source.base_lib_dir {
            source.base_lib_dir.clone_from(base_lib_dir);
        }
        for (name, package) in &self.source.packages {
            source.insert(Dependency::new(name, &package.lib_dir));
        }
        source
    }
}

/// An error indicating that the manifest could not be loaded.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub enum ManifestError {
    /// Reading the manifest file failed.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        /// Path of the manifest file.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The manifest file is not valid TOML.
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        /// Path of the manifest file.
        path: String,
        /// Source of the error.
        source: toml::de::Error,
    },
}
