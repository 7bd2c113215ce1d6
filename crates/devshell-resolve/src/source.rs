//! The package source: an explicit mapping from dependency name to package.

use std::collections::HashMap;

use crate::dependency::Dependency;

/// Library directory assumed when the caller does not configure one.
pub const DEFAULT_BASE_LIB_DIR: &str = "/usr/lib";

/// A source of packages to resolve dependency names against.
///
/// Lookups are explicit and validated: an unknown name is an error at
/// resolution time, never a silently missing attribute.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct PackageSource {
    /// Fixed base library path; always the first segment of the derived
    /// search path, ahead of every dependency.
    #[serde(rename = "base-lib-dir")]
    pub base_lib_dir: String,
    /// Mapping from package name to its resolved form.
    pub packages: HashMap<String, Dependency>,
}

impl PackageSource {
    /// Creates an empty source with the given base library path.
    #[inline]
    pub fn new(base_lib_dir: impl Into<String>) -> Self {
        Self {
            base_lib_dir: base_lib_dir.into(),
            packages: HashMap::new(),
        }
    }

    /// The conventional system channel: the packages a native
    /// windowing/graphics project needs, rooted under [`DEFAULT_BASE_LIB_DIR`].
    ///
    /// Used when the caller supplies no package-source configuration.
    #[inline]
    #[must_use]
    pub fn system() -> Self {
        let mut source = Self::new(DEFAULT_BASE_LIB_DIR);
        for name in ["wayland", "libxkbcommon", "pkg-config", "vulkan-loader"] {
            source.insert(Dependency::new(
                name,
                format!("{DEFAULT_BASE_LIB_DIR}/{name}/lib"),
            ));
        }
        source
    }

    /// Adds a package to the source, replacing any package of the same name.
    #[inline]
    pub fn insert(&mut self, package: Dependency) {
        self.packages.insert(package.name.clone(), package);
    }

    /// Looks up a package by name.
    ///
    /// # Errors
    ///
    /// Fails if no package of that name exists in this source.
    #[inline]
    pub fn lookup(&self, name: &str) -> Result<&Dependency, UnresolvedDependencyError> {
        log::trace!("looking up package `{name}`");
        self.packages.get(name).ok_or_else(|| {
            UnresolvedDependencyError {
                name: name.to_owned(),
            }
        })
    }
}

impl Default for PackageSource {
    #[inline]
    fn default() -> Self {
        Self::system()
    }
}

/// An error indicating that a named package does not exist in the source.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("package `{name}` not found in the configured package source")]
#[non_exhaustive]
pub struct UnresolvedDependencyError {
    /// Name of the package that could not be found.
    pub name: String,
}
