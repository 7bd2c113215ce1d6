//! Dependency requests and their resolved form.

use core::fmt::{self, Display};

/// A dependency *request*: a package identified by name only.
///
/// Requests are resolved against a [`PackageSource`](crate::source::PackageSource)
/// into [`Dependency`] values carrying the library output location.
#[derive(Debug, Clone, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct DependencySpec {
    /// Name of the requested package, e.g. `wayland` or `vulkan-loader`.
    pub name: String,
}

impl DependencySpec {
    /// Creates a request for the package with the given name.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for DependencySpec {
    #[expect(
        clippy::min_ident_chars,
        reason = "It's a core library trait implementation"
    )]
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

impl From<&str> for DependencySpec {
    #[inline]
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A resolved dependency: the package name plus its library output directory.
///
/// The library directory is kept as a string rather than a path: its only use
/// is to be concatenated into the search-path environment variable, whose
/// idempotence guarantee is defined over bytes.
#[derive(Debug, Clone, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct Dependency {
    /// Package name, as requested.
    pub name: String,
    /// Directory containing the package's shared libraries.
    #[serde(rename = "lib-dir")]
    pub lib_dir: String,
}

impl Dependency {
    /// Creates a resolved dependency from its name and library directory.
    #[inline]
    pub fn new(name: impl Into<String>, lib_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lib_dir: lib_dir.into(),
        }
    }
}
