//! The environment descriptor and the resolution that produces it.

use crate::{
    dependency::{Dependency, DependencySpec},
    source::{PackageSource, UnresolvedDependencyError},
    toolchain::{Toolchain, ToolchainFetcher, ToolchainSpec, ToolchainUnavailableError},
};

/// The environment variable consulted by the dynamic linker to locate
/// shared libraries at run time.
#[cfg(target_os = "macos")]
pub const SEARCH_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
/// The environment variable consulted by the dynamic linker to locate
/// shared libraries at run time.
#[cfg(target_os = "windows")]
pub const SEARCH_PATH_VAR: &str = "PATH";
/// The environment variable consulted by the dynamic linker to locate
/// shared libraries at run time.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const SEARCH_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// The platform's path-list delimiter.
#[cfg(target_os = "windows")]
pub const PATH_LIST_DELIMITER: char = ';';
/// The platform's path-list delimiter.
#[cfg(not(target_os = "windows"))]
pub const PATH_LIST_DELIMITER: char = ':';

/// Diagnostics variable exported into every resolved environment.
pub const BACKTRACE_VAR: &str = "RUST_BACKTRACE";

/// A resolved development environment: the packages to materialize and the
/// variables to export.
///
/// Constructed once by [`resolve`] and never mutated; tearing it down is
/// dropping it. The search-path variable is guaranteed to hold the source's
/// base library path followed by every dependency's library directory, in
/// declaration order, joined by [`PATH_LIST_DELIMITER`].
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
#[expect(clippy::exhaustive_structs, reason = "intended to be exhaustive")]
pub struct EnvironmentDescriptor {
    /// The packages to materialize, in declaration order.
    pub dependencies: Vec<Dependency>,
    /// The toolchain the fetcher made available.
    pub toolchain: Toolchain,
    /// Environment variables to export, in a fixed order.
    pub exports: Vec<(String, String)>,
}

impl EnvironmentDescriptor {
    /// The value of the dynamic-linker search-path variable.
    #[inline]
    #[must_use]
    pub fn search_path(&self) -> &str {
        self.exports
            .iter()
            .find(|(name, _)| name == SEARCH_PATH_VAR)
            .map_or("", |(_, value)| value.as_str())
    }
}

/// Resolves a dependency list and a toolchain selection into an
/// [`EnvironmentDescriptor`].
///
/// Pure and one-shot: looks every name up in `source`, obtains the
/// toolchain through `fetcher`, folds the search path and returns. Nothing
/// is installed or exported here; that is the job of whatever shell
/// activation mechanism consumes the descriptor. On any error no partial
/// environment is produced.
///
/// # Errors
///
/// * [`ResolveError::EmptyDependencies`] if `specs` is empty.
/// * [`ResolveError::UnresolvedDependency`] if a name is unknown to `source`.
/// * [`ResolveError::ToolchainUnavailable`] if the fetcher fails.
#[expect(clippy::impl_trait_in_params, reason = "the fetcher is a capability")]
#[inline]
pub fn resolve(
    specs: &[DependencySpec],
    toolchain: &ToolchainSpec,
    source: &PackageSource,
    fetcher: &impl ToolchainFetcher,
) -> Result<EnvironmentDescriptor, ResolveError> {
    if specs.is_empty() {
        return Err(ResolveError::EmptyDependencies);
    }

    let dependencies = specs
        .iter()
        .map(|spec| source.lookup(&spec.name).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("resolved {} packages from the source", dependencies.len());

    let fetched = fetcher.fetch(toolchain)?;
    log::debug!("fetched toolchain {}", fetched.channel);

    let mut search_path = source.base_lib_dir.clone();
    for dependency in &dependencies {
        search_path.push(PATH_LIST_DELIMITER);
        search_path.push_str(&dependency.lib_dir);
    }

    let exports = vec![
        (SEARCH_PATH_VAR.to_owned(), search_path),
        (BACKTRACE_VAR.to_owned(), "1".to_owned()),
    ];

    Ok(EnvironmentDescriptor {
        dependencies,
        toolchain: fetched,
        exports,
    })
}

/// An error indicating that resolution failed; no partial environment is
/// ever produced alongside one of these.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// The dependency list was empty. Order of the list drives search-path
    /// precedence, so an empty list is a caller bug, not a valid "no deps"
    /// environment.
    #[error("dependency list is empty")]
    EmptyDependencies,
    /// A named package does not exist in the configured source.
    #[error(transparent)]
    UnresolvedDependency(#[from] UnresolvedDependencyError),
    /// The requested toolchain cannot be obtained.
    #[error(transparent)]
    ToolchainUnavailable(#[from] ToolchainUnavailableError),
}

#[cfg(test)]
mod test {
    use crate::toolchain::ToolchainChannel;

    use super::*;

    /// Fetcher that hands back the spec unchanged, or rejects every channel.
    struct MockFetcher {
        available: bool,
    }

    impl ToolchainFetcher for MockFetcher {
        fn fetch(&self, spec: &ToolchainSpec) -> Result<Toolchain, ToolchainUnavailableError> {
            let channel = spec.channel.rustup_name();
            if self.available {
                Ok(Toolchain {
                    channel,
                    components: spec.components.clone(),
                })
            } else {
                Err(ToolchainUnavailableError::UnknownChannel { channel })
            }
        }
    }

    fn abc_source() -> PackageSource {
        let mut source = PackageSource::new("/base/lib");
        source.insert(Dependency::new("a", "/a/lib"));
        source.insert(Dependency::new("b", "/b/lib"));
        source.insert(Dependency::new("c", "/c/lib"));
        source
    }

    fn specs(names: &[&str]) -> Vec<DependencySpec> {
        names.iter().copied().map(DependencySpec::from).collect()
    }

    #[test_log::test]
    fn search_path_folds_base_then_deps_in_order() {
        let descriptor = resolve(
            &specs(&["a", "b", "c"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap();

        let delimited = format!(
            "/base/lib{sep}/a/lib{sep}/b/lib{sep}/c/lib",
            sep = PATH_LIST_DELIMITER
        );
        assert_eq!(descriptor.search_path(), delimited);
        assert_eq!(
            descriptor.search_path().split(PATH_LIST_DELIMITER).count(),
            4
        );
    }

    #[test_log::test]
    fn segment_count_is_deps_plus_base() {
        for names in [&["a"][..], &["a", "b"], &["a", "b", "c"]] {
            let descriptor = resolve(
                &specs(names),
                &ToolchainSpec::default(),
                &abc_source(),
                &MockFetcher { available: true },
            )
            .unwrap();
            assert_eq!(
                descriptor.search_path().split(PATH_LIST_DELIMITER).count(),
                names.len() + 1
            );
        }
    }

    #[test_log::test]
    fn reordering_deps_reorders_segments() {
        let forward = resolve(
            &specs(&["a", "b", "c"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap();
        let backward = resolve(
            &specs(&["c", "b", "a"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap();

        assert_ne!(forward.search_path(), backward.search_path());
        let backward_segments = backward
            .search_path()
            .split(PATH_LIST_DELIMITER)
            .collect::<Vec<_>>();
        assert_eq!(
            backward_segments,
            ["/base/lib", "/c/lib", "/b/lib", "/a/lib"]
        );
    }

    #[test_log::test]
    fn duplicates_are_not_deduplicated() {
        let descriptor = resolve(
            &specs(&["a", "a"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap();
        let delimited = format!("/base/lib{sep}/a/lib{sep}/a/lib", sep = PATH_LIST_DELIMITER);
        assert_eq!(descriptor.search_path(), delimited);
    }

    #[test_log::test]
    fn identical_inputs_yield_identical_exports() {
        let run = || {
            resolve(
                &specs(&["a", "b"]),
                &ToolchainSpec::new(ToolchainChannel::Latest).with_component("rust-src"),
                &abc_source(),
                &MockFetcher { available: true },
            )
            .unwrap()
        };
        assert_eq!(run().exports, run().exports);
    }

    #[test_log::test]
    fn backtrace_is_always_enabled() {
        let descriptor = resolve(
            &specs(&["a"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap();
        assert!(descriptor
            .exports
            .contains(&(BACKTRACE_VAR.to_owned(), "1".to_owned())));
    }

    #[test_log::test]
    fn empty_dependency_list_is_rejected() {
        let err = resolve(
            &[],
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::EmptyDependencies));
    }

    #[test_log::test]
    fn unknown_dependency_fails_with_nothing_exported() {
        let err = resolve(
            &specs(&["a", "zlib"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: true },
        )
        .unwrap_err();
        let ResolveError::UnresolvedDependency(unresolved) = err else {
            panic!("expected UnresolvedDependency, got {err:?}");
        };
        assert_eq!(unresolved.name, "zlib");
    }

    #[test_log::test]
    fn unavailable_toolchain_aborts_resolution() {
        let err = resolve(
            &specs(&["a"]),
            &ToolchainSpec::default(),
            &abc_source(),
            &MockFetcher { available: false },
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::ToolchainUnavailable(_)));
    }
}
