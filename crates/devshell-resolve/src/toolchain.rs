//! Toolchain selection and the fetcher capability that obtains it.
//!
//! The descriptor names a release channel plus optional component
//! extensions. Actually obtaining that toolchain is an external, fallible
//! operation (a network fetch through `rustup`), so it is modeled as the
//! [`ToolchainFetcher`] trait and injected into resolution. Tests substitute
//! a mock; the real implementation is [`RustupFetcher`].

use core::{
    fmt::{self, Display},
    str::FromStr,
};
use std::process::Command;

use crate::command::{execute_command, CommandExecError};

/// A toolchain release channel.
#[derive(Debug, Clone, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
#[expect(clippy::exhaustive_enums, reason = "the channel grammar is closed")]
pub enum ToolchainChannel {
    /// The current stable release.
    Stable,
    /// Alias of [`Stable`](ToolchainChannel::Stable) that tracks whatever
    /// the newest stable release is at fetch time.
    Latest,
    /// A pinned release, e.g. `1.81.0`.
    Pinned(semver::Version),
}

impl ToolchainChannel {
    /// The channel name understood by `rustup`.
    ///
    /// `latest` has no rustup spelling of its own; it selects the newest
    /// stable release, which is exactly what rustup's `stable` channel does.
    #[inline]
    #[must_use]
    pub fn rustup_name(&self) -> String {
        match self {
            Self::Stable | Self::Latest => "stable".to_owned(),
            Self::Pinned(version) => version.to_string(),
        }
    }
}

impl Display for ToolchainChannel {
    #[expect(
        clippy::min_ident_chars,
        reason = "It's a core library trait implementation"
    )]
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str("stable"),
            Self::Latest => f.write_str("latest"),
            Self::Pinned(version) => version.fmt(f),
        }
    }
}

impl FromStr for ToolchainChannel {
    type Err = ParseChannelError;

    #[inline]
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "stable" => Ok(Self::Stable),
            "latest" => Ok(Self::Latest),
            other => {
                let version = semver::Version::parse(other).map_err(|source| ParseChannelError {
                    channel: other.to_owned(),
                    source,
                })?;
                Ok(Self::Pinned(version))
            }
        }
    }
}

impl TryFrom<String> for ToolchainChannel {
    type Error = ParseChannelError;

    #[inline]
    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<ToolchainChannel> for String {
    #[inline]
    fn from(channel: ToolchainChannel) -> Self {
        channel.to_string()
    }
}

/// An error indicating that a channel string is neither a known channel name
/// nor a semantic version.
#[derive(Debug, thiserror::Error)]
#[error("`{channel}` is not a toolchain channel: {source}")]
#[non_exhaustive]
pub struct ParseChannelError {
    /// The rejected channel string.
    pub channel: String,
    /// Source of the error.
    pub source: semver::Error,
}

/// The toolchain selection of a descriptor: a channel plus optional
/// component extensions, e.g. `rust-src` for editor tooling.
#[derive(Debug, Clone, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct ToolchainSpec {
    /// The release channel to obtain.
    pub channel: ToolchainChannel,
    /// Optional components to add on top of the default profile.
    #[serde(default)]
    pub components: Vec<String>,
}

impl ToolchainSpec {
    /// Creates a spec for the given channel with no extra components.
    #[inline]
    pub const fn new(channel: ToolchainChannel) -> Self {
        Self {
            channel,
            components: Vec::new(),
        }
    }

    /// Adds a component extension to the spec.
    #[inline]
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }
}

impl Default for ToolchainSpec {
    #[inline]
    fn default() -> Self {
        Self::new(ToolchainChannel::Stable)
    }
}

/// A toolchain that a fetcher has actually made available.
#[derive(Debug, Clone, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[expect(clippy::exhaustive_structs, reason = "intended to be exhaustive")]
pub struct Toolchain {
    /// The concrete channel name the fetcher materialized, in rustup
    /// spelling.
    pub channel: String,
    /// Components available on top of the default profile.
    pub components: Vec<String>,
}

/// Capability to obtain the toolchain named by a [`ToolchainSpec`].
///
/// The fetch is best effort and all-or-nothing: there is no retry, no cache
/// and no offline fallback, so any failure aborts the whole resolution.
pub trait ToolchainFetcher {
    /// Obtains the requested toolchain.
    ///
    /// # Errors
    ///
    /// Fails if the channel does not exist or cannot be fetched.
    fn fetch(&self, spec: &ToolchainSpec) -> Result<Toolchain, ToolchainUnavailableError>;
}

/// An error indicating that the requested toolchain cannot be obtained.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub enum ToolchainUnavailableError {
    /// The channel or version does not exist in the source.
    #[error("toolchain channel `{channel}` does not exist")]
    UnknownChannel {
        /// The requested channel, in rustup spelling.
        channel: String,
    },
    /// The toolchain is not installed and installing was not enabled.
    #[error("toolchain `{channel}` is not installed and installing was not enabled")]
    NotInstalled {
        /// The requested channel, in rustup spelling.
        channel: String,
    },
    /// Requested components are missing and installing was not enabled.
    #[error(
        "components {components:?} of toolchain `{channel}` are not installed \
         and installing was not enabled"
    )]
    ComponentsNotInstalled {
        /// The requested channel, in rustup spelling.
        channel: String,
        /// The components that were requested.
        components: Vec<String>,
    },
    /// Fetching the toolchain failed.
    #[error("failed to fetch toolchain `{channel}`: {source}")]
    FetchFailed {
        /// The requested channel, in rustup spelling.
        channel: String,
        /// Source of the error.
        source: CommandExecError,
    },
}

/// Fetches toolchains through `rustup`.
///
/// By default this only verifies, via `rustup toolchain list` and
/// `rustup component list`, that the requested toolchain and components are
/// already installed, and fails otherwise. With
/// [`auto_install`](Self::auto_install) enabled it installs the missing
/// pieces, pretty much running:
///
/// ```text
/// rustup toolchain add stable
/// rustup component add --toolchain stable rust-src
/// ```
#[derive(Debug, Clone, Copy, Default)]
#[expect(clippy::exhaustive_structs, reason = "intended to be exhaustive")]
pub struct RustupFetcher {
    /// Install the toolchain and missing components instead of failing
    /// when they are not present.
    pub auto_install: bool,
}

impl RustupFetcher {
    /// Creates a fetcher; `auto_install` enables installation of missing
    /// toolchains and components.
    #[inline]
    #[must_use]
    pub const fn new(auto_install: bool) -> Self {
        Self { auto_install }
    }

    /// Checks if the given toolchain is installed using `rustup`.
    ///
    /// # Errors
    ///
    /// Returns an error if any error occurs while using `rustup`.
    #[inline]
    pub fn is_toolchain_installed(channel: &str) -> Result<bool, CommandExecError> {
        let mut command = Command::new("rustup");
        command.args(["toolchain", "list"]);
        let output = execute_command(&mut command)?;

        let toolchain_list = String::from_utf8_lossy(&output.stdout);
        let installed = toolchain_list
            .split_whitespace()
            .any(|toolchain| toolchain.starts_with(channel));
        Ok(installed)
    }

    /// Checks if all the requested components of the given toolchain are
    /// installed using `rustup`.
    ///
    /// # Errors
    ///
    /// Returns an error if any error occurs while using `rustup`.
    #[inline]
    pub fn components_installed(channel: &str, components: &[String]) -> Result<bool, CommandExecError> {
        if components.is_empty() {
            return Ok(true);
        }

        let mut command = Command::new("rustup");
        command
            .args(["component", "list", "--toolchain"])
            .arg(channel);
        let output = execute_command(&mut command)?;

        let component_list = String::from_utf8_lossy(&output.stdout);
        let component_list_lines = component_list.lines().collect::<Vec<_>>();
        let installed = components.iter().all(|component| {
            component_list_lines.iter().any(|line| {
                line.starts_with(component.as_str()) && line.ends_with("(installed)")
            })
        });
        Ok(installed)
    }

    /// Installs the given toolchain using `rustup`.
    fn install_toolchain(channel: &str) -> Result<(), CommandExecError> {
        let mut command = Command::new("rustup");
        command.args(["toolchain", "add"]).arg(channel);
        let _output = execute_command(&mut command)?;
        Ok(())
    }

    /// Installs the requested components for the given toolchain using `rustup`.
    fn install_components(channel: &str, components: &[String]) -> Result<(), CommandExecError> {
        let mut command = Command::new("rustup");
        command
            .args(["component", "add", "--toolchain"])
            .arg(channel)
            .args(components);
        let _output = execute_command(&mut command)?;
        Ok(())
    }
}

impl ToolchainFetcher for RustupFetcher {
    #[inline]
    fn fetch(&self, spec: &ToolchainSpec) -> Result<Toolchain, ToolchainUnavailableError> {
        let channel = spec.channel.rustup_name();
        let fetch_failed = |source: CommandExecError| ToolchainUnavailableError::FetchFailed {
            channel: channel.clone(),
            source,
        };

        if Self::is_toolchain_installed(&channel).map_err(fetch_failed)? {
            log::debug!("toolchain {channel} is already installed");
        } else if self.auto_install {
            log::debug!("toolchain {channel} is not installed yet");
            Self::install_toolchain(&channel).map_err(fetch_failed)?;
        } else {
            return Err(ToolchainUnavailableError::NotInstalled { channel });
        }

        if Self::components_installed(&channel, &spec.components).map_err(fetch_failed)? {
            log::debug!("all requested components of toolchain {channel} are installed");
        } else if self.auto_install {
            log::debug!("not all requested components of toolchain {channel} are installed yet");
            Self::install_components(&channel, &spec.components).map_err(fetch_failed)?;
        } else {
            return Err(ToolchainUnavailableError::ComponentsNotInstalled {
                channel,
                components: spec.components.clone(),
            });
        }

        Ok(Toolchain {
            channel,
            components: spec.components.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn channel_roundtrip() {
        for text in ["stable", "latest", "1.81.0"] {
            let channel: ToolchainChannel = text.parse().unwrap();
            assert_eq!(channel.to_string(), text);
        }
    }

    #[test_log::test]
    fn latest_and_stable_share_a_rustup_name() {
        assert_eq!(ToolchainChannel::Stable.rustup_name(), "stable");
        assert_eq!(ToolchainChannel::Latest.rustup_name(), "stable");
    }

    #[test_log::test]
    fn garbage_channel_is_rejected() {
        let err = "nightly-or-whatever".parse::<ToolchainChannel>().unwrap_err();
        assert_eq!(err.channel, "nightly-or-whatever");
    }

    #[test_log::test]
    fn pinned_channel_keeps_its_version() {
        let channel: ToolchainChannel = "1.81.0".parse().unwrap();
        assert_eq!(channel.rustup_name(), "1.81.0");
        assert_eq!(channel, ToolchainChannel::Pinned(semver::Version::new(1, 81, 0)));
    }

    #[test_log::test]
    fn fetcher_defaults_to_verify_only() {
        assert!(!RustupFetcher::default().auto_install);
        assert!(RustupFetcher::new(true).auto_install);
    }

    #[test_log::test]
    fn spec_builder_accumulates_components() {
        let spec = ToolchainSpec::default()
            .with_component("rust-src")
            .with_component("rustc-dev");
        assert_eq!(spec.components, ["rust-src", "rustc-dev"]);
    }
}
