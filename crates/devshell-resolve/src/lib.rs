//! Resolver of reproducible dev-shell environment descriptors.
//!
//! This library turns a declarative description of a development shell,
//! a list of native dependency names plus a toolchain selection,
//! into an immutable [`EnvironmentDescriptor`](descriptor::EnvironmentDescriptor):
//! the set of packages to materialize and the environment variables to
//! export into the session.
//!
//! # How it works
//!
//! Dependency names are looked up in an explicit [`PackageSource`](source::PackageSource),
//! a validated mapping from name to library output directory. The toolchain
//! is obtained through an injected [`ToolchainFetcher`](toolchain::ToolchainFetcher)
//! capability, so tests never touch the network or `rustup`. Resolution is a
//! pure, one-shot computation: it either produces a complete descriptor or
//! fails with one of the errors in [`descriptor::ResolveError`], never a
//! partial environment.

pub mod command;
pub mod dependency;
pub mod descriptor;
pub mod source;
pub mod toolchain;
