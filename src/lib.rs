//! # Malt Core Library
//!
//! This crate contains the core logic and building blocks of the `malt` tool – a formula-driven
//! installer that builds command-line tools from source.
//!
//! `malt` reads a declarative formula (`malt.toml`) describing one third-party tool – source
//! archive, checksum, build toolchain, smoke test – and executes the install lifecycle as one
//! synchronous sequence: fetch, verify, build, install, test.
//!
//! This library is built for the `malt` CLI, but you can also reuse it as a backend in other tools.
//!
//! ## Modules Overview
//! - [`formula`] – Parsing, serialization and auditing of `malt.toml` formula files
//! - [`fetch`] – Acquiring source archives, checksum verification and extraction
//! - [`builder`] – Invoking the declared toolchain with version/commit/date injection
//! - [`installer`] – Installing binaries under a prefix and keeping install receipts
//! - [`smoke`] – Validating an installed binary via its version flag
//! - [`util`] – Shared utilities (paths, hashing, executable discovery)
//! - [`global`] – Global state (the archive cache directory)

pub mod formula;
pub mod error;
pub mod fetch;
pub mod builder;
pub mod installer;
pub mod smoke;
pub mod util;
pub mod global;

pub use formula::*;
pub use error::*;
pub use fetch::*;
pub use builder::*;
pub use installer::*;
pub use smoke::*;
pub use util::*;
pub use global::cache::*;
