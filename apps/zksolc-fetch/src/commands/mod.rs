//! Subcommand implementations for zksolc-fetch.
//!
//! - [`install`] - Download and verify a compiler version
//! - [`path`] - Print the resolved binary path
//! - [`verify`] - Verify an already downloaded binary
//! - [`status`] - Show the resolved session

pub mod install;
pub mod path;
pub mod status;
pub mod verify;
