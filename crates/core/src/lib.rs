//! symcache-core
//!
//! Core library for maintaining a local cache of macOS system binaries and a
//! UUID-to-binary lookup database used during symbolication.
//!
//! This crate holds the model, Mach-O detection, configuration, the UUID
//! database layout, and the services that drive external platform tools.
//! All substantive logic lives here so it is testable without a mounted share
//! or macOS toolchain, and reusable from the CLI frontends.

pub mod model;
pub mod macho;
pub mod config;
pub mod retry;
pub mod tools;
pub mod db;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
