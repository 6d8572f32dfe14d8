//! Core primitives shared by every `carb` crate: the `BlobId` content
//! identity, the run configuration value, the error taxonomy, and small
//! id/timestamp helpers.

#![deny(unsafe_code)]

/// Version of the carb-core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod blob_id;
pub mod config;
pub mod error;
pub mod ids;
pub mod model;

pub use blob_id::BlobId;
pub use config::Config;
pub use error::{Fatal, ItemError};
