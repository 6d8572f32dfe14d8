//! Blob Installer (C4) and Parity Planner/Creator (C5).
//!
//! Overview
//! - Content identity: `(size, sha256)`, carried as [`carb_core::BlobId`].
//! - Atomicity: hardlink-first install; the atomicity of
//!   link-with-existing-target on a single filesystem is the correctness
//!   primitive. Cross-device staging falls back to no-clobber rename, then
//!   no-clobber copy.
//! - Blobs are immutable and append-only at the `BlobId` granularity; this
//!   crate never rewrites or deletes a blob once installed.
//! - Parity creation is at-most-once per `BlobId`, coordinated by a
//!   `lock_<BlobId>` directory acting as a test-and-set primitive.

#![deny(unsafe_code)]

pub mod install;
pub mod parity;

pub use install::{install, InstallOutcome};
pub use parity::codec::FecCodec;
pub use parity::creator::{create_parity, ParityOutcome};
pub use parity::planner::plan;
