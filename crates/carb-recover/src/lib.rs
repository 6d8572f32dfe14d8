//! Recovery Emitter (C7): renders a standalone `sh` restore program from a
//! sealed run manifest. The emitted script is self-contained — it embeds
//! the blob/parity directories and the file list as data, and degrades to
//! a raw copy when the parity tool is absent on the recovery host.

#![deny(unsafe_code)]

pub mod entries;
pub mod script;

pub use entries::{load_recover_entries, RecoverEntry};
pub use script::render_recovery_script;
