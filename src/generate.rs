//! Configuration generators.
//!
//! A generator is any iterator of configuration values; these are the
//! stock ones.

/// Filesystem generators yielding `file://` URLs.
pub mod fs;

pub use fs::{directory_generator, entry_generator, file_generator};
