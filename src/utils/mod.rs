//! Shared utilities.

mod fs;

pub use fs::{read_json, write_json_atomic};
