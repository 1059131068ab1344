//! Configuration loading
//!
//! The configuration structs live in `guestlink-domain`; this module reads
//! them from the environment or a TOML/JSON file.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths, validate};
