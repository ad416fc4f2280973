//! # Storage Layer
//!
//! Caller-side persistence for the outline CLI. The engine itself never
//! touches the file system; these types read and write what the CLI hands
//! to it and gets back.
//!
//! | Data | Format | Type |
//! |------|--------|------|
//! | Flat task lists | JSONL (one task per line) | [`TaskStore`] |
//! | Config | TOML | [`Config`] |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)

mod jsonl;
mod config;

pub use jsonl::TaskStore;
pub use config::{Config, ConfigError, DisplayConfig};
