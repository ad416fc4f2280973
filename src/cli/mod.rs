//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `import <FILE> [--output <JSONL>]` | Import an MS Project XML document |
//! | `show <JSONL> [--collapse <ID>]... [--rollup] [--save]` | Redisplay a stored task list |
//! | `config` | Print the effective configuration |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Indented outline
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Logs go to stderr through `tracing`. Use `--verbose` (or `-v`) for debug
//! output, including import progress:
//! ```bash
//! outline --verbose import plan.xml
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod import;
mod show;

pub use app::{run, Cli, Commands};
pub use output::{format_row, Output, OutputFormat};
