//! # CLI Module
//!
//! Command-line interface for the `assemblygen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Extract assemblies and resolvable initializers from the inputs and write
//! one `<stem>_generated.rs` per source file plus a `mod.rs`:
//!
//! ```bash
//! assemblygen generate --output src/generated src/
//! ```
//!
//! Options:
//! - `--output <DIR>` - Output directory for generated files (required)
//! - `--config <FILE>` - Path to `assemblygen.toml` (auto-detected otherwise)
//! - `--json-output <FILE>` - Also write the extracted model as JSON
//! - `--dry-run` - Show what would change without writing
//! - `--rustfmt` - Format generated files with rustfmt
//!
//! ### `check`
//!
//! Run extraction and validation only:
//!
//! ```bash
//! assemblygen check --errors-only src/
//! ```
//!
//! Both commands exit with status `1` when any error diagnostic is reported.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{check_inputs, run, run_cli, Cli, Commands};
