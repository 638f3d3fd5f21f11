//! # assemblygen
//!
//! **assemblygen** is a build-time generator for dependency-injection
//! registrations. It reads the Rust sources that declare *assemblies* (impl
//! blocks whose `assemble` function registers services with a container) and
//! *resolvable initializers* (associated functions marked `#[resolvable]`),
//! and writes plain Rust alongside them:
//!
//! - a key enum per group of name-qualified registrations of one service type,
//! - a typed accessor trait per assembly,
//! - a factory per resolvable initializer that pulls its dependencies from the
//!   container and takes only the runtime arguments as parameters.
//!
//! ## Architecture
//!
//! - **[`assembly`]** - Loading sources and extracting assemblies, registrations
//!   and resolvable initializers with `syn`
//! - **[`generator`]** - Named groups, accessors, factories and Askama rendering
//! - **[`config`]** - Optional `assemblygen.toml`
//! - **[`diagnostics`]** - Located errors, warnings and notes
//! - **[`cli`]** - The `assemblygen` binary's commands
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ## Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(assemblygen)
//!     participant Load as assembly::load_sources
//!     participant Groups as generator::named_groups
//!     participant Templates as generator::templates
//!     participant Project as generator::project
//!     participant FS as File System
//!
//!     CLI->>Load: collect_input_files(inputs)
//!     Load->>Load: Parse with syn, extract assemblies<br/>and initializers
//!     Load-->>CLI: Vec<SourceUnit>, diagnostics
//!     CLI->>Groups: build_named_groups(assemblies)
//!     Groups-->>CLI: groups, duplicate-name errors
//!     CLI->>Templates: render keys, accessors, factories
//!     Templates-->>CLI: one file per source + mod.rs
//!     CLI->>Project: write_generation(output_dir)
//!     Project->>FS: Write changed files, remove stale ones
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! assemblygen generate --output src/generated src/
//! assemblygen check src/
//! ```

pub mod assembly;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod logging;
