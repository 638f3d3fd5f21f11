//! # Assembly Module
//!
//! Reads Rust source files and builds the registration model the generator
//! works from.
//!
//! ## Pipeline
//!
//! 1. [`load::collect_input_files`] expands CLI inputs into source paths
//! 2. [`load::parse_source`] parses each file with `syn`
//! 3. [`extract`] walks assemble functions and records [`Registration`]s,
//!    tracking `cfg` guards as it descends
//! 4. [`initializers`] classifies the parameters of `#[resolvable]` functions
//!
//! Everything here is per file; grouping across files happens in
//! [`crate::generator`].

pub mod extract;
pub mod guard;
pub mod initializers;
pub mod load;
pub mod tokens;
mod types;
mod vocabulary;

pub use extract::{extract_assemblies, validate_unique_registrations, ExtractOptions};
pub use initializers::extract_initializers;
pub use load::{collect_input_files, load_source, load_sources, parse_source};
pub use types::{
    is_crate_visible, AccessLevel, Assembly, InitializerParameter, ModuleScope,
    ParameterResolutionHint, Registration, ResolvableInitializer, SourceUnit,
};
pub use vocabulary::{default_registration_methods, RegistrationMethod, RegistrationVocabulary};
