//! # Generator Module
//!
//! Turns the per-file model extracted by [`crate::assembly`] into Rust source.
//!
//! ## Architecture
//!
//! ```text
//! SourceUnits → Named Groups → Accessors + Factories → Askama Templates → Files
//! ```
//!
//! 1. **Named groups** ([`named_groups`]) - Named registrations are grouped by
//!    service type across all inputs and validated for duplicate names
//! 2. **Accessors** ([`accessors`]) - One extension trait per assembly with a
//!    typed method per resolvable service
//! 3. **Factories** ([`resolvable`]) - A factory per `#[resolvable]`
//!    initializer, resolving its dependencies from the container
//! 4. **Rendering** - Askama templates produce one `<stem>_generated.rs` per
//!    input file plus a `mod.rs`
//!
//! ## Generated Structure
//!
//! ```text
//! src/generated/
//! ├── mod.rs                  # pub mod app_generated; ...
//! ├── app_generated.rs        # from src/app.rs
//! └── widgets_generated.rs    # from src/widgets/mod.rs
//! ```
//!
//! A generated file contains, in order: the imports of its source file, the
//! key enum of every named group first registered there, the accessor trait
//! of every assembly declared there, and the factory of every resolvable
//! initializer declared there.
//!
//! ## Determinism
//!
//! Rendering is a pure function of the model: no timestamps, no hash-map
//! iteration order, and declarations follow source order. Running the
//! generator twice on unchanged inputs produces byte-identical files, which
//! is what lets [`project::write_generation`] skip unchanged files.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use assemblygen::config::GeneratorConfig;
//! use assemblygen::generator::project::{generate_from_inputs, GenerateOptions};
//!
//! let config = GeneratorConfig::default();
//! let options = GenerateOptions::new("src/generated");
//! let (generation, summary) = generate_from_inputs(&["src".into()], &config, &options)?;
//! assert!(!generation.has_errors());
//! ```

pub mod accessors;
pub mod named_groups;
pub mod naming;
pub mod project;
pub mod resolvable;
mod templates;

pub use accessors::{build_accessor_trait, Accessor, AccessorKind, AccessorTrait};
pub use named_groups::{build_named_groups, NamedRegistrationGroup};
pub use resolvable::{synthesize, synthesize_all, FactoryParameter, SynthesizedFactory};
pub use templates::cfg_prefix;

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::assembly::{ModuleScope, SourceUnit};
use crate::config::GeneratorConfig;
use crate::diagnostics::{has_errors, Diagnostic};
use naming::unique_name;
use templates::{render_accessors, render_factory, render_generated_file, render_mod_rs, render_named_key};

/// A rendered output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Module name, also the file stem (`app_generated`)
    pub module: String,
    /// Input file the declarations come from
    pub source: PathBuf,
    #[serde(skip)]
    pub contents: String,
}

impl GeneratedFile {
    pub fn file_name(&self) -> String {
        format!("{}.rs", self.module)
    }
}

/// Everything one run produced, before anything is written
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub units: Vec<SourceUnit>,
    pub groups: Vec<NamedRegistrationGroup>,
    pub accessors: Vec<AccessorTrait>,
    pub factories: Vec<SynthesizedFactory>,
    pub files: Vec<GeneratedFile>,
    /// Contents of `mod.rs`
    #[serde(skip)]
    pub mod_rs: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generation {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Build and render the whole model
///
/// # Arguments
///
/// * `units` - Extracted source files, in input order
/// * `config` - Generator configuration
/// * `diagnostics` - Diagnostics produced during extraction; generation appends to them
///
/// # Errors
///
/// Returns an error only if template rendering fails. Invalid declarations
/// are reported as diagnostics and left out of the output.
pub fn build_generation(
    units: Vec<SourceUnit>,
    config: &GeneratorConfig,
    mut diagnostics: Vec<Diagnostic>,
) -> anyhow::Result<Generation> {
    let groups = build_named_groups(
        units.iter().flat_map(|unit| unit.assemblies.iter()),
        config,
        &mut diagnostics,
    );

    let mut modules = HashSet::new();
    let mut files = Vec::new();
    let mut all_accessors = Vec::new();
    let mut all_factories = Vec::new();

    for unit in &units {
        let mut declarations = Vec::new();

        for group in groups.iter().filter(|g| g.owner_file == unit.path) {
            declarations.push(render_named_key(group)?);
        }

        for assembly in &unit.assemblies {
            let owned: Vec<&NamedRegistrationGroup> = groups
                .iter()
                .filter(|g| g.owner_file == unit.path && g.owner == assembly.name)
                .collect();
            if let Some(accessors) = build_accessor_trait(assembly, &owned, &mut diagnostics) {
                declarations.push(render_accessors(&accessors, &config.resolver_trait)?);
                all_accessors.push(accessors);
            }
        }

        let factories = synthesize_all(&unit.initializers, &config.resolver_trait, &mut diagnostics);
        for factory in &factories {
            declarations.push(render_factory(factory)?);
        }
        all_factories.extend(factories);

        if declarations.is_empty() {
            tracing::debug!(file = %unit.path.display(), "nothing to generate");
            continue;
        }

        let mut scopes: Vec<&ModuleScope> = Vec::new();
        let declared_scopes = unit
            .assemblies
            .iter()
            .map(|a| &a.scope)
            .chain(unit.initializers.iter().map(|i| &i.scope));
        for scope in declared_scopes {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }

        let module = format!("{}_generated", unique_name(&mut modules, &module_stem(&unit.path)));
        let contents = render_generated_file(
            &unit.path,
            unit.module_path.as_deref(),
            &scopes,
            &unit.imports,
            declarations,
        )?;
        files.push(GeneratedFile {
            module,
            source: unit.path.clone(),
            contents,
        });
    }

    let module_names: Vec<String> = files.iter().map(|f| f.module.clone()).collect();
    let mod_rs = render_mod_rs(&module_names)?;

    Ok(Generation {
        units,
        groups,
        accessors: all_accessors,
        factories: all_factories,
        files,
        mod_rs,
        diagnostics,
    })
}

/// Module stem for a source path: the file stem, or the directory of a `mod.rs`
///
/// Characters that cannot appear in an identifier become `_`.
pub fn module_stem(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("module");
    let stem = if stem == "mod" {
        path.parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or(stem)
    } else {
        stem
    };
    let mut name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if name.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
