use askama::Template;
use std::path::Path;

use super::accessors::{AccessorKind, AccessorTrait};
use crate::assembly::ModuleScope;
use super::named_groups::NamedRegistrationGroup;
use super::resolvable::SynthesizedFactory;

/// One generated source file
#[derive(Template)]
#[template(path = "generated.rs.txt", escape = "none")]
pub struct GeneratedFileTemplate {
    /// Source file the declarations were generated from
    pub source: String,
    /// Import block followed by one rendered declaration per entry
    pub blocks: Vec<String>,
}

/// Template data for generating mod.rs module declarations
#[derive(Template)]
#[template(path = "mod.rs.txt", escape = "none")]
pub struct ModRsTemplateData {
    /// Module names to declare
    pub modules: Vec<String>,
}

/// One case of a key enum, with its `cfg` prefix at each indentation level
#[derive(Debug, Clone)]
pub struct CaseView {
    pub variant: String,
    /// Raw tag as a Rust string literal
    pub tag_literal: String,
    pub variant_cfg: String,
    pub arm_cfg: String,
    pub stmt_cfg: String,
}

/// Key enum of a named registration group
#[derive(Template)]
#[template(path = "named_key.rs.txt", escape = "none")]
pub struct NamedKeyTemplate {
    pub service_type: String,
    pub enum_name: String,
    pub access: &'static str,
    /// Group guard prefix, empty when unguarded
    pub cfg: String,
    pub cases: Vec<CaseView>,
}

#[derive(Debug, Clone)]
pub struct AccessorView {
    pub doc: String,
    pub cfg: String,
    pub method: String,
    /// Parameters after `&self`, each preceded by `, `
    pub params: String,
    pub return_type: String,
    pub body: String,
}

/// Accessor trait of an assembly and its blanket impl
#[derive(Template)]
#[template(path = "accessors.rs.txt", escape = "none")]
pub struct AccessorsTemplate {
    pub assembly: String,
    pub trait_name: String,
    pub resolver_trait: String,
    pub access: &'static str,
    pub accessors: Vec<AccessorView>,
}

/// `impl` block holding one synthesized factory
#[derive(Template)]
#[template(path = "factory.rs.txt", escape = "none")]
pub struct FactoryTemplate {
    pub cfg: String,
    pub type_name: String,
    /// Target of the `impl` block, generic arguments included
    pub self_type: String,
    pub initializer: String,
    pub access: &'static str,
    pub factory_name: String,
    pub parameter_list: String,
    pub return_type: String,
    pub call_arguments: Vec<String>,
}

/// `#[cfg(..)]` line followed by `indent`, or nothing
pub fn cfg_prefix(guard: Option<&str>, indent: &str) -> String {
    match guard {
        Some(predicate) => format!("#[cfg({predicate})]\n{indent}"),
        None => String::new(),
    }
}

/// Render the key enum of a named group
///
/// # Errors
///
/// Returns an error if template rendering fails
pub fn render_named_key(group: &NamedRegistrationGroup) -> anyhow::Result<String> {
    let cases = group
        .cases()
        .map(|(variant, tag, guard)| CaseView {
            variant,
            tag_literal: format!("{tag:?}"),
            variant_cfg: cfg_prefix(guard, "    "),
            arm_cfg: cfg_prefix(guard, "            "),
            stmt_cfg: cfg_prefix(guard, "        "),
        })
        .collect();
    let rendered = NamedKeyTemplate {
        service_type: group.service_type.clone(),
        enum_name: group.enum_name.clone(),
        access: group.access_level.keyword(),
        cfg: cfg_prefix(group.if_config_condition.as_deref(), ""),
        cases,
    }
    .render()?;
    Ok(rendered.trim().to_string())
}

/// Render the accessor trait of an assembly
///
/// # Errors
///
/// Returns an error if template rendering fails
pub fn render_accessors(accessors: &AccessorTrait, resolver_trait: &str) -> anyhow::Result<String> {
    let views = accessors
        .accessors
        .iter()
        .map(|accessor| {
            let ty = &accessor.service_type;
            let missing = format!("no registration for `{ty}`");
            let (doc, params, return_type, body) = match &accessor.kind {
                AccessorKind::Single => (
                    format!("Resolves the default `{ty}` registration."),
                    String::new(),
                    ty.clone(),
                    format!("self.resolve::<{ty}>().expect({missing:?})"),
                ),
                AccessorKind::Named { enum_name } => (
                    format!("Resolves the `{ty}` registered under `key`."),
                    format!(", key: {enum_name}"),
                    ty.clone(),
                    format!(
                        "self.resolve_named::<{ty}>(key.as_str()).unwrap_or_else(|| panic!(\"no registration for `{}` named {{key}}\"))",
                        ty.replace('{', "{{").replace('}', "}}")
                    ),
                ),
                AccessorKind::Collection => (
                    format!("Resolves every `{ty}` registered into the collection."),
                    String::new(),
                    format!("Vec<{ty}>"),
                    format!("self.resolve_collection::<{ty}>()"),
                ),
            };
            AccessorView {
                doc,
                cfg: cfg_prefix(accessor.guard.as_deref(), "    "),
                method: accessor.method.clone(),
                params,
                return_type,
                body,
            }
        })
        .collect();
    let rendered = AccessorsTemplate {
        assembly: accessors.assembly.clone(),
        trait_name: accessors.trait_name.clone(),
        resolver_trait: resolver_trait.to_string(),
        access: accessors.access_level.keyword(),
        accessors: views,
    }
    .render()?;
    Ok(rendered.trim().to_string())
}

/// Render a synthesized factory
///
/// # Errors
///
/// Returns an error if template rendering fails
pub fn render_factory(factory: &SynthesizedFactory) -> anyhow::Result<String> {
    let rendered = FactoryTemplate {
        cfg: cfg_prefix(factory.guard.as_deref(), ""),
        type_name: factory.type_name.clone(),
        self_type: factory.self_type.clone(),
        initializer: factory.initializer.clone(),
        access: factory.access_level.keyword(),
        factory_name: factory.factory_name.clone(),
        parameter_list: factory.parameter_list(),
        return_type: factory.return_type.clone(),
        call_arguments: factory.call_arguments.clone(),
    }
    .render()?;
    Ok(rendered.trim().to_string())
}

/// Render a complete generated file
///
/// The import block comes first: the source module glob, a glob per inline
/// module holding a declaration (behind that module's `cfg`), then the
/// copied `use` items. Each declaration follows, separated by a blank line.
/// Output always ends with a single newline.
///
/// # Errors
///
/// Returns an error if template rendering fails
pub fn render_generated_file(
    source: &Path,
    module_path: Option<&str>,
    scopes: &[&ModuleScope],
    imports: &[String],
    declarations: Vec<String>,
) -> anyhow::Result<String> {
    let mut import_lines: Vec<String> = Vec::with_capacity(imports.len() + scopes.len() + 1);
    if let Some(module) = module_path {
        import_lines.push(format!("use {module}::*;"));
        for scope in scopes.iter().filter(|scope| !scope.is_root()) {
            import_lines.push(format!(
                "{}use {}::*;",
                cfg_prefix(scope.guard().as_deref(), ""),
                scope.path_from(module)
            ));
        }
    }
    import_lines.extend(imports.iter().cloned());

    let mut blocks = Vec::with_capacity(declarations.len() + 1);
    if !import_lines.is_empty() {
        blocks.push(import_lines.join("\n"));
    }
    blocks.extend(declarations);

    let rendered = GeneratedFileTemplate {
        source: source.display().to_string().replace('\\', "/"),
        blocks,
    }
    .render()?;
    Ok(format!("{}\n", rendered.trim_end()))
}

/// Render mod.rs declaring every generated module
///
/// # Errors
///
/// Returns an error if template rendering fails
pub fn render_mod_rs(modules: &[String]) -> anyhow::Result<String> {
    let rendered = ModRsTemplateData {
        modules: modules.to_vec(),
    }
    .render()?;
    Ok(format!("{}\n", rendered.trim_end()))
}
