use anyhow::Context;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::extract::{extract_assemblies, validate_unique_registrations, ExtractOptions};
use super::initializers::extract_initializers;
use super::tokens::render;
use super::types::SourceUnit;
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, SourceLocation};

/// Suffix of files written by the generator; such files are never read back as input
pub const GENERATED_SUFFIX: &str = "_generated.rs";

/// Extract assemblies and resolvable initializers from one source text
///
/// A file that does not parse yields a `parse_error` diagnostic and an empty
/// unit; it never stops the batch.
pub fn parse_source(
    path: &Path,
    source: &str,
    config: &GeneratorConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> SourceUnit {
    let file = match syn::parse_file(source) {
        Ok(file) => file,
        Err(err) => {
            let location = SourceLocation::from_span(path, err.span());
            tracing::warn!(file = %path.display(), error = %err, "failed to parse source");
            diagnostics.push(Diagnostic::error(location, "parse_error", err.to_string()));
            return SourceUnit {
                path: path.to_path_buf(),
                ..SourceUnit::default()
            };
        }
    };

    let imports = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Use(item_use) => Some(render(item_use)),
            _ => None,
        })
        .collect();

    let vocabulary = config.vocabulary();
    let options = ExtractOptions {
        vocabulary: &vocabulary,
        assemble_function: &config.assemble_function,
        default_access: config.default_access,
    };
    let assemblies = extract_assemblies(&file, path, options, diagnostics);
    for assembly in &assemblies {
        validate_unique_registrations(assembly, diagnostics);
    }
    let initializers = extract_initializers(&file, path, &config.factory_name, diagnostics);

    SourceUnit {
        path: path.to_path_buf(),
        module_path: module_path_for(path),
        imports,
        assemblies,
        initializers,
    }
}

/// Module path of a source file, derived from its position under the nearest `src/`
///
/// `src/lib.rs` and `src/main.rs` are `crate`, `src/app.rs` and `src/app/mod.rs`
/// are `crate::app`. Files outside `src/`, binaries under `src/bin/` and paths
/// that are not valid identifiers have no module path.
pub fn module_path_for(path: &Path) -> Option<String> {
    let components: Vec<&str> = path
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    let src = components.iter().rposition(|c| *c == "src")?;
    let mut segments: Vec<&str> = components[src + 1..].to_vec();
    let file = segments.pop()?.strip_suffix(".rs")?;
    if segments.first() == Some(&"bin") {
        return None;
    }
    let is_root = segments.is_empty() && matches!(file, "lib" | "main");
    if !is_root && file != "mod" {
        segments.push(file);
    }
    if segments
        .iter()
        .any(|segment| syn::parse_str::<syn::Ident>(segment).is_err())
    {
        return None;
    }
    let mut module = String::from("crate");
    for segment in segments {
        module.push_str("::");
        module.push_str(segment);
    }
    Some(module)
}

/// Read and extract one source file
pub fn load_source(
    path: &Path,
    config: &GeneratorConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> anyhow::Result<SourceUnit> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source: {}", path.display()))?;
    Ok(parse_source(path, &source, config, diagnostics))
}

/// Read and extract every input file, in the order given
///
/// # Errors
///
/// Returns an error if a file cannot be read. Problems inside a file are
/// reported as diagnostics instead.
pub fn load_sources(
    paths: &[PathBuf],
    config: &GeneratorConfig,
) -> anyhow::Result<(Vec<SourceUnit>, Vec<Diagnostic>)> {
    let mut diagnostics = Vec::new();
    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        let unit = load_source(path, config, &mut diagnostics)?;
        tracing::debug!(
            file = %path.display(),
            assemblies = unit.assemblies.len(),
            initializers = unit.initializers.len(),
            "loaded source"
        );
        units.push(unit);
    }
    Ok((units, diagnostics))
}

/// Expand CLI inputs into the list of source files to read
///
/// Files are kept as given. Directories are walked recursively for `*.rs`
/// files in sorted order, skipping `target/` and previously generated files.
/// A file reached through more than one input is kept once, at its first
/// position.
pub fn collect_input_files(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |files: &mut Vec<PathBuf>, path: PathBuf| {
        let identity = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(identity) {
            files.push(path);
        } else {
            tracing::debug!(file = %path.display(), "skipping repeated input");
        }
    };
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            let walker = WalkDir::new(input)
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0 || !(entry.file_type().is_dir() && entry.file_name() == "target")
                });
            for entry in walker {
                let entry = entry
                    .with_context(|| format!("Failed to read directory: {}", input.display()))?;
                if entry.file_type().is_file() && is_candidate_source(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            for path in found {
                push(&mut files, path);
            }
        } else if input.is_file() {
            push(&mut files, input.clone());
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }
    Ok(files)
}

fn is_candidate_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".rs") && !name.ends_with(GENERATED_SUFFIX)
}
