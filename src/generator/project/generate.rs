use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use super::format::format_source;
use crate::assembly::{collect_input_files, load_sources};
use crate::config::GeneratorConfig;
use crate::generator::{build_generation, Generation};

/// Header every generated file starts with; only such files are ever removed
pub const GENERATED_HEADER: &str = "// @generated by assemblygen";

/// Options for [`generate_from_inputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directory receiving `mod.rs` and the `*_generated.rs` files
    pub output_dir: PathBuf,
    /// Report what would change without touching the file system
    pub dry_run: bool,
    /// Pipe generated files through rustfmt before comparing and writing
    pub rustfmt: bool,
    /// Also write the full model as pretty JSON to this path
    pub json_output: Option<PathBuf>,
}

impl GenerateOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            output_dir: output_dir.into(),
            dry_run: false,
            rustfmt: false,
            json_output: None,
        }
    }
}

/// What a write pass did (or would do, in a dry run)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Generated files left over from inputs that no longer produce output
    pub removed: Vec<PathBuf>,
}

/// Run the whole pipeline: expand inputs, extract, generate, write
///
/// # Errors
///
/// Returns an error for I/O, template or rustfmt failures. Problems in the
/// inputs are reported through [`Generation::diagnostics`]; output for
/// unaffected files is still written.
pub fn generate_from_inputs(
    inputs: &[PathBuf],
    config: &GeneratorConfig,
    options: &GenerateOptions,
) -> anyhow::Result<(Generation, WriteSummary)> {
    let files = collect_input_files(inputs)?;
    tracing::info!(files = files.len(), "collected input files");

    let (units, diagnostics) = load_sources(&files, config)?;
    let mut generation = build_generation(units, config, diagnostics)?;

    if options.rustfmt {
        for file in &mut generation.files {
            file.contents = format_source(&file.contents)
                .with_context(|| format!("Failed to format {}", file.file_name()))?;
        }
    }

    let summary = write_generation(&generation, &options.output_dir, options.dry_run)?;
    if let Some(json_path) = &options.json_output {
        write_json_model(&generation, json_path)?;
    }
    Ok((generation, summary))
}

/// Write generated files into `output_dir`
///
/// Files whose contents are already up to date are left untouched, so
/// re-running the generator does not trigger rebuilds. Stale generated files
/// (recognized by their header) are removed.
pub fn write_generation(
    generation: &Generation,
    output_dir: &Path,
    dry_run: bool,
) -> anyhow::Result<WriteSummary> {
    if !dry_run {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;
    }

    let mut summary = WriteSummary::default();
    let outputs = generation
        .files
        .iter()
        .map(|file| (output_dir.join(file.file_name()), file.contents.as_str()))
        .chain(std::iter::once((output_dir.join("mod.rs"), generation.mod_rs.as_str())));
    for (path, contents) in outputs {
        if write_if_changed(&path, contents, dry_run)? {
            summary.written.push(path);
        } else {
            summary.unchanged.push(path);
        }
    }

    let expected: Vec<String> = generation.files.iter().map(|f| f.file_name()).collect();
    for stale in stale_generated_files(output_dir, &expected)? {
        if dry_run {
            println!("ℹ️  Would remove stale {}", stale.display());
        } else {
            fs::remove_file(&stale)
                .with_context(|| format!("Failed to remove stale file: {}", stale.display()))?;
            println!("🗑️  Removed stale {}", stale.display());
        }
        summary.removed.push(stale);
    }
    Ok(summary)
}

/// Write `contents` to `path` unless it already holds exactly that
///
/// Returns whether the file was (or, in a dry run, would be) written.
fn write_if_changed(path: &Path, contents: &str, dry_run: bool) -> anyhow::Result<bool> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
        tracing::debug!(path = %path.display(), "unchanged");
        return Ok(false);
    }
    if dry_run {
        println!("ℹ️  Would write {}", path.display());
    } else {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote generated file");
        println!("✅ Generated {}", path.display());
    }
    Ok(true)
}

fn stale_generated_files(output_dir: &Path, expected: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    if !output_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut stale = Vec::new();
    let entries = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read output dir: {}", output_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(crate::assembly::load::GENERATED_SUFFIX) || expected.iter().any(|e| e == name) {
            continue;
        }
        let generated = fs::read_to_string(&path).is_ok_and(|c| c.starts_with(GENERATED_HEADER));
        if generated {
            stale.push(path);
        }
    }
    stale.sort();
    Ok(stale)
}

/// Write the full model (sources, groups, accessors, factories, diagnostics) as pretty JSON
pub fn write_json_model(generation: &Generation, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(generation).context("Failed to serialize model")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Wrote model → {}", path.display());
    Ok(())
}
