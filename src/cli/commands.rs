use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::assembly::{collect_input_files, load_sources};
use crate::config::{load_effective_config, GeneratorConfig};
use crate::diagnostics::{has_errors, print_diagnostics, Diagnostic, Severity};
use crate::generator::build_generation;
use crate::generator::project::{generate_from_inputs, GenerateOptions};

/// Command-line interface for assemblygen
///
/// Generates registration keys, typed accessors and resolvable factories
/// for a dependency-injection container from Rust sources.
#[derive(Parser, Debug)]
#[command(name = "assemblygen")]
#[command(version, about = "Dependency-injection registration code generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate code for the assemblies and resolvable initializers in the inputs
    Generate {
        /// Directory receiving mod.rs and the *_generated.rs files
        #[arg(short, long)]
        output: PathBuf,

        /// Path to assemblygen.toml
        /// If not provided, will auto-detect in the current directory
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the extracted model and diagnostics as JSON
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Perform a dry run: show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Format generated files with rustfmt (override the binary with ASSEMBLYGEN_RUSTFMT)
        #[arg(long, default_value_t = false)]
        rustfmt: bool,

        /// Source files or directories (directories are searched for *.rs)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Extract and validate registrations without writing anything
    Check {
        /// Path to assemblygen.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,

        /// Source files or directories (directories are searched for *.rs)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

/// Parse the command line and execute it
///
/// # Errors
///
/// Returns an error if the configuration, an input or an output file cannot
/// be read or written. Problems found in the inputs are printed and reflected
/// in the exit code instead.
pub fn run_cli() -> anyhow::Result<ExitCode> {
    run(Cli::parse())
}

/// Execute a parsed command
///
/// Exits with `1` when any error diagnostic was produced, `0` otherwise.
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    match cli.command {
        Commands::Generate {
            output,
            config,
            json_output,
            dry_run,
            rustfmt,
            inputs,
        } => {
            let config = load_effective_config(config.as_deref(), &cwd)?;
            let options = GenerateOptions {
                output_dir: output,
                dry_run,
                rustfmt,
                json_output,
            };
            let (generation, summary) = generate_from_inputs(&inputs, &config, &options)?;

            print_diagnostics(&generation.diagnostics);
            let verb = if dry_run { "would change" } else { "written" };
            println!(
                "📦 {} file(s) {verb}, {} unchanged, {} removed ({} group(s), {} accessor trait(s), {} factory(ies))",
                summary.written.len(),
                summary.unchanged.len(),
                summary.removed.len(),
                generation.groups.len(),
                generation.accessors.len(),
                generation.factories.len(),
            );
            Ok(exit_code(&generation.diagnostics))
        }
        Commands::Check {
            config,
            errors_only,
            inputs,
        } => {
            let config = load_effective_config(config.as_deref(), &cwd)?;
            let diagnostics = check_inputs(&inputs, &config)?;
            if errors_only {
                let errors: Vec<Diagnostic> = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .cloned()
                    .collect();
                print_diagnostics(&errors);
            } else {
                print_diagnostics(&diagnostics);
            }
            Ok(exit_code(&diagnostics))
        }
    }
}

/// Run extraction and every validation pass, returning all diagnostics
pub fn check_inputs(inputs: &[PathBuf], config: &GeneratorConfig) -> anyhow::Result<Vec<Diagnostic>> {
    let files = collect_input_files(inputs)?;
    let (units, diagnostics) = load_sources(&files, config)?;
    let generation = build_generation(units, config, diagnostics)?;
    Ok(generation.diagnostics)
}

fn exit_code(diagnostics: &[Diagnostic]) -> ExitCode {
    if has_errors(diagnostics) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
