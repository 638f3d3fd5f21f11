//! Unit tests for CLI commands

use crate::cli::{check_inputs, run, Cli, Commands};
use crate::config::GeneratorConfig;
use clap::Parser;
use std::process::ExitCode;

#[test]
fn test_generate_command_parses() {
    let cli = Cli::try_parse_from([
        "assemblygen",
        "generate",
        "--output",
        "src/generated",
        "--dry-run",
        "src/app.rs",
        "src/widgets",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            output,
            config,
            json_output,
            dry_run,
            rustfmt,
            inputs,
        } => {
            assert_eq!(output.to_string_lossy(), "src/generated");
            assert!(config.is_none());
            assert!(json_output.is_none());
            assert!(dry_run);
            assert!(!rustfmt);
            assert_eq!(inputs.len(), 2);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_check_command_with_flags() {
    let cli = Cli::try_parse_from([
        "assemblygen",
        "check",
        "--config",
        "assemblygen.toml",
        "--errors-only",
        "src",
    ])
    .unwrap();

    match cli.command {
        Commands::Check {
            config,
            errors_only,
            inputs,
        } => {
            assert_eq!(config.unwrap().to_string_lossy(), "assemblygen.toml");
            assert!(errors_only);
            assert_eq!(inputs[0].to_string_lossy(), "src");
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_inputs_are_required() {
    assert!(Cli::try_parse_from(["assemblygen", "check"]).is_err());
    assert!(Cli::try_parse_from(["assemblygen", "generate", "--output", "out"]).is_err());
    assert!(Cli::try_parse_from(["assemblygen", "generate", "src"]).is_err());
}

#[test]
fn test_check_inputs_reports_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("app.rs");
    std::fs::write(
        &input,
        r#"
impl Assembly for AppAssembly {
    fn assemble(&self, c: &mut Container) {
        c.register_named::<Database>(Database::primary, "primary");
        c.register_named::<Database>(Database::replica, "primary");
    }
}
"#,
    )
    .unwrap();

    let diagnostics = check_inputs(&[input], &GeneratorConfig::default()).unwrap();
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == "duplicate_named_registration"));
}

#[test]
fn test_generate_exit_code_follows_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.rs");
    let bad = dir.path().join("bad.rs");
    std::fs::write(&good, "impl Clock { #[resolvable] pub(crate) fn new() -> Self { Clock } }").unwrap();
    std::fs::write(&bad, "impl Clock { fn broken( }").unwrap();
    let output = dir.path().join("out");
    let output_arg = output.to_str().unwrap();

    let ok = Cli::try_parse_from([
        "assemblygen",
        "generate",
        "--output",
        output_arg,
        good.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(run(ok).unwrap(), ExitCode::SUCCESS);
    assert!(output.join("good_generated.rs").exists());

    let failing = Cli::try_parse_from([
        "assemblygen",
        "generate",
        "--output",
        output_arg,
        bad.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(run(failing).unwrap(), ExitCode::FAILURE);
}
