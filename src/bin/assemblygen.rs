use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = assemblygen::logging::init_logging() {
        eprintln!("Warning: {e:#}");
    }
    match assemblygen::cli::run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}
