//! # Diagnostics Module
//!
//! Every problem found while extracting registrations, building named groups or
//! synthesizing factories is reported as a [`Diagnostic`] instead of aborting
//! the whole run.
//!
//! ## Severities
//!
//! - **Error** - The affected unit (a file, a named group or an initializer) is
//!   not generated and the run exits non-zero
//! - **Warning** - A single registration was skipped; generation continues
//! - **Info** - Something was generated differently than the author may expect
//!
//! ## Kinds
//!
//! | kind                                     | severity | unit skipped      |
//! |------------------------------------------|----------|-------------------|
//! | `parse_error`                            | error    | source file       |
//! | `unresolved_service_type`                | warning  | registration      |
//! | `untyped_argument`                       | warning  | registration      |
//! | `dynamic_name`                           | warning  | registration      |
//! | `duplicate_registration`                 | error    | nothing (flagged) |
//! | `duplicate_named_registration`           | error    | named group       |
//! | `case_name_collision`                    | error    | named group       |
//! | `unreachable_module`                     | error    | declaration       |
//! | `unsupported_initializer`                | error    | initializer       |
//! | `unsupported_parameter`                  | error    | initializer       |
//! | `conflicting_hints`                      | error    | initializer       |
//! | `invalid_hint`                           | error    | initializer       |
//! | `duplicate_factory`                      | error    | initializer       |
//! | `argument_registration_without_accessor` | info     | accessor          |
//!
//! ## Usage
//!
//! ```rust
//! use assemblygen::diagnostics::{Diagnostic, Severity, SourceLocation};
//!
//! let diag = Diagnostic::new(
//!     SourceLocation::new("src/app.rs", 12, 9),
//!     Severity::Warning,
//!     "unresolved_service_type",
//!     "cannot determine the registered type",
//! )
//! .with_suggestion("add a turbofish: `register::<MyService>(..)`");
//! assert_eq!(diag.to_string(), "src/app.rs:12:9: warning[unresolved_service_type]: cannot determine the registered type");
//! ```

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity level for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Best-practice note, never fails the run
    Info,
    /// A single registration was skipped
    Warning,
    /// A file, group or initializer was not generated
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A position inside an input source file (1-based line and column)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location of a syntax node's first token.
    ///
    /// `proc-macro2` reports 0-based columns; they are shifted to 1-based here.
    pub fn from_span(file: &Path, span: proc_macro2::Span) -> Self {
        let start = span.start();
        SourceLocation::new(file, start.line, start.column + 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A problem found while generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the problem was found
    pub location: SourceLocation,
    /// Severity of the problem
    pub severity: Severity,
    /// Stable snake_case code (e.g. "duplicate_named_registration")
    pub kind: String,
    /// Human-readable description
    pub message: String,
    /// Other locations involved, such as the first of two duplicates
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<SourceLocation>,
    /// Optional hint for fixing the problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        location: SourceLocation,
        severity: Severity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location,
            severity,
            kind: kind.into(),
            message: message.into(),
            related: Vec::new(),
            suggestion: None,
        }
    }

    pub fn error(location: SourceLocation, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic::new(location, Severity::Error, kind, message)
    }

    pub fn warning(
        location: SourceLocation,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic::new(location, Severity::Warning, kind, message)
    }

    pub fn info(location: SourceLocation, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic::new(location, Severity::Info, kind, message)
    }

    /// Attach another location involved in the problem
    pub fn with_related(mut self, location: SourceLocation) -> Self {
        self.related.push(location);
        self
    }

    /// Add a suggestion for fixing the problem
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.location, self.severity, self.kind, self.message
        )
    }
}

/// Whether any diagnostic in the slice is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Print diagnostics grouped by severity, errors first
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("✅ No problems found");
        return;
    }

    let by_severity = |severity: Severity| -> Vec<&Diagnostic> {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    };
    let errors = by_severity(Severity::Error);
    let warnings = by_severity(Severity::Warning);
    let infos = by_severity(Severity::Info);

    println!("\n📋 Generation diagnostics:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        errors.len(),
        warnings.len(),
        infos.len()
    );

    for (title, group) in [
        ("❌ Errors (nothing generated for the affected unit):", &errors),
        ("⚠️  Warnings (registration skipped):", &warnings),
        ("ℹ️  Info:", &infos),
    ] {
        if group.is_empty() {
            continue;
        }
        println!("{title}");
        for diag in group {
            println!("   [{}] {}", diag.kind, diag.location);
            println!("      {}", diag.message);
            for related in &diag.related {
                println!("      ↳ also at {related}");
            }
            if let Some(suggestion) = &diag.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}
