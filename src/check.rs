//! Definition self-validation diagnostics.
//!
//! `check` walks a schema and reports problems with the definitions
//! themselves, never with values. Diagnostics are named and coded so
//! callers can filter or assert on specific rules.

use std::fmt;

/// How serious a diagnostic is. Errors describe schemas that will
/// misbehave; warnings describe schemas that are legal but useless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One finding from a schema self-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `name_has_space`.
    pub code: &'static str,
    pub message: String,
    /// Schema path from the root, child names joined with `.`. Empty for
    /// findings about the root definition itself.
    pub path: String,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            path: String::new(),
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            path: String::new(),
        }
    }

    /// Prepend a path segment, keeping existing deeper segments.
    pub fn located(mut self, segment: &str) -> Self {
        self.path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{segment}.{}", self.path)
        };
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} [{}]: {}", self.severity.as_str(), self.code, self.message)
        } else {
            write!(
                f,
                "{} [{}] at `{}`: {}",
                self.severity.as_str(),
                self.code,
                self.path,
                self.message
            )
        }
    }
}

/// Re-anchor child diagnostics under a parent path segment.
pub(crate) fn prefix_path(diags: Vec<Diagnostic>, segment: &str) -> Vec<Diagnostic> {
    diags.into_iter().map(|d| d.located(segment)).collect()
}

/// Name well-formedness rules shared by every named block.
///
/// Each violated rule yields its own diagnostic; a thoroughly bad name can
/// produce several at once.
pub(crate) fn check_name(name: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if name.is_empty() {
        out.push(Diagnostic::error("empty_name", "block name cannot be empty"));
        return out;
    }
    if name.contains(' ') {
        out.push(Diagnostic::error(
            "name_has_space",
            format!("block name `{name}` cannot contain spaces"),
        ));
    }
    if name.contains('-') {
        out.push(Diagnostic::error(
            "name_has_dash",
            format!("block name `{name}` cannot contain dashes"),
        ));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        out.push(Diagnostic::error(
            "name_starts_with_digit",
            format!("block name `{name}` cannot begin with a digit"),
        ));
    }
    out
}
