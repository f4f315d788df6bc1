//! The core diagnostic type.

use std::fmt;

use aerolisp_core::{ErrorKind, span::Span};

use crate::error::{error_code::ErrorCode, label::Label};

/// A compilation error with source location information.
///
/// ```text
/// error[E300]: function `aero/coefficients/CL` is defined multiple times
///   --> wing.aero:7:6
///    |
///  2 | (def aero/coefficients/CL
///    |      -------------------- first defined here
///  . |
///  7 | (def aero/coefficients/CL
///    |      ^^^^^^^^^^^^^^^^^^^^ duplicate definition
///    |
///    = help: remove the duplicate or use a different name
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The failure kind, derived from the error code.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.code.map(|code| code.kind())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error")?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("unknown operator `log`").with_code(ErrorCode::E102);
        assert_eq!(diag.to_string(), "error[E102]: unknown operator `log`");
        assert_eq!(diag.kind(), Some(ErrorKind::Syntax));
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::error("something failed");
        assert_eq!(diag.to_string(), "error: something failed");
        assert_eq!(diag.kind(), None);
    }

    #[test]
    fn test_primary_span_skips_secondary_labels() {
        let diag = Diagnostic::error("duplicate")
            .with_secondary_label(Span::new(0..4), "first defined here")
            .with_label(Span::new(20..24), "duplicate definition");

        assert_eq!(diag.labels().len(), 2);
        assert!(!diag.labels()[0].is_primary());
        assert_eq!(diag.primary_span(), Some(Span::new(20..24)));
    }
}
