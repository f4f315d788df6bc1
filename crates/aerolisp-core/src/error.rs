//! Error classification shared by every crate of the workspace.

use std::fmt;

/// The kind of a hard compilation failure.
///
/// Every failure aborts the compilation; the kind only tells the caller
/// what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed grouping, unknown operator or a missing required form.
    Syntax,
    /// A table row whose width differs from the first row.
    TableShape,
    /// A function or named table defined twice.
    DuplicateDefinition,
    /// A degenerate or invalid panel or fuselage description.
    Geometry,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::TableShape => "table shape error",
            ErrorKind::DuplicateDefinition => "duplicate definition",
            ErrorKind::Geometry => "geometry error",
        };
        f.write_str(name)
    }
}
