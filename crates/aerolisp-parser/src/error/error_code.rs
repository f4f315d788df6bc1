//! Error codes for the Aerolisp diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Grammar errors
//! - `E2xx` - Table literal errors
//! - `E3xx` - Symbol registry errors

use std::fmt;

use aerolisp_core::ErrorKind;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A docstring was opened with a quote but never closed on the same line.
    E001,

    /// Unexpected character.
    ///
    /// A character that starts no token of the language.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\\`, `\"`.
    E003,

    /// Number literal out of range.
    ///
    /// The literal does not fit a finite double, e.g. `1e999`.
    E004,

    // =========================================================================
    // Grammar Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// Unbalanced parentheses, a missing function name, or any other token
    /// the grammar does not allow at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a complete form was parsed.
    E101,

    /// Unknown operator.
    ///
    /// The head of an operation is not in the operator vocabulary.
    E102,

    /// Wrong number of operands.
    ///
    /// The operator was given more or fewer operands than its arity allows.
    E103,

    /// Empty function body.
    ///
    /// A function contains only comments.
    E104,

    /// Unknown axis.
    ///
    /// Axis titles are `X`, `Y`, `Z`, `ROLL`, `PITCH` and `YAW`.
    E105,

    // =========================================================================
    // Table Errors (E2xx)
    // =========================================================================
    /// Table row width mismatch.
    ///
    /// The first row of a table literal fixes the number of columns; a later
    /// row has a different number of entries.
    E200,

    /// Misplaced empty cell.
    ///
    /// The empty marker `""` may only stand in the top-left corner.
    E201,

    // =========================================================================
    // Symbol Errors (E3xx)
    // =========================================================================
    /// Duplicate definition.
    ///
    /// A function or named table with this name has already been defined.
    E300,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E300 => "E300",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "number out of range",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unknown operator",
            ErrorCode::E103 => "wrong number of operands",
            ErrorCode::E104 => "empty function body",
            ErrorCode::E105 => "unknown axis",
            ErrorCode::E200 => "table row width mismatch",
            ErrorCode::E201 => "misplaced empty cell",
            ErrorCode::E300 => "duplicate definition",
        }
    }

    /// The failure kind this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E200 => ErrorKind::TableShape,
            ErrorCode::E300 => ErrorKind::DuplicateDefinition,
            _ => ErrorKind::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
