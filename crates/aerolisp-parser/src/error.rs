//! Error and diagnostic system for the Aerolisp parser.
//!
//! Every failure of the parsing lifecycle (lexing, grammar, table shape,
//! symbol registration) is reported as a [`Diagnostic`] with an
//! [`ErrorCode`], labelled source spans and optional help text. One or more
//! diagnostics are wrapped in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use aerolisp_parser::error::{Diagnostic, ErrorCode};
//! # use aerolisp_parser::Span;
//! let diag = Diagnostic::error("function `CL` is defined multiple times")
//!     .with_code(ErrorCode::E300)
//!     .with_label(Span::new(40..42), "duplicate definition")
//!     .with_secondary_label(Span::new(6..8), "first defined here")
//!     .with_help("remove the duplicate or use a different name");
//! assert_eq!(diag.kind(), Some(aerolisp_core::ErrorKind::DuplicateDefinition));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
