//! # Aerolisp Parser
//!
//! Parser for the Aerolisp aerodynamic s-expression language. This crate
//! provides the pipeline from source text to the shared document model.
//!
//! ## Usage
//!
//! ```
//! # use aerolisp_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         (def "Lift" aero/force/L
//!             (* aero/qbar-psf metrics/Sw-sqft aero/coefficients/CL))
//!         (axis Z (def aero/force/Z (- 0 aero/force/L)))
//!     "#;
//!
//!     let compilation = parse(source)?;
//!     assert!(compilation.symbols().is_defined("aero/force/L"));
//!     Ok(())
//! }
//! ```

mod elaborate;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod tokens;

pub use aerolisp_core::span::Span;

use log::{debug, info};

use aerolisp_core::{
    builder::{Compilation, DocumentBuilder},
    document::Expr,
};

use elaborate::Builder;
use error::ParseError;

/// Parse a complete source unit into a fresh compilation.
///
/// The pipeline is:
///
/// 1. **Tokenize** - Convert source text to tokens, collecting every lexical error
/// 2. **Parse** - Build the parse tree, including table shape checks
/// 3. **Elaborate** - Lower into the document and register every name
///
/// # Errors
///
/// Returns a [`ParseError`] if the source is malformed or defines a name
/// twice. Nothing is produced in that case.
pub fn parse(source: &str) -> Result<Compilation, ParseError> {
    let mut target = DocumentBuilder::new();
    parse_into(source, &mut target)?;
    Ok(target.finish())
}

/// Parse a complete source unit into an existing compilation.
///
/// Definitions share `target`'s symbol registry with whatever was added to
/// it before, so a name defined on both sides is a duplicate.
///
/// # Errors
///
/// See [`parse`]. On error `target` may hold part of the source.
pub fn parse_into(source: &str, target: &mut DocumentBuilder) -> Result<(), ParseError> {
    info!(bytes = source.len(); "Parsing source");

    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(); "Tokenized source");

    let entries = parser::build_spec(&tokens)?;
    Builder::new(target).build(entries)?;
    Ok(())
}

/// Parse a single expression, registering the names it uses in `target`.
///
/// # Errors
///
/// Returns a [`ParseError`] if `source` is not exactly one well-formed
/// expression or names an already defined table.
pub fn parse_expression(source: &str, target: &mut DocumentBuilder) -> Result<Expr, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let sexp = parser::build_expression(&tokens)?;
    Ok(Builder::new(target).build_expr(sexp)?)
}
