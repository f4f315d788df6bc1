//! Error types for Aerolisp operations.
//!
//! This module provides the main error type [`AerolispError`] which wraps
//! every failure of a compilation, from reading input to rendering output.

use std::io;

use thiserror::Error;

use aerolisp_core::{ErrorKind, geometry::GeometryError, symbols::DuplicateDefinition};
use aerolisp_parser::error::ParseError;

/// The main error type for Aerolisp operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant contains structured error information with source code
/// spans, together with the source it refers to, for rich error reporting.
#[derive(Debug, Error)]
pub enum AerolispError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Definition error: {0}")]
    Definition(#[from] DuplicateDefinition),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::export::Error> for AerolispError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl AerolispError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// The compilation failure kind, if this is a compilation failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Parse { err, .. } => err.kind(),
            Self::Definition(_) => Some(ErrorKind::DuplicateDefinition),
            Self::Geometry(_) => Some(ErrorKind::Geometry),
            Self::Io(_) | Self::Export(_) | Self::Config(_) => None,
        }
    }
}
