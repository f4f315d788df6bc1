//! Export functionality for Aerolisp documents.
//!
//! This module provides the [`Exporter`] trait that defines the interface for
//! converting a [`Document`] into an output format. It is the final stage in
//! the Aerolisp pipeline, shared by both authoring paths.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text            Airframe (panels, fuselage)
//!     ↓ parse                ↓ synthesize
//!     └──────→ Document ←────┘
//!                 ↓ export (this module)
//!             Output Text
//! ```
//!
//! # Available Backends
//!
//! - [`xml`]: JSBSim `<aerodynamics>` XML via [`xml::XmlExporter`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering rendering failures and I/O
//! errors. [`Error`] converts into [`AerolispError::Export`] at the crate
//! boundary.
//!
//! [`AerolispError::Export`]: crate::AerolispError::Export

/// XML export backend.
pub mod xml;

use aerolisp_core::document::Document;

/// Abstraction for document export backends.
pub trait Exporter {
    /// Exports a document to the backend's output format.
    ///
    /// Exporting never modifies the document; exporting the same document
    /// twice produces identical output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the document cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_document(&mut self, document: &Document) -> Result<(), Error>;
}

/// Errors that can occur during document export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
