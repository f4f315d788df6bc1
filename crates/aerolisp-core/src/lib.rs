//! Aerolisp Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Aerolisp
//! parser, synthesizer and exporter:
//!
//! - **Spans**: Source locations ([`span::Span`])
//! - **Document**: The intermediate model both authoring paths lower into ([`document`] module)
//! - **Operators**: The closed operator vocabulary with arities ([`operator::OpKind`])
//! - **Symbols**: The per-compilation registry of defined and referenced names ([`symbols::SymbolRegistry`])
//! - **Builder**: Lowering with symbol bookkeeping ([`builder::DocumentBuilder`])
//! - **Geometry**: Vectors and unit systems for panel descriptions ([`geometry`] module)

pub mod builder;
pub mod document;
pub mod error;
pub mod geometry;
pub mod operator;
pub mod span;
pub mod symbols;

pub use error::ErrorKind;
