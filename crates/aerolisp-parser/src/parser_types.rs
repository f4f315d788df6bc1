//! Parse tree produced by the [`parser`](super::parser).
//!
//! The tree mirrors the source closely and keeps a span on every node that
//! can be named in a diagnostic. [`elaborate`](super::elaborate) lowers it
//! into an [`aerolisp_core::document::Document`].

use aerolisp_core::{
    document::{AxisKind, Lookup},
    operator::OpKind,
    span::Spanned,
};

/// One expression inside a function body or an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp<'src> {
    Comment(Spanned<&'src str>),
    Property(Spanned<&'src str>),
    Value(Spanned<f64>),
    Table(TableForm<'src>),
    Operation(OperationForm<'src>),
}

/// `(op operand*)`
#[derive(Debug, Clone, PartialEq)]
pub struct OperationForm<'src> {
    pub kind: Spanned<OpKind>,
    pub operands: Vec<Sexp<'src>>,
}

/// `(row prop)` or `(column prop)`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec<'src> {
    pub lookup: Spanned<Lookup>,
    pub property: Spanned<&'src str>,
}

/// `(table name? index-spec index-spec? [rows])`
#[derive(Debug, Clone, PartialEq)]
pub struct TableForm<'src> {
    pub name: Option<Spanned<&'src str>>,
    pub index: Vec<IndexSpec<'src>>,
    pub data: Spanned<Vec<Vec<Option<f64>>>>,
}

/// `(def "doc"? name body+)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionForm<'src> {
    pub doc: Option<Spanned<String>>,
    pub name: Spanned<&'src str>,
    pub body: Vec<Sexp<'src>>,
}

/// `(axis TITLE (function | comment)*)`
#[derive(Debug, Clone, PartialEq)]
pub struct AxisForm<'src> {
    pub kind: Spanned<AxisKind>,
    pub entries: Vec<AxisEntry<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisEntry<'src> {
    Function(FunctionForm<'src>),
    Comment(Spanned<&'src str>),
}

/// A top-level form.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'src> {
    Function(FunctionForm<'src>),
    Axis(AxisForm<'src>),
    Comment(Spanned<&'src str>),
}
