//! Programmatic authoring path.
//!
//! An [`Airframe`] describes an aircraft by geometry instead of formulas:
//! wing panels, an optional fuselage, named constants and hand-written
//! formula functions. The synthesizer expands each part into the fixed
//! velocity → angle of attack → coefficient → force → moment chain and
//! accumulates the force and moment contributions into the six axes.
//!
//! Every formula is built as an expression tree; only the exporter renders
//! text.

mod fuselage;
mod panel;

pub use fuselage::{Fuselage, FuselageSpec};
pub use panel::{ControlSurface, Panel, PanelSpec};

use serde::Deserialize;

use aerolisp_core::{
    document::{AxisKind, Expr},
    geometry::GeometryError,
    operator::OpKind,
};

/// A constant function, `name = value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstantSpec {
    pub name: String,
    pub value: f64,
}

/// A function whose body is written as one s-expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormulaSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub formula: String,
    /// The accumulator to append the function to, top level if absent.
    #[serde(default)]
    pub axis: Option<AxisKind>,
}

/// Everything the programmatic path compiles in one run.
///
/// Parts are added to the document in field order: `source` first, then
/// constants, functions, panels and the fuselage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Airframe {
    /// Source text compiled into the same document.
    pub source: Option<String>,
    pub constants: Vec<ConstantSpec>,
    pub functions: Vec<FormulaSpec>,
    pub panels: Vec<PanelSpec>,
    pub fuselage: Option<FuselageSpec>,
}

impl Airframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: f64) -> Self {
        self.constants.push(ConstantSpec {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_function(mut self, function: FormulaSpec) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_panel(mut self, panel: PanelSpec) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn with_fuselage(mut self, fuselage: FuselageSpec) -> Self {
        self.fuselage = Some(fuselage);
        self
    }
}

fn property(name: &str) -> Expr {
    Expr::property(name)
}

fn value(value: f64) -> Expr {
    Expr::value(value)
}

/// `(* -1 terms...)`
fn negated(terms: Vec<Expr>) -> Expr {
    let mut operands = Vec::with_capacity(terms.len() + 1);
    operands.push(value(-1.0));
    operands.extend(terms);
    Expr::product(operands)
}

fn squared(base: Expr) -> Expr {
    Expr::op(OpKind::Pow, vec![base, value(2.0)])
}

/// `(* scale property)`, or the constant zero when there is no scale.
fn scaled_or_zero(scale: Option<f64>, name: &str) -> Expr {
    match scale {
        Some(scale) => Expr::product(vec![value(scale), property(name)]),
        None => value(0.0),
    }
}

/// The moment of a force applied at `position`, `(+ (* -1 a F1) (* b F2))`.
fn moment(lever_neg: Expr, force_neg: &str, lever_pos: Expr, force_pos: &str) -> Expr {
    Expr::sum(vec![
        negated(vec![lever_neg, property(force_neg)]),
        Expr::product(vec![lever_pos, property(force_pos)]),
    ])
}

fn ensure_finite(owner: &str, field: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}

fn ensure_positive(owner: &str, field: &'static str, value: f64) -> Result<f64, GeometryError> {
    let value = ensure_finite(owner, field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::NonPositive {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}
