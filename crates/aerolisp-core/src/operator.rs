//! The closed operator vocabulary of the formula language.
//!
//! Every operator has a source spelling (what is written after `(` in the
//! DSL), an element name (what the simulator schema calls it) and a fixed
//! [`Arity`] that is checked while parsing.

use std::fmt;

/// How many operands an operator accepts.
///
/// Comments inside an operation do not count as operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` operands.
    Exactly(usize),
    /// `n` or more operands.
    AtLeast(usize),
}

impl Arity {
    /// Returns `true` if `count` operands satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "exactly 1 operand"),
            Arity::Exactly(n) => write!(f, "exactly {n} operands"),
            Arity::AtLeast(1) => write!(f, "at least 1 operand"),
            Arity::AtLeast(n) => write!(f, "at least {n} operands"),
        }
    }
}

/// An operator of the formula language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Sum,
    Difference,
    Product,
    Quotient,
    Pow,
    Exp,
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Min,
    Max,
    Avg,
    Fraction,
    Mod,
    Random,
    Integer,
}

impl OpKind {
    /// All operators, in vocabulary order.
    pub const ALL: [OpKind; 21] = [
        OpKind::Sum,
        OpKind::Difference,
        OpKind::Product,
        OpKind::Quotient,
        OpKind::Pow,
        OpKind::Exp,
        OpKind::Abs,
        OpKind::Sin,
        OpKind::Cos,
        OpKind::Tan,
        OpKind::Asin,
        OpKind::Acos,
        OpKind::Atan,
        OpKind::Atan2,
        OpKind::Min,
        OpKind::Max,
        OpKind::Avg,
        OpKind::Fraction,
        OpKind::Mod,
        OpKind::Random,
        OpKind::Integer,
    ];

    /// Look up an operator by its source spelling.
    pub fn from_symbol(symbol: &str) -> Option<OpKind> {
        OpKind::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// The spelling used in DSL source.
    pub fn symbol(self) -> &'static str {
        match self {
            OpKind::Sum => "+",
            OpKind::Difference => "-",
            OpKind::Product => "*",
            OpKind::Quotient => "/",
            other => other.element_name(),
        }
    }

    /// The element name used in the output document.
    pub fn element_name(self) -> &'static str {
        match self {
            OpKind::Sum => "sum",
            OpKind::Difference => "difference",
            OpKind::Product => "product",
            OpKind::Quotient => "quotient",
            OpKind::Pow => "pow",
            OpKind::Exp => "exp",
            OpKind::Abs => "abs",
            OpKind::Sin => "sin",
            OpKind::Cos => "cos",
            OpKind::Tan => "tan",
            OpKind::Asin => "asin",
            OpKind::Acos => "acos",
            OpKind::Atan => "atan",
            OpKind::Atan2 => "atan2",
            OpKind::Min => "min",
            OpKind::Max => "max",
            OpKind::Avg => "avg",
            OpKind::Fraction => "fraction",
            OpKind::Mod => "mod",
            OpKind::Random => "random",
            OpKind::Integer => "integer",
        }
    }

    /// The number of operands this operator accepts.
    pub fn arity(self) -> Arity {
        match self {
            OpKind::Sum | OpKind::Product | OpKind::Min | OpKind::Max | OpKind::Avg => {
                Arity::AtLeast(1)
            }
            OpKind::Difference => Arity::AtLeast(2),
            OpKind::Quotient | OpKind::Pow | OpKind::Atan2 | OpKind::Mod => Arity::Exactly(2),
            OpKind::Exp
            | OpKind::Abs
            | OpKind::Sin
            | OpKind::Cos
            | OpKind::Tan
            | OpKind::Asin
            | OpKind::Acos
            | OpKind::Atan
            | OpKind::Fraction
            | OpKind::Integer => Arity::Exactly(1),
            OpKind::Random => Arity::Exactly(0),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
