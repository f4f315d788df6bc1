//! The intermediate document shared by both authoring paths.
//!
//! Source text and synthesized panels are both lowered into a [`Document`]:
//! an ordered list of top-level [`Item`]s followed by the six body-axis
//! accumulators. The document carries no spans; location information only
//! lives in the parser's tree.

use std::fmt;

use serde::Deserialize;

use crate::operator::OpKind;

/// A formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A comment kept in the output.
    Comment(String),
    /// A reference to a named simulator property.
    Property(String),
    /// A numeric literal.
    Value(f64),
    /// A lookup table.
    Table(Table),
    /// An operator applied to operands.
    Operation(Operation),
}

impl Expr {
    /// Reference a property by name.
    pub fn property(name: impl Into<String>) -> Self {
        Expr::Property(name.into())
    }

    /// A numeric literal.
    pub fn value(value: f64) -> Self {
        Expr::Value(value)
    }

    /// Apply `kind` to `operands`.
    pub fn op(kind: OpKind, operands: Vec<Expr>) -> Self {
        Expr::Operation(Operation::new(kind, operands))
    }

    /// `(+ operands...)`
    pub fn sum(operands: Vec<Expr>) -> Self {
        Expr::op(OpKind::Sum, operands)
    }

    /// `(* operands...)`
    pub fn product(operands: Vec<Expr>) -> Self {
        Expr::op(OpKind::Product, operands)
    }

    /// Apply a one-operand function such as `sin` or `abs`.
    pub fn unary(kind: OpKind, operand: Expr) -> Self {
        Expr::op(kind, vec![operand])
    }

    /// Returns `true` for comments.
    pub fn is_comment(&self) -> bool {
        matches!(self, Expr::Comment(_))
    }
}

impl From<Table> for Expr {
    fn from(table: Table) -> Self {
        Expr::Table(table)
    }
}

/// An operator with its operands, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    kind: OpKind,
    operands: Vec<Expr>,
}

impl Operation {
    pub fn new(kind: OpKind, operands: Vec<Expr>) -> Self {
        Self { kind, operands }
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }
}

/// Which table dimension an independent variable indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Row,
    Column,
}

impl Lookup {
    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::Row => "row",
            Lookup::Column => "column",
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An independent variable declaration of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexVar {
    lookup: Lookup,
    property: String,
}

impl IndexVar {
    pub fn new(lookup: Lookup, property: impl Into<String>) -> Self {
        Self {
            lookup,
            property: property.into(),
        }
    }

    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

/// A lookup table with one or two independent variables.
///
/// `data` is a grid of rows. The parser only produces rectangular grids.
/// Exporters pad short rows with blank cells. A `None` cell is the omitted
/// corner header of a two-dimensional table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: Option<String>,
    index: Vec<IndexVar>,
    data: Vec<Vec<Option<f64>>>,
}

impl Table {
    /// Create a table from already validated parts.
    pub fn new(name: Option<String>, index: Vec<IndexVar>, data: Vec<Vec<Option<f64>>>) -> Self {
        Self { name, index, data }
    }

    /// A one-dimensional breakpoint table over `property` with `(x, y)` knots.
    pub fn breakpoints(
        name: impl Into<String>,
        property: impl Into<String>,
        knots: &[(f64, f64)],
    ) -> Self {
        let data = knots
            .iter()
            .map(|&(x, y)| vec![Some(x), Some(y)])
            .collect();
        Self::new(
            Some(name.into()),
            vec![IndexVar::new(Lookup::Row, property)],
            data,
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> &[IndexVar] {
        &self.index
    }

    pub fn data(&self) -> &[Vec<Option<f64>>] {
        &self.data
    }

    /// Number of columns, fixed by the first row.
    pub fn width(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// All cells in row-major order, skipping omitted ones.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().flatten().filter_map(|cell| *cell)
    }
}

/// A named formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    name: String,
    description: Option<String>,
    body: Vec<Expr>,
}

impl Function {
    /// A function whose body is the single expression `body`.
    pub fn new(name: impl Into<String>, body: Expr) -> Self {
        Self::with_body(name, vec![body])
    }

    pub fn with_body(name: impl Into<String>, body: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            body,
        }
    }

    /// A function that evaluates to a fixed number.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, Expr::value(value))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn body(&self) -> &[Expr] {
        &self.body
    }

    /// The first non-comment expression of the body.
    pub fn expr(&self) -> Option<&Expr> {
        self.body.iter().find(|expr| !expr.is_comment())
    }
}

/// An entry of the top level or of an axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Comment(String),
}

impl Item {
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Item::Function(function) => Some(function),
            Item::Comment(_) => None,
        }
    }
}

impl From<Function> for Item {
    fn from(function: Function) -> Self {
        Item::Function(function)
    }
}

/// One of the six body-axis accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AxisKind {
    X,
    Y,
    Z,
    Roll,
    Pitch,
    Yaw,
}

impl AxisKind {
    /// All axes, in output order.
    pub const ALL: [AxisKind; 6] = [
        AxisKind::X,
        AxisKind::Y,
        AxisKind::Z,
        AxisKind::Roll,
        AxisKind::Pitch,
        AxisKind::Yaw,
    ];

    /// The axis title as written in source and output.
    pub fn title(self) -> &'static str {
        match self {
            AxisKind::X => "X",
            AxisKind::Y => "Y",
            AxisKind::Z => "Z",
            AxisKind::Roll => "ROLL",
            AxisKind::Pitch => "PITCH",
            AxisKind::Yaw => "YAW",
        }
    }

    pub fn from_title(title: &str) -> Option<AxisKind> {
        AxisKind::ALL.into_iter().find(|axis| axis.title() == title)
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The functions accumulated into one body axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    kind: AxisKind,
    items: Vec<Item>,
}

impl Axis {
    fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(Item::as_function)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A compiled aerodynamic model.
///
/// All six axes always exist, in [`AxisKind::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    items: Vec<Item>,
    axes: [Axis; 6],
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            axes: AxisKind::ALL.map(Axis::new),
        }
    }

    /// Top-level items, in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Top-level functions, in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(Item::as_function)
    }

    /// Find a top-level function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|function| function.name() == name)
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, kind: AxisKind) -> &Axis {
        &self.axes[kind.position()]
    }

    pub(crate) fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn push_to_axis(&mut self, kind: AxisKind, item: Item) {
        self.axes[kind.position()].items.push(item);
    }
}
