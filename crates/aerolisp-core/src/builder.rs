//! Lowering into a [`Document`] with symbol bookkeeping.
//!
//! [`DocumentBuilder`] owns the document and the [`SymbolRegistry`] of one
//! compilation. The source-text path registers names itself (it knows the
//! spans) and pushes finished items; the synthesized path hands over whole
//! [`Function`]s and lets the builder walk them.

use log::debug;

use crate::{
    document::{AxisKind, Document, Expr, Function, Item},
    symbols::{DuplicateDefinition, SymbolRegistry},
};

/// The result of one compilation: the document and its symbol table.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    document: Document,
    symbols: SymbolRegistry,
}

impl Compilation {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    pub fn into_parts(self) -> (Document, SymbolRegistry) {
        (self.document, self.symbols)
    }
}

/// Accumulates items and axis contributions for one compilation.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
    symbols: SymbolRegistry,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolRegistry {
        &mut self.symbols
    }

    /// Append an item whose names are already registered.
    pub fn push_item(&mut self, item: Item) {
        self.document.push(item);
    }

    /// Append an item, whose names are already registered, to an axis.
    pub fn push_axis_item(&mut self, axis: AxisKind, item: Item) {
        self.document.push_to_axis(axis, item);
    }

    /// Register `function` and append it to the top level.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateDefinition`] if the function name or a table
    /// named in its body is already defined. Nothing is appended then.
    pub fn add_function(&mut self, function: Function) -> Result<(), DuplicateDefinition> {
        self.register_function(&function)?;
        self.document.push(Item::Function(function));
        Ok(())
    }

    /// Register `function` and append it to the `axis` accumulator.
    ///
    /// # Errors
    ///
    /// See [`DocumentBuilder::add_function`].
    pub fn add_axis_function(
        &mut self,
        axis: AxisKind,
        function: Function,
    ) -> Result<(), DuplicateDefinition> {
        self.register_function(&function)?;
        self.document.push_to_axis(axis, Item::Function(function));
        Ok(())
    }

    pub fn finish(self) -> Compilation {
        debug!(
            functions = self.document.functions().count(),
            defined = self.symbols.defined().len(),
            undefined = self.symbols.undefined_references().len();
            "Document finished"
        );
        Compilation {
            document: self.document,
            symbols: self.symbols,
        }
    }

    fn register_function(&mut self, function: &Function) -> Result<(), DuplicateDefinition> {
        self.symbols.register_definition(function.name(), None)?;
        function
            .body()
            .iter()
            .try_for_each(|expr| register_expr(&mut self.symbols, expr))
    }
}

/// Register the names used by `expr`, depth first, left to right.
fn register_expr(symbols: &mut SymbolRegistry, expr: &Expr) -> Result<(), DuplicateDefinition> {
    match expr {
        Expr::Comment(_) | Expr::Value(_) => Ok(()),
        Expr::Property(name) => {
            symbols.register_reference(name);
            Ok(())
        }
        Expr::Table(table) => {
            if let Some(name) = table.name() {
                symbols.register_definition(name, None)?;
            }
            for index in table.index() {
                symbols.register_reference(index.property());
            }
            Ok(())
        }
        Expr::Operation(operation) => operation
            .operands()
            .iter()
            .try_for_each(|operand| register_expr(symbols, operand)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Table;

    fn lift_function() -> Function {
        Function::new(
            "aero/coefficients/CL",
            Expr::product(vec![
                Expr::property("aero/qbar-psf"),
                Expr::Table(Table::breakpoints(
                    "aero/table/CL_alpha",
                    "aero/alpha-rad",
                    &[(-1.0, -1.0), (1.0, 1.0)],
                )),
            ]),
        )
    }

    #[test]
    fn test_add_function_registers_names() {
        let mut builder = DocumentBuilder::new();
        builder.add_function(lift_function()).unwrap();
        let compilation = builder.finish();

        assert_eq!(
            compilation.symbols().defined(),
            ["aero/coefficients/CL", "aero/table/CL_alpha"]
        );
        assert_eq!(
            compilation.symbols().undefined_references(),
            ["aero/alpha-rad", "aero/qbar-psf"]
        );
        assert_eq!(compilation.document().functions().count(), 1);
    }

    #[test]
    fn test_duplicate_function_is_not_appended() {
        let mut builder = DocumentBuilder::new();
        builder.add_function(lift_function()).unwrap();

        let err = builder
            .add_axis_function(AxisKind::Z, lift_function())
            .unwrap_err();

        assert_eq!(err.name(), "aero/coefficients/CL");
        assert_eq!(err.previous(), None);
        let compilation = builder.finish();
        assert!(compilation.document().axis(AxisKind::Z).is_empty());
    }

    #[test]
    fn test_axis_function_lands_in_axis() {
        let mut builder = DocumentBuilder::new();
        builder
            .add_axis_function(
                AxisKind::Pitch,
                Function::new("aero/moments/M", Expr::value(0.0)),
            )
            .unwrap();
        let (document, _) = builder.finish().into_parts();

        assert_eq!(document.functions().count(), 0);
        let pitch: Vec<_> = document
            .axis(AxisKind::Pitch)
            .functions()
            .map(Function::name)
            .collect();
        assert_eq!(pitch, ["aero/moments/M"]);
    }
}
