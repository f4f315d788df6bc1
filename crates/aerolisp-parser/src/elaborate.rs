//! Elaboration phase for the Aerolisp parse tree
//!
//! This module lowers the parse tree into the shared [`Document`] model.
//! It is also where names meet the [`SymbolRegistry`]: every property
//! reference and every function or table definition is registered as it is
//! encountered, depth first and left to right, with the function name
//! registered before its body.
//!
//! [`Document`]: aerolisp_core::document::Document
//! [`SymbolRegistry`]: aerolisp_core::symbols::SymbolRegistry

use log::{debug, trace};

use aerolisp_core::{
    builder::DocumentBuilder,
    document::{Expr, Function, IndexVar, Item, Table},
    span::{Span, Spanned},
    symbols::DuplicateDefinition,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
};

pub struct Builder<'b> {
    target: &'b mut DocumentBuilder,
}

impl<'b> Builder<'b> {
    pub fn new(target: &'b mut DocumentBuilder) -> Self {
        Self { target }
    }

    /// Lower every top-level entry into the document.
    pub fn build(mut self, entries: Vec<types::Entry<'_>>) -> Result<(), Diagnostic> {
        debug!(entries = entries.len(); "Elaborating source");

        for entry in entries {
            match entry {
                types::Entry::Comment(text) => {
                    self.target.push_item(Item::Comment(comment_text(&text)));
                }
                types::Entry::Function(form) => {
                    let function = self.build_function(form)?;
                    self.target.push_item(Item::Function(function));
                }
                types::Entry::Axis(form) => {
                    let kind = *form.kind.inner();
                    trace!(axis = kind.title(), entries = form.entries.len(); "Elaborating axis");
                    for axis_entry in form.entries {
                        let item = match axis_entry {
                            types::AxisEntry::Comment(text) => Item::Comment(comment_text(&text)),
                            types::AxisEntry::Function(form) => {
                                Item::Function(self.build_function(form)?)
                            }
                        };
                        self.target.push_axis_item(kind, item);
                    }
                }
            }
        }

        Ok(())
    }

    /// Lower a single expression.
    pub fn build_expr(&mut self, sexp: types::Sexp<'_>) -> Result<Expr, Diagnostic> {
        match sexp {
            types::Sexp::Comment(text) => Ok(Expr::Comment(comment_text(&text))),
            types::Sexp::Property(name) => {
                self.target.symbols_mut().register_reference(name.inner());
                Ok(Expr::property(*name.inner()))
            }
            types::Sexp::Value(value) => Ok(Expr::value(*value.inner())),
            types::Sexp::Table(form) => self.build_table(form).map(Expr::from),
            types::Sexp::Operation(form) => {
                let operands = form
                    .operands
                    .into_iter()
                    .map(|operand| self.build_expr(operand))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::op(*form.kind.inner(), operands))
            }
        }
    }

    fn build_function(&mut self, form: types::FunctionForm<'_>) -> Result<Function, Diagnostic> {
        self.define(&form.name, "function")?;

        let body = form
            .body
            .into_iter()
            .map(|sexp| self.build_expr(sexp))
            .collect::<Result<Vec<_>, _>>()?;

        let function = Function::with_body(*form.name.inner(), body);
        Ok(match form.doc {
            Some(doc) => function.with_description(doc.into_inner()),
            None => function,
        })
    }

    fn build_table(&mut self, form: types::TableForm<'_>) -> Result<Table, Diagnostic> {
        if let Some(name) = &form.name {
            self.define(name, "table")?;
        }

        let index = form
            .index
            .iter()
            .map(|spec| {
                self.target
                    .symbols_mut()
                    .register_reference(spec.property.inner());
                IndexVar::new(*spec.lookup.inner(), *spec.property.inner())
            })
            .collect();

        Ok(Table::new(
            form.name.map(|name| name.inner().to_string()),
            index,
            form.data.into_inner(),
        ))
    }

    fn define(&mut self, name: &Spanned<&str>, what: &str) -> Result<(), Diagnostic> {
        self.target
            .symbols_mut()
            .register_definition(name.inner(), Some(name.span()))
            .map_err(|err| duplicate_diagnostic(&err, name.span(), what))
    }
}

/// Comment text as written, without surrounding blanks.
fn comment_text(text: &Spanned<&str>) -> String {
    text.inner().trim().to_string()
}

fn duplicate_diagnostic(err: &DuplicateDefinition, site: Span, what: &str) -> Diagnostic {
    let diagnostic = Diagnostic::error(format!(
        "{what} `{}` is defined multiple times",
        err.name()
    ))
    .with_code(ErrorCode::E300)
    .with_label(site, "duplicate definition");

    match err.previous() {
        Some(previous) => diagnostic
            .with_secondary_label(previous, "first defined here")
            .with_help("remove the duplicate or use a different name"),
        None => diagnostic.with_help(format!(
            "`{}` is already defined by the synthesized model",
            err.name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use aerolisp_core::{
        document::{AxisKind, Lookup},
        operator::OpKind,
    };

    use super::*;
    use crate::{lexer::tokenize, parser::build_spec};

    fn elaborate(source: &str, target: &mut DocumentBuilder) -> Result<(), Diagnostic> {
        let tokens = tokenize(source).expect("Failed to tokenize input");
        let entries = build_spec(&tokens)?;
        Builder::new(target).build(entries)
    }

    #[test]
    fn test_function_lowering() {
        let mut target = DocumentBuilder::new();
        elaborate(r#"(def "Drag" aero/CD (+ aero/CD0 (* k (pow CL 2))))"#, &mut target).unwrap();
        let compilation = target.finish();

        let function = compilation.document().function("aero/CD").unwrap();
        assert_eq!(function.description(), Some("Drag"));
        assert_eq!(
            function.expr(),
            Some(&Expr::sum(vec![
                Expr::property("aero/CD0"),
                Expr::product(vec![
                    Expr::property("k"),
                    Expr::op(OpKind::Pow, vec![Expr::property("CL"), Expr::value(2.0)]),
                ]),
            ]))
        );
    }

    #[test]
    fn test_registration() {
        let mut target = DocumentBuilder::new();
        elaborate(
            "(def f (table t (row alpha) [0 1, 1 2]))\n(def g (* f beta))",
            &mut target,
        )
        .unwrap();
        let symbols = target.symbols();

        assert_eq!(symbols.defined(), vec!["f", "g", "t"]);
        assert_eq!(symbols.undefined_references(), vec!["alpha", "beta"]);
        assert_eq!(symbols.definition_site("g"), Some(Span::new(46..47)));
    }

    #[test]
    fn test_table_lowering() {
        let mut target = DocumentBuilder::new();
        elaborate(
            "(def f (table (row a) (column b) [\"\" 0 1, 5 2 3]))",
            &mut target,
        )
        .unwrap();
        let compilation = target.finish();

        let Some(Expr::Table(table)) = compilation.document().function("f").unwrap().expr() else {
            panic!("expected a table body");
        };
        assert_eq!(table.name(), None);
        assert_eq!(table.index()[0].lookup(), Lookup::Row);
        assert_eq!(table.index()[1].property(), "b");
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn test_axis_accumulates() {
        let mut target = DocumentBuilder::new();
        elaborate(
            "(axis Z (def z1 1))\n(axis Z ; second block\n(def z2 2))",
            &mut target,
        )
        .unwrap();
        let compilation = target.finish();

        let z = compilation.document().axis(AxisKind::Z);
        assert_eq!(z.items().len(), 3);
        assert_eq!(z.items()[1], Item::Comment("second block".to_string()));
        assert!(compilation.document().axis(AxisKind::X).is_empty());
        assert_eq!(compilation.document().functions().count(), 0);
    }

    #[test]
    fn test_duplicate_function() {
        let mut target = DocumentBuilder::new();
        let diag = elaborate("(def CL 1)\n(def CL 2)", &mut target).unwrap_err();

        assert_eq!(diag.code(), Some(ErrorCode::E300));
        assert_eq!(diag.primary_span(), Some(Span::new(16..18)));
        assert_eq!(diag.labels()[1].span(), Span::new(5..7));
    }

    #[test]
    fn test_duplicate_across_function_and_table() {
        let mut target = DocumentBuilder::new();
        let diag = elaborate("(def t 1)\n(def g (table t (row a) [0 1]))", &mut target)
            .unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E300));
        assert!(diag.message().starts_with("table `t`"));
    }

    #[test]
    fn test_duplicate_of_synthesized_definition() {
        let mut target = DocumentBuilder::new();
        target
            .add_function(Function::constant("aero/metrics/S_w-sqft", 10.0))
            .unwrap();
        let diag = elaborate("(def aero/metrics/S_w-sqft 12)", &mut target).unwrap_err();

        assert_eq!(diag.labels().len(), 1);
        assert!(diag.help().unwrap().contains("synthesized"));
    }
}
