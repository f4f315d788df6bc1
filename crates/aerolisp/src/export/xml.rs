//! JSBSim XML backend.
//!
//! Renders a [`Document`] as an `<aerodynamics>` section: top-level items in
//! order, followed by one `<axis>` element per accumulator. Operations become
//! elements named after their operator, and tables render their grid as a
//! left-aligned text block.

use std::io::Write;

use log::debug;
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use aerolisp_core::document::{Axis, Document, Expr, Function, Item, Table};

use super::{Error, Exporter};
use crate::config::ExportConfig;

/// Columns of a table grid are separated by this many spaces.
const COLUMN_GAP: usize = 2;

/// Writes documents as indented XML to `W`.
pub struct XmlExporter<'a, W: Write> {
    writer: Writer<W>,
    config: &'a ExportConfig,
    /// Number of currently open elements.
    depth: usize,
}

impl<'a, W: Write> XmlExporter<'a, W> {
    pub fn new(inner: W, config: &'a ExportConfig) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', config.indent()),
            config,
            depth: 0,
        }
    }

    /// Consume the exporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.writer
            .write_event(event)
            .map_err(|err| Error::Render(err.to_string()))
    }

    fn start(&mut self, element: BytesStart<'_>) -> Result<(), Error> {
        self.depth += 1;
        self.write(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        self.depth = self.depth.saturating_sub(1);
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// `<name attrs>text</name>` on one line.
    fn text_element(&mut self, element: BytesStart<'_>, text: &str) -> Result<(), Error> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        self.start(element)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(&name)
    }

    fn comment(&mut self, text: &str) -> Result<(), Error> {
        self.write(Event::Comment(BytesText::from_escaped(comment_body(text))))
    }

    fn item(&mut self, item: &Item) -> Result<(), Error> {
        match item {
            Item::Function(function) => self.function(function),
            Item::Comment(text) => self.comment(text),
        }
    }

    fn function(&mut self, function: &Function) -> Result<(), Error> {
        let mut element = BytesStart::new("function");
        element.push_attribute(("name", function.name()));
        self.start(element)?;

        if let Some(description) = function.description() {
            self.text_element(BytesStart::new("description"), description)?;
        }
        for expr in function.body() {
            self.expr(expr)?;
        }

        self.end("function")
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), Error> {
        match expr {
            Expr::Comment(text) => self.comment(text),
            Expr::Property(name) => self.text_element(BytesStart::new("property"), name),
            Expr::Value(value) => {
                self.text_element(BytesStart::new("value"), &format_value(*value))
            }
            Expr::Table(table) => self.table(table),
            Expr::Operation(operation) => {
                let name = operation.kind().element_name();
                if operation.operands().is_empty() {
                    return self.write(Event::Empty(BytesStart::new(name)));
                }
                self.start(BytesStart::new(name))?;
                for operand in operation.operands() {
                    self.expr(operand)?;
                }
                self.end(name)
            }
        }
    }

    fn table(&mut self, table: &Table) -> Result<(), Error> {
        let mut element = BytesStart::new("table");
        if let Some(name) = table.name() {
            element.push_attribute(("name", name));
        }
        self.start(element)?;

        for index in table.index() {
            let mut element = BytesStart::new("independentVar");
            element.push_attribute(("lookup", index.lookup().as_str()));
            self.text_element(element, index.property())?;
        }

        // The grid sits one level below `<tableData>`, whose closing tag
        // follows the text directly.
        let unit = " ".repeat(self.config.indent());
        let inner = unit.repeat(self.depth + 1);
        let mut text = String::from("\n");
        for line in format_grid(table) {
            text.push_str(&inner);
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&unit.repeat(self.depth));
        self.text_element(BytesStart::new("tableData"), &text)?;

        self.end("table")
    }

    fn axis(&mut self, axis: &Axis) -> Result<(), Error> {
        let mut element = BytesStart::new("axis");
        element.push_attribute(("name", axis.kind().title()));
        element.push_attribute(("frame", self.config.frame()));

        if axis.is_empty() {
            return self.write(Event::Empty(element));
        }

        self.start(element)?;
        for item in axis.items() {
            self.item(item)?;
        }
        self.end("axis")
    }
}

impl<W: Write> Exporter for XmlExporter<'_, W> {
    fn export_document(&mut self, document: &Document) -> Result<(), Error> {
        debug!(
            items = document.items().len(),
            functions = document.functions().count();
            "Exporting document as XML"
        );

        let root = self.config.root().to_string();
        self.start(BytesStart::new(root.as_str()))?;
        for item in document.items() {
            self.item(item)?;
        }
        for axis in document.axes() {
            self.axis(axis)?;
        }
        self.end(&root)?;

        self.writer.get_mut().write_all(b"\n").map_err(Error::Io)
    }
}

/// Render `document` to an XML string.
///
/// # Errors
///
/// Returns [`Error::Render`] if the XML cannot be produced.
pub fn render(document: &Document, config: &ExportConfig) -> Result<String, Error> {
    let mut exporter = XmlExporter::new(Vec::new(), config);
    exporter.export_document(document)?;
    String::from_utf8(exporter.into_inner()).map_err(|err| Error::Render(err.to_string()))
}

/// Shortest text that reads back as the same number.
fn format_value(value: f64) -> String {
    value.to_string()
}

/// Table rows as left-aligned text lines. Omitted cells are blank.
/// Pad a comment with spaces and split every run of dashes, since `--` may
/// not appear inside an XML comment.
fn comment_body(text: &str) -> String {
    let mut body = String::with_capacity(text.len() + 2);
    body.push(' ');
    let mut previous = None;
    for c in text.chars() {
        if c == '-' && previous == Some('-') {
            body.push(' ');
        }
        body.push(c);
        previous = Some(c);
    }
    body.push(' ');
    body
}

fn format_grid(table: &Table) -> Vec<String> {
    let cells: Vec<Vec<String>> = table
        .data()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map(format_value).unwrap_or_default())
                .collect()
        })
        .collect();

    // Short rows are padded with blank cells.
    let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            cells
                .iter()
                .map(|row| row.get(column).map_or(0, String::len))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let gap = " ".repeat(COLUMN_GAP);
    cells
        .iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(&gap)
                .trim_end()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use aerolisp_core::{
        builder::DocumentBuilder,
        document::{AxisKind, IndexVar, Lookup},
        operator::OpKind,
    };

    use super::*;

    fn render_default(document: &Document) -> String {
        render(document, &ExportConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_document() {
        let xml = render_default(&Document::new());
        assert_eq!(
            xml,
            "<aerodynamics>\n\
             \x20   <axis name=\"X\" frame=\"BODY\"/>\n\
             \x20   <axis name=\"Y\" frame=\"BODY\"/>\n\
             \x20   <axis name=\"Z\" frame=\"BODY\"/>\n\
             \x20   <axis name=\"ROLL\" frame=\"BODY\"/>\n\
             \x20   <axis name=\"PITCH\" frame=\"BODY\"/>\n\
             \x20   <axis name=\"YAW\" frame=\"BODY\"/>\n\
             </aerodynamics>\n"
        );
    }

    #[test]
    fn test_function_layout() {
        let mut builder = DocumentBuilder::new();
        builder
            .add_function(
                Function::new(
                    "aero/forces/L-lb",
                    Expr::product(vec![Expr::property("aero/qbar-psf"), Expr::value(0.5)]),
                )
                .with_description("Lift"),
            )
            .unwrap();
        let compilation = builder.finish();

        let xml = render(compilation.document(), &ExportConfig::new(2, "aerodynamics", "BODY"))
            .unwrap();
        assert!(xml.starts_with(
            "<aerodynamics>\n\
             \x20 <function name=\"aero/forces/L-lb\">\n\
             \x20   <description>Lift</description>\n\
             \x20   <product>\n\
             \x20     <property>aero/qbar-psf</property>\n\
             \x20     <value>0.5</value>\n\
             \x20   </product>\n\
             \x20 </function>\n"
        ));
    }

    #[test]
    fn test_table_grid_alignment() {
        let table = Table::new(
            Some("tbl".to_string()),
            vec![
                IndexVar::new(Lookup::Row, "alpha"),
                IndexVar::new(Lookup::Column, "beta"),
            ],
            vec![
                vec![None, Some(0.0), Some(10.0)],
                vec![Some(-0.25), Some(1.5), Some(2.0)],
            ],
        );

        assert_eq!(format_grid(&table), vec!["       0    10", "-0.25  1.5  2"]);
    }

    #[test]
    fn test_table_element() {
        let mut builder = DocumentBuilder::new();
        builder
            .add_function(Function::new(
                "CL",
                Expr::from(Table::breakpoints("CL-table", "alpha", &[(-1.0, -2.0), (1.0, 2.0)])),
            ))
            .unwrap();
        let xml = render_default(builder.finish().document());

        assert!(xml.contains("        <table name=\"CL-table\">\n"));
        assert!(xml.contains("            <independentVar lookup=\"row\">alpha</independentVar>\n"));
        assert!(xml.contains(
            "            <tableData>\n                -1  -2\n                1   2\n            </tableData>\n"
        ));
    }

    #[test]
    fn test_comments_and_nullary_operators() {
        let mut builder = DocumentBuilder::new();
        builder.push_item(Item::Comment("gust -- model".to_string()));
        builder
            .add_axis_function(
                AxisKind::Yaw,
                Function::with_body(
                    "noise",
                    vec![
                        Expr::Comment("random".to_string()),
                        Expr::op(OpKind::Random, Vec::new()),
                    ],
                ),
            )
            .unwrap();
        let xml = render_default(builder.finish().document());

        assert!(xml.contains("<!-- gust - - model -->"));
        assert!(xml.contains("<random/>"));
        assert!(xml.contains("<axis name=\"YAW\" frame=\"BODY\">"));
    }

    #[test]
    fn test_banner_comments_stay_well_formed() {
        assert_eq!(comment_body("-----"), " - - - - - ");
        assert_eq!(comment_body("a --- b"), " a - - - b ");

        let mut builder = DocumentBuilder::new();
        builder.push_item(Item::Comment("----- wing -----".to_string()));
        let xml = render_default(builder.finish().document());

        let start = xml.find("<!--").unwrap() + 4;
        let end = xml.find("-->").unwrap();
        assert!(!xml[start..end].contains("--"), "{xml}");
        assert!(xml.contains("<!-- - - - - - wing - - - - - -->"));
    }

    #[test]
    fn test_ragged_table_grid() {
        let table = Table::new(
            None,
            vec![IndexVar::new(Lookup::Row, "alpha")],
            vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]],
        );

        assert_eq!(format_grid(&table), vec!["1  2", "3"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut builder = DocumentBuilder::new();
        builder
            .add_function(Function::constant("aero/k", 0.05))
            .unwrap();
        let compilation = builder.finish();

        let first = render_default(compilation.document());
        let second = render_default(compilation.document());
        assert_eq!(first, second);
    }
}
