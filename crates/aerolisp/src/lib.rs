//! Aerolisp - compile aerodynamic force-and-moment models for JSBSim.
//!
//! Models are written either as s-expressions or as an [`synth::Airframe`]
//! of wing panels and a fuselage. Both paths build the same
//! [`document::Document`], which renders to a JSBSim `<aerodynamics>`
//! section.

pub mod config;
pub mod export;
pub mod synth;

mod error;

pub use aerolisp_core::{ErrorKind, builder, document, geometry, operator, symbols};

pub use error::AerolispError;

use log::{debug, info, trace};

use aerolisp_core::{
    builder::{Compilation, DocumentBuilder},
    document::{Document, Function, Item},
    symbols::SymbolRegistry,
};

use config::AppConfig;
use synth::{Airframe, Fuselage, Panel};

/// Builder for compiling and rendering Aerolisp models.
///
/// # Examples
///
/// ```rust
/// use aerolisp::{ModelBuilder, config::AppConfig};
///
/// let source = "(def aero/coefficients/CL (* 5.1 aero/alpha-rad))";
///
/// let builder = ModelBuilder::new(AppConfig::default());
/// let compilation = builder.compile(source).expect("Failed to compile");
///
/// let xml = builder
///     .render_xml(compilation.document())
///     .expect("Failed to render");
/// assert!(xml.contains("<function name=\"aero/coefficients/CL\">"));
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Compile s-expression source into a document and its symbol table.
    ///
    /// # Errors
    ///
    /// Returns [`AerolispError::Parse`] for malformed source, table shape
    /// errors and duplicate definitions.
    pub fn compile(&self, source: &str) -> Result<Compilation, AerolispError> {
        info!("Compiling source");

        let compilation = aerolisp_parser::parse(source)
            .map_err(|err| AerolispError::new_parse_error(err, source))?;

        debug!(
            functions = compilation.document().functions().count();
            "Source compiled successfully"
        );
        trace!(document:? = compilation.document(); "Compiled document");

        Ok(compilation)
    }

    /// Synthesize an airframe, together with its embedded source, into one
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`AerolispError::Parse`] for malformed source or formulas,
    /// [`AerolispError::Geometry`] for an invalid panel or fuselage and
    /// [`AerolispError::Definition`] when a synthesized name is defined
    /// twice.
    pub fn synthesize(&self, airframe: &Airframe) -> Result<Compilation, AerolispError> {
        info!(
            panels = airframe.panels.len(),
            fuselage = airframe.fuselage.is_some();
            "Synthesizing airframe"
        );

        let names = self.config.properties();
        let mut target = DocumentBuilder::new();

        if let Some(source) = &airframe.source {
            aerolisp_parser::parse_into(source, &mut target)
                .map_err(|err| AerolispError::new_parse_error(err, source.as_str()))?;
        }

        for constant in &airframe.constants {
            target.add_function(Function::constant(&constant.name, constant.value))?;
        }

        for formula in &airframe.functions {
            // The name is defined before its body, as in source text.
            target.symbols_mut().register_definition(&formula.name, None)?;
            let body = aerolisp_parser::parse_expression(&formula.formula, &mut target)
                .map_err(|err| AerolispError::new_parse_error(err, formula.formula.as_str()))?;

            let function = Function::new(&formula.name, body);
            let function = match &formula.description {
                Some(description) => function.with_description(description),
                None => function,
            };
            match formula.axis {
                Some(axis) => target.push_axis_item(axis, Item::Function(function)),
                None => target.push_item(Item::Function(function)),
            }
        }

        for spec in &airframe.panels {
            Panel::new(spec.clone())?.synthesize(names, &mut target)?;
        }

        if let Some(spec) = &airframe.fuselage {
            Fuselage::new(spec.clone())?.synthesize(names, &mut target)?;
        }

        let compilation = target.finish();
        debug!(
            functions = compilation.document().functions().count();
            "Airframe synthesized successfully"
        );
        Ok(compilation)
    }

    /// Render a document as JSBSim XML.
    ///
    /// # Errors
    ///
    /// Returns [`AerolispError::Export`] if the XML cannot be written.
    pub fn render_xml(&self, document: &Document) -> Result<String, AerolispError> {
        info!("Rendering XML");
        let xml = export::xml::render(document, self.config.export())?;
        debug!(bytes = xml.len(); "XML rendered successfully");
        Ok(xml)
    }
}

/// The defined and the referenced-but-undefined names of a compilation,
/// one per line and sorted, under `DEFINED:` and `UNDEFINED:` headers.
pub fn properties_report(symbols: &SymbolRegistry) -> String {
    let mut report = String::from("DEFINED:\n");
    for name in symbols.defined() {
        report.push_str(name);
        report.push('\n');
    }
    report.push_str("UNDEFINED:\n");
    for name in symbols.undefined_references() {
        report.push_str(name);
        report.push('\n');
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_report() {
        let compilation = ModelBuilder::default()
            .compile("(def b (* a c))\n(def a 1)")
            .unwrap();

        assert_eq!(
            properties_report(compilation.symbols()),
            "DEFINED:\na\nb\nUNDEFINED:\nc\n"
        );
    }

    #[test]
    fn test_empty_report() {
        let compilation = ModelBuilder::default().compile("").unwrap();
        assert_eq!(properties_report(compilation.symbols()), "DEFINED:\nUNDEFINED:\n");
    }
}
