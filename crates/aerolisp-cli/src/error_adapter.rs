//! miette rendering for [`AerolispError`].
//!
//! Parse failures carry the source text and one [`Diagnostic`] per problem,
//! so each becomes its own report with labelled snippets. Every other
//! failure is a single report keyed by an `aerolisp::*` code.

use std::{error::Error, fmt};

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan,
    SourceCode, SourceSpan,
};

use aerolisp::AerolispError;
use aerolisp_parser::{Span, error::Diagnostic};

const DEFINITION_HELP: &str =
    "panel, constant and function names must be unique across the airframe";

/// One renderable failure.
pub enum Report<'a> {
    /// A parser diagnostic over the compiled source.
    Source {
        diagnostic: &'a Diagnostic,
        src: &'a str,
    },
    /// A failure with no source location.
    Plain(&'a AerolispError),
}

impl<'a> Report<'a> {
    /// Split an error into the reports the CLI prints, in diagnostic order.
    pub fn collect(err: &'a AerolispError) -> Vec<Self> {
        match err {
            AerolispError::Parse { err, src } => err
                .diagnostics()
                .iter()
                .map(|diagnostic| Report::Source {
                    diagnostic,
                    src: src.as_str(),
                })
                .collect(),
            other => vec![Report::Plain(other)],
        }
    }
}

/// Render every report of `err` with miette's graphical handler.
///
/// The CLI writes the result to stderr itself, so failures stay visible
/// when logging is off.
pub fn render(err: &AerolispError) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut rendered = String::new();
    for report in Report::collect(err) {
        if handler.render_report(&mut rendered, &report).is_err() {
            rendered.push_str(&report.to_string());
        }
        rendered.push('\n');
    }
    rendered
}

/// Stable code for errors that are not parser diagnostics.
fn plain_code(err: &AerolispError) -> Option<&'static str> {
    match err {
        AerolispError::Io(_) => Some("aerolisp::io"),
        AerolispError::Parse { .. } => None,
        AerolispError::Definition(_) => Some("aerolisp::definition"),
        AerolispError::Geometry(_) => Some("aerolisp::geometry"),
        AerolispError::Export(_) => Some("aerolisp::export"),
        AerolispError::Config(_) => Some("aerolisp::config"),
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

impl fmt::Debug for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Source { diagnostic, .. } => {
                f.debug_tuple("Source").field(diagnostic).finish()
            }
            Report::Plain(err) => f.debug_tuple("Plain").field(err).finish(),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Source { diagnostic, .. } => f.write_str(diagnostic.message()),
            Report::Plain(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl Error for Report<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Report::Source { .. } => None,
            Report::Plain(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        match self {
            Report::Source { diagnostic, .. } => diagnostic
                .code()
                .map(|code| Box::new(code) as Box<dyn fmt::Display>),
            Report::Plain(err) => {
                plain_code(err).map(|code| Box::new(code) as Box<dyn fmt::Display>)
            }
        }
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        match self {
            Report::Source { diagnostic, .. } => diagnostic
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display + 'b>),
            Report::Plain(AerolispError::Definition(_)) => Some(Box::new(DEFINITION_HELP)),
            Report::Plain(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Report::Source { src, .. } => Some(src as &dyn SourceCode),
            Report::Plain(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Report::Source { diagnostic, .. } = self else {
            return None;
        };
        if diagnostic.labels().is_empty() {
            return None;
        }

        Some(Box::new(diagnostic.labels().iter().map(|label| {
            let text = Some(label.message().to_string());
            let span = source_span(label.span());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        })))
    }
}
