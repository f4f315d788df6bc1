//! CLI logic for the Aerolisp model compiler.
//!
//! Every command builds its whole output in memory before writing it, so a
//! failed run leaves no partial document behind.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{
    fs,
    io::{self, Write},
};

use log::info;

use aerolisp::{AerolispError, ModelBuilder, properties_report, synth::Airframe};

/// Run the Aerolisp CLI application
///
/// # Errors
///
/// Returns `AerolispError` for:
/// - File I/O errors
/// - Configuration and airframe loading errors
/// - Parsing, table shape and duplicate definition errors
/// - Geometry errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), AerolispError> {
    info!(
        input_path = args.command.input(),
        output_path = args.command.output().unwrap_or("-");
        "Processing model"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let builder = ModelBuilder::new(app_config);

    let output = match &args.command {
        Command::Compile { input, .. } => {
            let source = fs::read_to_string(input)?;
            let compilation = builder.compile(&source)?;
            builder.render_xml(compilation.document())?
        }
        Command::Properties { input, .. } => {
            let source = fs::read_to_string(input)?;
            let compilation = builder.compile(&source)?;
            properties_report(compilation.symbols())
        }
        Command::Build { input, .. } => {
            let airframe = load_airframe(input)?;
            let compilation = builder.synthesize(&airframe)?;
            builder.render_xml(compilation.document())?
        }
    };

    write_output(args.command.output(), &output)?;
    info!(bytes = output.len(); "Output written successfully");

    Ok(())
}

fn load_airframe(path: &str) -> Result<Airframe, AerolispError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|err| AerolispError::Config(format!("Invalid airframe {path}: {err}")))
}

fn write_output(path: Option<&str>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, content),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()
        }
    }
}
