//! Command-line argument definitions for the Aerolisp CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the authoring path; global flags
//! control configuration file selection and logging verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Aerolisp model compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile source text to JSBSim XML
    Compile {
        /// Path to the input source file
        input: String,

        /// Path to the output XML file, standard output if absent
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the defined and the undefined properties of a source file
    Properties {
        /// Path to the input source file
        input: String,

        /// Path to the report file, standard output if absent
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Synthesize an airframe description (TOML) to JSBSim XML
    Build {
        /// Path to the airframe file
        input: String,

        /// Path to the output XML file, standard output if absent
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Command {
    pub fn input(&self) -> &str {
        match self {
            Command::Compile { input, .. }
            | Command::Properties { input, .. }
            | Command::Build { input, .. } => input,
        }
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Command::Compile { output, .. }
            | Command::Properties { output, .. }
            | Command::Build { output, .. } => output.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile() {
        let args = Args::parse_from(["aerolisp", "compile", "wing.aero", "-o", "wing.xml"]);
        assert!(matches!(args.command, Command::Compile { .. }));
        assert_eq!(args.command.input(), "wing.aero");
        assert_eq!(args.command.output(), Some("wing.xml"));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "aerolisp",
            "build",
            "airframe.toml",
            "--log-level",
            "debug",
            "--config",
            "aerolisp.toml",
        ]);
        assert!(matches!(args.command, Command::Build { .. }));
        assert_eq!(args.command.output(), None);
        assert_eq!(args.log_level, "debug");
        assert_eq!(args.config.as_deref(), Some("aerolisp.toml"));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Args::try_parse_from(["aerolisp"]).is_err());
    }
}
