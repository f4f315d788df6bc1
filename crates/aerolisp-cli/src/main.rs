//! Aerolisp CLI entry point.

use std::{io::Write, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info};

use aerolisp_cli::{Args, error_adapter};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    // env_logger writes to stderr; stdout carries the compiled document.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Aerolisp");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = aerolisp_cli::run(&args) {
        debug!(kind:? = err.kind(); "Compilation failed");

        // Reports go to stderr regardless of the log level.
        let _ = std::io::stderr()
            .lock()
            .write_all(error_adapter::render(&err).as_bytes());

        process::exit(1);
    }

    info!("Completed successfully");
}
