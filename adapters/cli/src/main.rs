#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line tool converting Boxoban levels between formats.

mod config;
mod conversion;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{config::ToolsConfig, conversion::Mode};

const USAGE: &str = "\
Usage: boxoban-tools <mode> <input> [output]

Modes:
  -tmx      <in.tmx> [out.xml]   Tiled map to level document
  -txt      <in.txt> [out.xml]   text map to level document
  -txt2tmx  <in.txt> [out.tmx]   text map to Tiled map
  -xml2tmx  <in.xml> [out.tmx]   level document to Tiled map
  -show     <in.xml>             print a level document as a text map

Without an output path the input file name is reused with the mode's
extension in the working directory. Set BOXOBAN_TOOLS_CONFIG to a TOML file
to override level defaults and tile settings.
";

#[derive(Debug, Parser)]
#[command(name = "boxoban-tools", disable_help_flag = true, disable_version_flag = true)]
struct Arguments {
    /// Conversion to run, such as `-tmx`.
    #[arg(allow_hyphen_values = true)]
    mode: String,
    /// Level to read.
    input: PathBuf,
    /// File to write.
    output: Option<PathBuf>,
}

/// Entry point for the Boxoban conversion tool.
fn main() -> ExitCode {
    install_tracing();

    let Ok(arguments) = Arguments::try_parse() else {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    };
    let Some(mode) = Mode::from_flag(&arguments.mode) else {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    };
    if !arguments.input.is_file() {
        println!("Input file {} not found.\n", arguments.input.display());
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let outcome = ToolsConfig::from_env().and_then(|config| {
        conversion::run(mode, &arguments.input, arguments.output.as_deref(), &config)
    });
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
