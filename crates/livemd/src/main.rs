//! livemd - live markdown preview.
//!
//! Renders a markdown file to HTML, serves it on a local web server and
//! pushes a fresh rendering to every open browser tab whenever the file is
//! saved.

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::PreviewArgs;
use output::Output;

/// livemd - live markdown preview.
#[derive(Parser, Debug)]
#[command(name = "livemd", version, about)]
struct Cli {
    #[command(flatten)]
    preview: PreviewArgs,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout, usage errors to stderr; neither is a failure
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.preview.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Runtime::new()
        .map_err(error::CliError::from)
        .and_then(|rt| rt.block_on(cli.preview.execute()));

    if let Err(err) = result {
        output.fatal(&err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
