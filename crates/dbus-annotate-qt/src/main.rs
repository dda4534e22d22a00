use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use qtdbus_annotate::TypeMapping;

#[derive(Parser, Debug)]
#[command(
    name = "dbus-annotate-qt",
    version,
    about = "Add QtDBus type-name annotations to D-Bus interface XML"
)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// D-Bus interface description files, rewritten in place
    #[arg(required = true, num_args = 1..)]
    xml_files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let Cli { verbose, xml_files } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .init();

    let summary = qtdbus_annotate::run(xml_files.as_slice(), &TypeMapping::mpris())
        .context("annotate D-Bus interface files")?;
    debug!(
        files = summary.files,
        rewritten = summary.rewritten,
        "annotation finished"
    );

    Ok(())
}
