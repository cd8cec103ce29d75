//! # Noted - A Rich-Text Note Editor Core
//!
//! Headless driver for the editing core: opens a note, replays an edit
//! script through it and prints the resulting text.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a note's text
//! cargo run -- notes/groceries.note
//!
//! # Replay a script and save the result
//! cargo run -- notes/groceries.note --script edits.txt --write
//!
//! # Start from an empty note and save elsewhere
//! cargo run -- --script edits.txt --output new.note
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use noted_core::{Config, Note, Script};

/// Noted - replay edit scripts against rich-text notes
#[derive(Parser, Debug)]
#[command(name = "noted")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Note file to open (created empty if missing)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Edit script to run against the note
    #[arg(short, long, value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Write the edited note to this path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Save the edited note back to FILE
    #[arg(short, long, requires = "file")]
    write: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over -v
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(log_level).into())
                .from_env_lossy(),
        )
        .init();

    tracing::info!("Starting Noted v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    let mut note = open_note(args.file.as_deref(), &config)?;

    if let Some(path) = &args.script {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script = Script::parse(&source)
            .with_context(|| format!("Invalid script {}", path.display()))?;
        tracing::info!(commands = script.len(), "running script");
        script
            .run(note.editor_mut())
            .with_context(|| format!("Script {} failed", path.display()))?;
    }

    println!("{}", note.editor().text());

    if let Some(path) = &args.output {
        note.save_as(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else if args.write {
        note.save().context("Failed to save note")?;
    }

    Ok(())
}

/// Opens `file` if it exists, otherwise starts an empty note bound to it.
fn open_note(file: Option<&Path>, config: &Config) -> anyhow::Result<Note> {
    match file {
        Some(path) if path.exists() => Note::open(path, &config.editor)
            .with_context(|| format!("Failed to open {}", path.display())),
        Some(path) => {
            tracing::info!("{} does not exist yet, starting empty", path.display());
            let mut note = Note::new(&config.editor);
            note.bind_path(path);
            Ok(note)
        }
        None => Ok(Note::new(&config.editor)),
    }
}
