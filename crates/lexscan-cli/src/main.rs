//! lexscan - extract text from uploaded legal documents.
//!
//! Reads an image or PDF, pulls the embedded text layer from PDF pages that
//! have one, runs Tesseract OCR on everything else and prints the result,
//! ready to hand to a summarizer.
//!
//! # Configuration
//!
//! Settings are merged in this order, later wins:
//!
//! 1. `--config <FILE>` (TOML, JSON or YAML)
//! 2. `LEXSCAN_OCR_LANGUAGE`, `LEXSCAN_RENDER_SCALE` (a `.env` file is loaded first)
//! 3. `--language`, `--render-scale`
//!
//! `PDFIUM_LIBRARY_DIR` points at a directory holding the Pdfium library;
//! `RUST_LOG` controls log output (default: warn).

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod extract;

use extract::ExtractArgs;

#[derive(Debug, Parser)]
#[command(name = "lexscan", version, about = "Extract text from images and PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract text from an image or PDF file
    Extract(ExtractArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the extracted text
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract(args) => extract::run(args).await.inspect_err(|e| {
            tracing::error!("Extraction failed: {:#}", e);
        }),
    }
}
