//! The `extract` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use lexscan_extractors::{
    ExtractionConfig, ExtractionResult, ExtractorFactory, ProgressSink, SourceFile,
};

/// Resolution of the progress bar.
const PROGRESS_STEPS: u64 = 1000;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// File to extract text from
    pub file: PathBuf,

    /// Media type of the file (guessed from the extension when omitted)
    #[arg(long)]
    pub media_type: Option<String>,

    /// OCR recognition language, e.g. eng or deu
    #[arg(long, short)]
    pub language: Option<String>,

    /// Scale used to render PDF pages that need OCR
    #[arg(long)]
    pub render_scale: Option<f32>,

    /// Configuration file (.toml, .json or .yaml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory containing the Pdfium library
    #[arg(long, env = "PDFIUM_LIBRARY_DIR")]
    pub pdfium_dir: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Hide the progress bar
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain extracted text
    Text,
    /// Text plus per-page strategy as JSON
    Json,
}

/// Run the extract command.
pub async fn run(args: ExtractArgs) -> Result<()> {
    let config = load_config(&args)?;
    let media_type = resolve_media_type(&args.file, args.media_type.as_deref());

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let file = SourceFile::new(bytes, media_type);

    // Reject unsupported files before binding any backend
    file.kind()?;

    tracing::info!(
        "Extracting {} ({}, {} bytes)",
        args.file.display(),
        file.media_type(),
        file.len()
    );

    let engine = ExtractorFactory::engine(config, args.pdfium_dir.as_deref())?;

    let bar = (!args.quiet).then(progress_bar).transpose()?;
    let sink = bar.clone().map(|bar| {
        Arc::new(move |fraction: f64| {
            bar.set_position((fraction * PROGRESS_STEPS as f64).round() as u64)
        }) as Arc<dyn ProgressSink>
    });

    let result = engine.extract(file, sink).await;
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let result = result.with_context(|| format!("failed to extract {}", args.file.display()))?;

    write_output(&result, args.format, args.output.as_deref())
}

/// Merge the config file, environment and command-line flags.
fn load_config(args: &ExtractArgs) -> Result<ExtractionConfig> {
    let base = match &args.config {
        Some(path) => ExtractionConfig::from_file(path)?,
        None => ExtractionConfig::default(),
    };

    let mut config = base.with_env_overrides();
    if let Some(language) = &args.language {
        config = config.with_language(language.clone());
    }
    if let Some(scale) = args.render_scale {
        config = config.with_render_scale(scale);
    }

    config.validate()?;
    Ok(config)
}

fn resolve_media_type(path: &Path, declared: Option<&str>) -> String {
    match declared {
        Some(media_type) => media_type.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(PROGRESS_STEPS);
    bar.set_style(
        ProgressStyle::with_template("{spinner} recognizing [{bar:40}] {percent:>3}%")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

fn render(result: &ExtractionResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => result.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
    })
}

fn write_output(
    result: &ExtractionResult,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = render(result, format)?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use lexscan_extractors::PageStrategy;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ExtractArgs,
    }

    fn parse(argv: &[&str]) -> ExtractArgs {
        TestCli::parse_from(std::iter::once("lexscan").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_media_type_guessing() {
        assert_eq!(
            resolve_media_type(Path::new("contract.pdf"), None),
            "application/pdf"
        );
        assert_eq!(resolve_media_type(Path::new("scan.JPG"), None), "image/jpeg");
        assert_eq!(
            resolve_media_type(Path::new("notes"), None),
            "application/octet-stream"
        );
        assert_eq!(
            resolve_media_type(Path::new("upload.bin"), Some("image/png")),
            "image/png"
        );
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexscan.toml");
        std::fs::write(&path, "recognition_language = \"fra\"\nrender_scale = 3.0\n").unwrap();

        let args = parse(&[
            "contract.pdf",
            "--config",
            path.to_str().unwrap(),
            "--render-scale",
            "1.5",
        ]);
        let config = load_config(&args).unwrap();

        assert_eq!(config.render_scale, 1.5);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.quiet);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let args = parse(&["contract.pdf", "--render-scale", "0"]);
        assert!(load_config(&args).is_err());

        let args = parse(&["contract.pdf", "--render-scale", "1e9"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_render_formats() {
        let result = ExtractionResult {
            text: "Hello\n\nWorld".to_string(),
            pages: vec![PageStrategy::TextLayer, PageStrategy::Ocr],
        };

        assert_eq!(render(&result, OutputFormat::Text).unwrap(), "Hello\n\nWorld");

        let json: serde_json::Value =
            serde_json::from_str(&render(&result, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["text"], "Hello\n\nWorld");
        assert_eq!(json["pages"][1], "ocr");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let result = ExtractionResult {
            text: "Signed".to_string(),
            pages: vec![PageStrategy::TextLayer],
        };

        write_output(&result, OutputFormat::Text, Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Signed");
    }
}
