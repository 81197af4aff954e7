//! kyc-ocr - KYC document text extraction
//!
//! Command-line front end: prints one JSON document on stdout, logs to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kyc_ocr::config::{self, AppConfig};
use kyc_ocr::vision::DocumentProcessor;

/// kyc-ocr - Text extraction for KYC identity documents
#[derive(Parser, Debug)]
#[command(name = "kyc-ocr")]
#[command(about = "Extracts and classifies text from scanned identity documents")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language codes for OCR
    #[arg(long, global = true, num_args = 1..)]
    languages: Option<Vec<String>>,

    /// Request hardware-accelerated inference
    #[arg(long, global = true)]
    gpu: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a document image
    Process {
        /// Path to image file
        #[arg(long)]
        image: Option<PathBuf>,

        /// Minimum confidence threshold
        #[arg(long)]
        confidence: Option<f32>,

        /// Skip image preprocessing
        #[arg(long)]
        no_preprocess: bool,

        /// Report line-level instead of word-level detections
        #[arg(long)]
        no_word_details: bool,
    },
    /// Report engine capabilities
    Capabilities,
    /// Check that the engine is available
    Health,
}

fn main() {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            println!("{}", json!({ "success": false, "error": format!("{:#}", e) }));
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<serde_json::Value> {
    let mut config = config::resolve_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let processor = DocumentProcessor::tesseract(&config.tesseract.command, config.ocr.clone())?
        .with_preprocessing(config.preprocessing.clone());

    let output = match args.command {
        Command::Process { image: None, .. } => json!({
            "success": false,
            "error": "Image path required for process command"
        }),
        Command::Process { image: Some(image), .. } => {
            info!("Processing {:?}", image);
            serde_json::to_value(processor.process(&image))?
        }
        Command::Capabilities => serde_json::to_value(processor.capabilities())?,
        Command::Health => serde_json::to_value(processor.health())?,
    };

    Ok(output)
}

/// Command-line flags take precedence over the config file
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(languages) = &args.languages {
        config.ocr.languages = languages.clone();
    }
    if args.gpu {
        config.ocr.use_accelerated_inference = true;
    }

    if let Command::Process {
        confidence,
        no_preprocess,
        no_word_details,
        ..
    } = &args.command
    {
        if let Some(confidence) = confidence {
            config.ocr.confidence_threshold = *confidence;
        }
        if *no_preprocess {
            config.ocr.preprocess = false;
        }
        if *no_word_details {
            config.ocr.extract_word_details = false;
        }
    }
}
