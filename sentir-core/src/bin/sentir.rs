//! Sentir command line front end.
//!
//! Loads the model once at startup and drives the predictor:
//!
//! ```bash
//! # Single text
//! sentir --model model.json predict "Me encanta este producto"
//!
//! # One text per line or a single-column CSV, aggregate report
//! sentir --model model.json batch reviews.txt
//!
//! # Show what the classifier would see
//! sentir clean "¡¡Pésimo servicio!! @tienda"
//!
//! # Readiness
//! sentir --model model.json health
//! ```
//!
//! Results go to stdout as JSON, logs go to stderr (`RUST_LOG` controls
//! verbosity).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sentir_core::analyzer::TextCleaner;
use sentir_core::inference::{read_batch_texts, SentimentPredictor};
use sentir_core::model::load_model;
use sentir_types::{
    BatchInputConfig, PredictorConfig, RulesetVersion, DEFAULT_MAX_BATCH_BYTES,
    DEFAULT_MIN_TEXT_LENGTH, DEFAULT_NEUTRAL_LABEL,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sentir", version, about = "Sentiment analysis for Spanish text", long_about = None)]
struct Cli {
    /// Path to the model artifact
    #[arg(long, env = "SENTIR_MODEL", default_value = "model.json", global = true)]
    model: PathBuf,

    /// Cleaning rule set (v1, v2, v3)
    #[arg(long, env = "SENTIR_RULESET", default_value_t = RulesetVersion::CURRENT, global = true)]
    ruleset: RulesetVersion,

    /// Label reported when nothing survives cleaning
    #[arg(long, env = "SENTIR_NEUTRAL_LABEL", default_value = DEFAULT_NEUTRAL_LABEL, global = true)]
    neutral_label: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict the sentiment of one text
    Predict {
        /// Raw text to analyze
        text: String,
    },
    /// Predict every text of a file and print aggregate counts
    Batch {
        /// UTF-8 file, one text per line (single-column CSV accepted)
        file: PathBuf,

        /// Skip texts shorter than this many characters
        #[arg(long, env = "SENTIR_MIN_TEXT_LENGTH", default_value_t = DEFAULT_MIN_TEXT_LENGTH)]
        min_text_length: usize,

        /// Refuse files larger than this many bytes
        #[arg(long, env = "SENTIR_MAX_BATCH_BYTES", default_value_t = DEFAULT_MAX_BATCH_BYTES)]
        max_bytes: u64,
    },
    /// Print the cleaned form of a text without classifying it
    Clean {
        /// Raw text to clean
        text: String,
    },
    /// Report whether the model is loaded
    Health,
}

impl Cli {
    fn config(&self) -> PredictorConfig {
        PredictorConfig {
            ruleset: self.ruleset,
            neutral_label: self.neutral_label.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Clean { text } => {
            let cleaner = TextCleaner::standard(cli.ruleset);
            println!("{}", cleaner.clean(text));
        }
        Command::Health => {
            let predictor = load_predictor(&cli.model, cli.config()).unwrap_or_else(|err| {
                warn!(error = %err, "starting without a model");
                SentimentPredictor::unloaded(cli.config())
            });
            println!("{}", serde_json::to_string(&predictor.readiness())?);
        }
        Command::Predict { text } => {
            let predictor = load_predictor(&cli.model, cli.config())?;
            match predictor.predict(text) {
                Ok(outcome) => println!("{}", serde_json::to_string(&outcome)?),
                Err(err) => bail!("{err} ({})", err.code()),
            }
        }
        Command::Batch {
            file,
            min_text_length,
            max_bytes,
        } => {
            let input = BatchInputConfig {
                min_text_length: *min_text_length,
                max_bytes: *max_bytes,
                ..Default::default()
            };
            let predictor = load_predictor(&cli.model, cli.config())?;

            let size = fs::metadata(file)
                .with_context(|| format!("failed to read {}", file.display()))?
                .len();
            input.check_size(size)?;
            let contents = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let texts = read_batch_texts(&contents, &input)
                .with_context(|| format!("no usable texts in {}", file.display()))?;

            let report = predictor.predict_batch(&texts);
            for label in report.label_counts.keys() {
                info!(label = %label, percent = report.share(label), "label share");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_predictor(path: &Path, config: PredictorConfig) -> Result<SentimentPredictor> {
    let model = load_model(path, config.ruleset)
        .with_context(|| format!("failed to load model from {}", path.display()))?;
    Ok(SentimentPredictor::new(config, model)?)
}
