//! Batch intake and prediction with aggregate counters.

use sentir_types::{BatchInputConfig, BatchInputError, BatchItem, BatchReport};
use tracing::{debug, info, warn};

use super::predictor::SentimentPredictor;

/// Extracts the texts of a batch file: one text per line, as exported by a
/// spreadsheet as a single-column CSV.
///
/// Lines are trimmed and blank lines skipped. A first line containing one of
/// the configured header keywords is skipped. Surrounding double quotes are
/// removed and doubled quotes (`""`) collapse to one. Texts shorter than
/// `min_text_length` characters are skipped.
///
/// # Errors
///
/// - `BatchInputError::Empty` if `contents` is empty
/// - `BatchInputError::TooLarge` if it exceeds `max_bytes`
/// - `BatchInputError::NoValidTexts` if nothing survives the filters
pub fn read_batch_texts(
    contents: &str,
    config: &BatchInputConfig,
) -> Result<Vec<String>, BatchInputError> {
    if contents.is_empty() {
        return Err(BatchInputError::Empty);
    }
    config.check_size(contents.len() as u64)?;

    let mut texts = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if index == 0 && is_header(line, &config.header_keywords) {
            debug!(header = line, "skipping header line");
            continue;
        }

        let text = unquote(line);
        if text.chars().count() < config.min_text_length {
            warn!(
                line = index + 1,
                min_length = config.min_text_length,
                "skipping short text"
            );
            continue;
        }
        texts.push(text);
    }

    if texts.is_empty() {
        return Err(BatchInputError::NoValidTexts {
            min_length: config.min_text_length,
        });
    }

    info!(texts = texts.len(), "batch input read");
    Ok(texts)
}

fn is_header(line: &str, keywords: &[String]) -> bool {
    let line = line.to_lowercase();
    keywords
        .iter()
        .any(|keyword| line.contains(keyword.to_lowercase().as_str()))
}

fn unquote(line: &str) -> String {
    let inner = match line.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner,
        None => line,
    };
    inner.replace("\"\"", "\"").trim().to_string()
}

impl SentimentPredictor {
    /// Predicts every text in `texts`, in order.
    ///
    /// A failing text does not abort the batch; it is recorded as failed and
    /// the remaining texts are still processed.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> BatchReport {
        let results = texts
            .iter()
            .map(|text| {
                let text = text.as_ref();
                BatchItem {
                    text: text.to_string(),
                    outcome: self.predict(text),
                }
            })
            .collect();

        let report = BatchReport::from_items(results);
        info!(
            total = report.total_processed,
            successful = report.successful,
            failed = report.failed,
            fallbacks = report.fallbacks,
            "batch processed"
        );
        report
    }
}
