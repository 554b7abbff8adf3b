//! Inference adapter: cleaner + classifier behind one prediction call.

mod batch;
mod predictor;

pub use batch::read_batch_texts;
pub use predictor::{Readiness, SentimentPredictor};
