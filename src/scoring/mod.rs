//! Per-restaurant signals derived from review text.
//!
//! Scorers are pluggable: anything implementing [`TextScorer`] can stand in for the
//! built-in lexicon scorers, e.g. a wrapper around an external sentiment model.

mod price;
mod sentiment;

pub use price::PriceKeywords;
pub use sentiment::LexiconSentiment;

use log::warn;
use thiserror::Error;

/// Score used when a text carries no signal or scoring failed.
pub const NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("scorer unavailable: {0}")]
    Unavailable(String),

    #[error("scorer failed: {0}")]
    Failed(String),
}

/// Maps text to a score in `[0, 1]`.
pub trait TextScorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, text: &str) -> Result<f64, ScoreError>;
}

/// Runs a scorer, recovering every failure with [`NEUTRAL_SCORE`].
///
/// Empty text is neutral without consulting the scorer, and successful results are
/// clamped into `[0, 1]`.
pub fn score_or_neutral(scorer: &dyn TextScorer, text: &str) -> f64 {
    if text.trim().is_empty() {
        return NEUTRAL_SCORE;
    }
    match scorer.score(text) {
        Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
        Ok(score) => {
            warn!("{} scorer returned {}, using neutral score", scorer.name(), score);
            NEUTRAL_SCORE
        }
        Err(e) => {
            warn!("{} scorer failed ({}), using neutral score", scorer.name(), e);
            NEUTRAL_SCORE
        }
    }
}

/// Counts occurrences of every phrase in `text`, which must already be lowercased.
pub(crate) fn count_phrases(text: &str, phrases: &[String]) -> usize {
    phrases
        .iter()
        .filter(|phrase| !phrase.is_empty())
        .map(|phrase| text.matches(phrase.as_str()).count())
        .sum()
}
