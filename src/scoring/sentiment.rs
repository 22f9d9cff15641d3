use serde::{Deserialize, Serialize};

use super::{NEUTRAL_SCORE, ScoreError, TextScorer, count_phrases};

/// Only this many leading characters of the review text are scored.
const MAX_CHARS: usize = 512;

/// Lexicon-based positivity: `positive / (positive + negative)` phrase hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSentiment {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        let positive = [
            "güzel", "harika", "lezzetli", "mükemmel", "muhteşem", "enfes", "tavsiye ederim",
            "iyi", "başarılı", "temiz", "güler yüzlü", "ilgili", "hızlı", "taze", "süper",
            "nefis", "memnun", "bayıldım", "delicious", "great", "excellent", "good",
        ];
        let negative = [
            "kötü", "berbat", "rezalet", "soğuk", "bayat", "kirli", "yavaş", "ilgisiz",
            "tavsiye etmem", "pişman", "memnun kalmadık", "hayal kırıklığı", "tatsız",
            "bad", "terrible", "awful", "worst",
        ];
        Self {
            positive: positive.iter().map(|s| s.to_string()).collect(),
            negative: negative.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TextScorer for LexiconSentiment {
    fn name(&self) -> &str {
        "sentiment"
    }

    fn score(&self, text: &str) -> Result<f64, ScoreError> {
        let mut head: String = text.chars().take(MAX_CHARS).collect::<String>().to_lowercase();

        // Negative phrases may contain positive ones ("memnun kalmadık"), so they are
        // counted first and masked out.
        let negative = count_phrases(&head, &self.negative) as f64;
        for phrase in self.negative.iter().filter(|phrase| !phrase.is_empty()) {
            head = head.replace(phrase.as_str(), " ");
        }
        let positive = count_phrases(&head, &self.positive) as f64;
        let total = positive + negative;

        if total == 0.0 {
            return Ok(NEUTRAL_SCORE);
        }
        Ok(positive / total)
    }
}
