use serde::{Deserialize, Serialize};

use super::{NEUTRAL_SCORE, ScoreError, TextScorer, count_phrases};

/// Price perception from keywords: 1.0 cheap, 0.0 expensive, 0.5 unknown.
///
/// Cheap phrases win when both kinds occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceKeywords {
    pub cheap: Vec<String>,
    pub expensive: Vec<String>,
}

impl Default for PriceKeywords {
    fn default() -> Self {
        Self {
            cheap: vec!["ucuz".into(), "makul".into(), "fiyatlar uygun".into()],
            expensive: vec!["pahalı".into(), "fiyat yüksek".into()],
        }
    }
}

impl TextScorer for PriceKeywords {
    fn name(&self) -> &str {
        "price"
    }

    fn score(&self, text: &str) -> Result<f64, ScoreError> {
        let text = text.to_lowercase();
        if count_phrases(&text, &self.cheap) > 0 {
            Ok(1.0)
        } else if count_phrases(&text, &self.expensive) > 0 {
            Ok(0.0)
        } else {
            Ok(NEUTRAL_SCORE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_keywords() {
        let scorer = PriceKeywords::default();
        assert_eq!(scorer.score("Fiyatlar uygun, porsiyon büyük").unwrap(), 1.0);
        assert_eq!(scorer.score("Biraz pahalı ama güzel").unwrap(), 0.0);
        assert_eq!(scorer.score("Ucuz değil, pahalı da değil").unwrap(), 1.0);
        assert_eq!(scorer.score("Servis hızlı").unwrap(), NEUTRAL_SCORE);
    }
}
