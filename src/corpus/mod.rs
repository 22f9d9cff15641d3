//! The corpus store and the offline enrichment pass that fills it.

pub mod snapshot;

use std::collections::{BTreeMap, HashSet};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::document::{RawRestaurant, Restaurant, combined_text};
use crate::preprocessing::categories::CategoryClassifier;
use crate::scoring::{LexiconSentiment, NEUTRAL_SCORE, PriceKeywords, TextScorer, score_or_neutral};

pub use snapshot::Snapshot;

/// Classifies and scores raw records.
pub struct Enricher {
    classifier: CategoryClassifier,
    sentiment: Box<dyn TextScorer>,
    price: Box<dyn TextScorer>,
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(
            CategoryClassifier::default(),
            Box::new(LexiconSentiment::default()),
            Box::new(PriceKeywords::default()),
        )
    }
}

impl Enricher {
    pub fn new(
        classifier: CategoryClassifier,
        sentiment: Box<dyn TextScorer>,
        price: Box<dyn TextScorer>,
    ) -> Self {
        Self {
            classifier,
            sentiment,
            price,
        }
    }

    pub fn enrich(&self, raw: RawRestaurant) -> Restaurant {
        let combined_text = combined_text(&raw.name, &raw.reviews);
        let categories = self.classifier.classify(&raw.name, &combined_text);

        let review_text = raw.reviews.join(" ");
        let sentiment_score = if raw.review_count == 0 {
            NEUTRAL_SCORE
        } else {
            score_or_neutral(self.sentiment.as_ref(), &review_text)
        };
        let price_score = score_or_neutral(self.price.as_ref(), &review_text);

        Restaurant {
            name: raw.name,
            url: raw.url,
            rating: raw.rating,
            review_count: raw.review_count,
            reviews: raw.reviews,
            combined_text,
            categories,
            sentiment_score,
            price_score,
        }
    }
}

/// Immutable table of enriched restaurants, unique by [`Restaurant::key`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    restaurants: Vec<Restaurant>,
}

impl Corpus {
    /// Runs the enrichment pass over scraped records.
    pub fn enrich(raw: Vec<RawRestaurant>, enricher: &Enricher) -> Self {
        let total = raw.len();
        let corpus = Self::from_restaurants(raw.into_iter().map(|r| enricher.enrich(r)));
        info!(
            "Enriched {} restaurants ({} with reviews)",
            corpus.len(),
            corpus.restaurants.iter().filter(|r| r.has_reviews()).count()
        );
        if corpus.len() < total {
            warn!("Dropped {} duplicate restaurant records", total - corpus.len());
        }
        corpus
    }

    /// Builds a corpus from already enriched records. The first record wins for a repeated key.
    pub fn from_restaurants(restaurants: impl IntoIterator<Item = Restaurant>) -> Self {
        let mut seen = HashSet::new();
        let restaurants = restaurants
            .into_iter()
            .filter(|restaurant| {
                let fresh = seen.insert(restaurant.key().to_string());
                if !fresh {
                    warn!("Duplicate restaurant '{}', keeping the first record", restaurant.key());
                }
                fresh
            })
            .collect();
        Self { restaurants }
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    pub fn combined_texts(&self) -> Vec<&str> {
        self.restaurants.iter().map(|r| r.combined_text.as_str()).collect()
    }

    /// Tag frequencies, most frequent first, ties alphabetical.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tag in self.restaurants.iter().flat_map(|r| r.categories.iter()) {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }

        let mut sorted: Vec<(String, usize)> =
            counts.into_iter().map(|(tag, count)| (tag.to_string(), count)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreError;

    struct Broken;

    impl TextScorer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn score(&self, _text: &str) -> Result<f64, ScoreError> {
            Err(ScoreError::Unavailable("model not loaded".to_string()))
        }
    }

    fn raw(name: &str, url: &str, reviews: &[&str]) -> RawRestaurant {
        RawRestaurant {
            name: name.to_string(),
            url: url.to_string(),
            rating: Some(4.0),
            review_count: reviews.len() as u32,
            reviews: reviews.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_enrich_derives_fields() {
        let enricher = Enricher::default();
        let restaurant = enricher.enrich(raw(
            "Kebapçı Halil",
            "u1",
            &["Harika adana", "Fiyatlar uygun"],
        ));

        assert_eq!(restaurant.combined_text, "Kebapçı Halil Harika adana Fiyatlar uygun");
        assert!(restaurant.categories.contains("kebap"));
        assert_eq!(restaurant.sentiment_score, 1.0);
        assert_eq!(restaurant.price_score, 1.0);
    }

    #[test]
    fn test_unreviewed_restaurant_is_neutral() {
        let restaurant = Enricher::default().enrich(raw("Xyz", "u1", &[]));
        assert_eq!(restaurant.sentiment_score, NEUTRAL_SCORE);
        assert_eq!(restaurant.price_score, NEUTRAL_SCORE);
        assert_eq!(restaurant.categories.len(), 1);
        assert!(restaurant.categories.contains("uncategorized"));
    }

    #[test]
    fn test_failing_scorer_is_neutral() {
        let enricher = Enricher::new(
            CategoryClassifier::default(),
            Box::new(Broken),
            Box::new(Broken),
        );
        let restaurant = enricher.enrich(raw("Mado", "u1", &["berbat"]));
        assert_eq!(restaurant.sentiment_score, NEUTRAL_SCORE);
        assert_eq!(restaurant.price_score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_duplicate_urls_keep_first() {
        let corpus = Corpus::enrich(
            vec![raw("First", "u1", &[]), raw("Second", "u1", &[]), raw("Third", "", &[])],
            &Enricher::default(),
        );
        let names: Vec<&str> = corpus.restaurants().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Third"]);
    }

    #[test]
    fn test_category_counts_sorted() {
        let corpus = Corpus::enrich(
            vec![
                raw("Mado Merkez", "u1", &[]),
                raw("Akdo", "u2", &[]),
                raw("Starbucks", "u3", &[]),
            ],
            &Enricher::default(),
        );
        let counts = corpus.category_counts();
        assert_eq!(counts[0], ("cafe".to_string(), 3));
        assert_eq!(counts[1], ("dondurma".to_string(), 2));
        assert_eq!(counts[2], ("tatlı".to_string(), 2));
    }
}
