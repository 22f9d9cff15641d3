pub mod parser;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use parser::RawRestaurant;

/// An enriched restaurant record, as held by the corpus store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub url: String,
    /// `None` means unrated.
    pub rating: Option<f64>,
    pub review_count: u32,
    pub reviews: Vec<String>,
    pub combined_text: String,
    /// Never empty once enriched.
    pub categories: BTreeSet<String>,
    pub sentiment_score: f64,
    pub price_score: f64,
}

impl Restaurant {
    /// Identity used for deduplication: the url, or the name for records scraped without one.
    pub fn key(&self) -> &str {
        if self.url.is_empty() { &self.name } else { &self.url }
    }

    pub fn has_reviews(&self) -> bool {
        self.review_count > 0
    }
}

/// Name followed by every review, space separated.
pub fn combined_text(name: &str, reviews: &[String]) -> String {
    format!("{} {}", name, reviews.join(" "))
}
