//! Composite scoring and ordering of retrieved candidates.

use std::cmp::Ordering;

use log::warn;
use thiserror::Error;

use super::retrieve::{Candidate, category_matches, name_matches};
use crate::corpus::Corpus;
use crate::document::Restaurant;
use crate::scoring::NEUTRAL_SCORE;

pub const NAME_BONUS: f64 = 0.3;
pub const CATEGORY_BONUS: f64 = 0.2;
/// Similarity assumed for candidates that did not come through the similarity pass.
pub const DEFAULT_SIMILARITY: f64 = 0.1;
/// Score given to a candidate whose signals could not be scored.
pub const FALLBACK_SCORE: f64 = 0.1;
/// Review count at which the review weight saturates at 1.0.
const REVIEW_SATURATION: f64 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("{signal} is {value}, expected a value in [0, 1]")]
    OutOfRange { signal: &'static str, value: f64 },

    #[error("composite score is not finite")]
    NonFinite,
}

/// Inputs of the composite score. `None` signals take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signals {
    pub sentiment: Option<f64>,
    pub price: Option<f64>,
    pub similarity: Option<f64>,
    pub review_count: u32,
    pub name_match: bool,
    pub category_match: bool,
}

impl Signals {
    /// Non-finite stored scores count as missing.
    pub fn for_restaurant(restaurant: &Restaurant, similarity: Option<f64>) -> Self {
        let present = |value: f64| value.is_finite().then_some(value);
        Self {
            sentiment: present(restaurant.sentiment_score),
            price: present(restaurant.price_score),
            similarity: similarity.and_then(present),
            review_count: restaurant.review_count,
            name_match: false,
            category_match: false,
        }
    }

    fn unit(signal: &'static str, value: Option<f64>, default: f64) -> Result<f64, RankError> {
        let value = value.unwrap_or(default);
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(RankError::OutOfRange { signal, value })
        }
    }

    fn review_weight(&self) -> f64 {
        (self.review_count as f64 / REVIEW_SATURATION).min(1.0)
    }
}

fn finite(score: f64) -> Result<f64, RankError> {
    if score.is_finite() { Ok(score) } else { Err(RankError::NonFinite) }
}

/// Which scoring formula to rank with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// Free-text search: signal blend plus name and category bonuses.
    Search,
    /// Search scoped to one category: no bonuses, heavier similarity weight.
    Category,
}

impl Formula {
    pub fn score(self, signals: &Signals) -> Result<f64, RankError> {
        match self {
            Formula::Search => composite_score(signals),
            Formula::Category => category_score(signals),
        }
    }
}

/// The free-text search score.
///
/// Reviewed restaurants blend sentiment, price and similarity, dampened by how many
/// reviews back them. Cold-start restaurants are scored on similarity and price alone,
/// without dampening.
pub fn composite_score(signals: &Signals) -> Result<f64, RankError> {
    let sentiment = Signals::unit("sentiment", signals.sentiment, NEUTRAL_SCORE)?;
    let price = Signals::unit("price", signals.price, NEUTRAL_SCORE)?;
    let similarity = Signals::unit("similarity", signals.similarity, DEFAULT_SIMILARITY)?;

    let name_bonus = if signals.name_match { NAME_BONUS } else { 0.0 };
    let category_bonus = if signals.category_match { CATEGORY_BONUS } else { 0.0 };

    let score = if signals.review_count > 0 {
        (0.3 * sentiment + 0.2 * price + 0.3 * similarity + name_bonus + category_bonus)
            * signals.review_weight()
    } else {
        0.4 * similarity + 0.2 * price + name_bonus + category_bonus
    };
    finite(score)
}

/// The category-scoped score.
pub fn category_score(signals: &Signals) -> Result<f64, RankError> {
    let sentiment = Signals::unit("sentiment", signals.sentiment, NEUTRAL_SCORE)?;
    let price = Signals::unit("price", signals.price, NEUTRAL_SCORE)?;
    let similarity = Signals::unit("similarity", signals.similarity, DEFAULT_SIMILARITY)?;

    let score = if signals.review_count > 0 {
        (0.4 * sentiment + 0.2 * price + 0.4 * similarity) * signals.review_weight()
    } else {
        0.6 * similarity + 0.4 * price
    };
    finite(score)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub position: usize,
    pub score: f64,
}

/// Scores every candidate and keeps the best `top_n`.
///
/// Bonuses are recomputed from `query` (lowercased). A candidate that cannot be scored
/// gets [`FALLBACK_SCORE`] instead of failing the batch. Ties are broken by restaurant
/// key, then corpus position.
pub fn rank(
    query: &str,
    corpus: &Corpus,
    candidates: &[Candidate],
    formula: Formula,
    top_n: usize,
) -> Vec<Ranked> {
    let restaurants = corpus.restaurants();

    let mut ranked: Vec<Ranked> = candidates
        .iter()
        .filter_map(|candidate| {
            let restaurant = restaurants.get(candidate.position)?;
            let mut signals = Signals::for_restaurant(restaurant, candidate.similarity);
            signals.name_match = name_matches(query, restaurant);
            signals.category_match = category_matches(query, restaurant);

            let score = formula.score(&signals).unwrap_or_else(|e| {
                warn!("Could not score '{}': {}; using {}", restaurant.key(), e, FALLBACK_SCORE);
                FALLBACK_SCORE
            });
            Some(Ranked {
                position: candidate.position,
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| compare(a, b, restaurants));
    ranked.truncate(top_n);
    ranked
}

/// Score descending, then key, then position.
fn compare(a: &Ranked, b: &Ranked, restaurants: &[Restaurant]) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| restaurants[a.position].key().cmp(restaurants[b.position].key()))
        .then_with(|| a.position.cmp(&b.position))
}
