use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::rank::{Formula, Ranked, rank};
use super::retrieve::{Candidate, retrieve};
use crate::config::{Config, SearchConfig};
use crate::corpus::{Corpus, Snapshot};
use crate::error::{Error, Result};

const MAX_RATING: f64 = 5.0;

/// One ranked restaurant, as returned to front-ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub score: f64,
    pub category_set: BTreeSet<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub restaurant_count: usize,
    pub reviewed_count: usize,
    pub unreviewed_count: usize,
    /// Mean over rated restaurants; `None` when nothing is rated.
    pub average_rating: Option<f64>,
    pub vocabulary_size: usize,
    pub category_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub top_n: usize,
    /// Drops unrated results and those rated below this value.
    pub min_rating: Option<f64>,
}

/// Query-serving view over one immutable snapshot.
///
/// Cheap to share across request threads; a rebuilt corpus means a new `Recommender`.
#[derive(Debug, Clone)]
pub struct Recommender {
    snapshot: Snapshot,
    settings: SearchConfig,
}

impl Recommender {
    pub fn new(snapshot: Snapshot, settings: SearchConfig) -> Self {
        Self { snapshot, settings }
    }

    /// Serving start-up: cached snapshot if present, otherwise a fresh enrichment pass.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Snapshot::load_or_build(config)?, config.search.clone()))
    }

    /// Rebuilds from source, ignoring any cached snapshot.
    pub fn rebuild(config: &Config) -> Result<Self> {
        let snapshot = Snapshot::from_source(config)?;
        if let Err(e) = snapshot.save(&config.data.snapshot) {
            warn!("Could not refresh snapshot cache: {}", e);
        }
        Ok(Self::new(snapshot, config.search.clone()))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    fn corpus(&self) -> &Corpus {
        self.snapshot.corpus()
    }

    /// Clamps `top_n` to the configured maximum; zero is a caller error.
    fn effective_top_n(&self, top_n: usize) -> Result<usize> {
        if top_n == 0 {
            return Err(Error::InvalidArgument("top_n must be at least 1".to_string()));
        }
        Ok(top_n.min(self.settings.max_top_n))
    }

    pub fn search(&self, query: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        self.search_with(query, &SearchOptions { top_n, min_rating: None })
    }

    /// Ranked recommendations for a free-text query. An empty query yields no results.
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Result<Vec<Recommendation>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let top_n = self.effective_top_n(options.top_n)?;
        if let Some(min_rating) = options.min_rating {
            if !min_rating.is_finite() || !(0.0..=MAX_RATING).contains(&min_rating) {
                return Err(Error::InvalidArgument(format!(
                    "min_rating must be in [0, {}], got {}",
                    MAX_RATING, min_rating
                )));
            }
        }

        let query_lower = query.to_lowercase();

        let similarities = self.snapshot.index().similarity(query);
        let candidates = retrieve(
            &query_lower,
            self.corpus(),
            &similarities,
            self.settings.similarity_threshold,
        );
        debug!("Query '{}' retrieved {} candidates", query, candidates.len());

        let ranked = rank(&query_lower, self.corpus(), &candidates, Formula::Search, top_n);
        Ok(self
            .recommendations(ranked)
            .into_iter()
            .filter(|r| match options.min_rating {
                Some(min_rating) => r.rating.is_some_and(|rating| rating >= min_rating),
                None => true,
            })
            .collect())
    }

    /// Ranks the restaurants tagged exactly `category` by their similarity to `query`.
    pub fn recommend_in_category(
        &self,
        category: &str,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return Ok(Vec::new());
        }
        let top_n = self.effective_top_n(top_n)?;

        let similarities = self.snapshot.index().similarity(query);
        let candidates: Vec<Candidate> = self
            .corpus()
            .restaurants()
            .iter()
            .enumerate()
            .filter(|(_, restaurant)| restaurant.categories.contains(&category))
            .map(|(position, _)| Candidate {
                position,
                name_match: false,
                category_match: true,
                similarity: similarities.get(position).copied(),
            })
            .collect();
        debug!("Category '{}' holds {} restaurants", category, candidates.len());

        let ranked = rank(
            &query.trim().to_lowercase(),
            self.corpus(),
            &candidates,
            Formula::Category,
            top_n,
        );
        Ok(self.recommendations(ranked))
    }

    pub fn list_categories(&self) -> Vec<CategoryCount> {
        self.corpus()
            .category_counts()
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect()
    }

    pub fn stats(&self) -> CorpusStats {
        let restaurants = self.corpus().restaurants();
        let reviewed_count = restaurants.iter().filter(|r| r.has_reviews()).count();
        let ratings: Vec<f64> = restaurants.iter().filter_map(|r| r.rating).collect();
        let average_rating =
            (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

        CorpusStats {
            restaurant_count: restaurants.len(),
            reviewed_count,
            unreviewed_count: restaurants.len() - reviewed_count,
            average_rating,
            vocabulary_size: self.snapshot.index().vocabulary_size(),
            category_count: self.corpus().category_counts().len(),
        }
    }

    fn recommendations(&self, ranked: Vec<Ranked>) -> Vec<Recommendation> {
        let restaurants = self.corpus().restaurants();
        ranked
            .into_iter()
            .map(|Ranked { position, score }| {
                let restaurant = &restaurants[position];
                Recommendation {
                    name: restaurant.name.clone(),
                    rating: restaurant.rating,
                    review_count: restaurant.review_count,
                    score,
                    category_set: restaurant.categories.clone(),
                    url: restaurant.url.clone(),
                }
            })
            .collect()
    }
}
