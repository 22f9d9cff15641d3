//! Runtime configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or none at all) is a valid config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::corpus::Enricher;
use crate::error::{Error, Result};
use crate::preprocessing::categories::{CategoryClassifier, Taxonomy};
use crate::scoring::{LexiconSentiment, PriceKeywords};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub index: IndexConfig,
    pub data: DataConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum cosine similarity for the similarity retrieval pass.
    pub similarity_threshold: f64,
    pub default_top_n: usize,
    /// Larger requests are capped to this many results.
    pub max_top_n: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.10,
            default_top_n: 5,
            max_top_n: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub max_features: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { max_features: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Scraped restaurants, a JSON array.
    pub source: PathBuf,
    /// Enriched snapshot cache.
    pub snapshot: PathBuf,
    /// Replacement for the built-in taxonomy.
    pub taxonomy: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data/restaurants.json"),
            snapshot: PathBuf::from("recommender_snapshot.bin"),
            taxonomy: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub sentiment: LexiconSentiment,
    pub price: PriceKeywords,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.search.similarity_threshold;
        if !threshold.is_finite() || !(0.0..1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be in [0, 1), got {}",
                threshold
            )));
        }
        if self.search.default_top_n == 0 {
            return Err(Error::Config("default_top_n must be at least 1".to_string()));
        }
        if self.search.max_top_n < self.search.default_top_n {
            return Err(Error::Config(format!(
                "max_top_n ({}) is smaller than default_top_n ({})",
                self.search.max_top_n, self.search.default_top_n
            )));
        }
        if self.index.max_features == 0 {
            return Err(Error::Config("max_features must be at least 1".to_string()));
        }
        if self.server.bind.trim().is_empty() {
            return Err(Error::Config("server bind address is empty".to_string()));
        }
        Ok(())
    }

    pub fn taxonomy(&self) -> Result<Taxonomy> {
        match &self.data.taxonomy {
            Some(path) => Taxonomy::load(path),
            None => Ok(Taxonomy::builtin()),
        }
    }

    pub fn enricher(&self) -> Result<Enricher> {
        Ok(Enricher::new(
            CategoryClassifier::new(self.taxonomy()?),
            Box::new(self.scoring.sentiment.clone()),
            Box::new(self.scoring.price.clone()),
        ))
    }
}
