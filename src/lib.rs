//! Restaurant recommendations from free-text queries.
//!
//! Scraped restaurants are enriched offline (categories, sentiment and price signals),
//! indexed with TF-IDF, and served through a [`Recommender`] that unions name, category
//! and similarity matches and ranks them with a composite score.

pub mod config;
pub mod corpus;
pub mod document;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod preprocessing;
pub mod scoring;
pub mod server;

pub use config::Config;
pub use corpus::{Corpus, Enricher, Snapshot};
pub use document::{RawRestaurant, Restaurant};
pub use engine::{CategoryCount, CorpusStats, Recommendation, Recommender, SearchOptions};
pub use error::{Error, Result};
