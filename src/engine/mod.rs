//! Query-time retrieval and ranking.

pub mod rank;
pub mod retrieve;
pub mod search;

pub use search::{CategoryCount, CorpusStats, Recommendation, Recommender, SearchOptions};
