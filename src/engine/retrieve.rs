use std::collections::HashMap;

use crate::corpus::Corpus;
use crate::document::Restaurant;

/// A restaurant picked up by at least one retrieval pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position in the corpus.
    pub position: usize,
    pub name_match: bool,
    pub category_match: bool,
    /// Set only when the restaurant passed the similarity threshold.
    pub similarity: Option<f64>,
}

impl Candidate {
    fn new(position: usize) -> Self {
        Self {
            position,
            name_match: false,
            category_match: false,
            similarity: None,
        }
    }
}

/// `query` must already be lowercased.
pub fn name_matches(query: &str, restaurant: &Restaurant) -> bool {
    restaurant.name.to_lowercase().contains(query)
}

/// Substring test against every tag, so `"kebap"` matches the tag `"kebap"` and
/// `"ta"` matches both `"tatlı"` and `"pastane"`. `query` must already be lowercased.
pub fn category_matches(query: &str, restaurant: &Restaurant) -> bool {
    restaurant.categories.iter().any(|tag| tag.to_lowercase().contains(query))
}

enum Pass {
    Name,
    Category,
    Similarity(f64),
}

/// Unions the name, category and similarity passes.
///
/// `query` is lowercased and non-empty; `similarities` is indexed by corpus position.
/// Candidates are deduplicated by restaurant key and keep the order in which they were
/// first found: name matches, then category matches, then similarity matches.
pub fn retrieve(query: &str, corpus: &Corpus, similarities: &[f64], threshold: f64) -> Vec<Candidate> {
    let restaurants = corpus.restaurants();

    let name_pass = restaurants
        .iter()
        .enumerate()
        .filter(|(_, restaurant)| name_matches(query, restaurant))
        .map(|(position, _)| (position, Pass::Name));
    let category_pass = restaurants
        .iter()
        .enumerate()
        .filter(|(_, restaurant)| category_matches(query, restaurant))
        .map(|(position, _)| (position, Pass::Category));
    let similarity_pass = similarities
        .iter()
        .enumerate()
        .filter(|(_, similarity)| **similarity > threshold)
        .map(|(position, &similarity)| (position, Pass::Similarity(similarity)));

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for (position, pass) in name_pass.chain(category_pass).chain(similarity_pass) {
        let Some(restaurant) = restaurants.get(position) else {
            continue;
        };
        let slot = *slots.entry(restaurant.key()).or_insert_with(|| {
            candidates.push(Candidate::new(position));
            candidates.len() - 1
        });

        let candidate = &mut candidates[slot];
        match pass {
            Pass::Name => candidate.name_match = true,
            Pass::Category => candidate.category_match = true,
            Pass::Similarity(similarity) => candidate.similarity = Some(similarity),
        }
    }

    candidates
}
