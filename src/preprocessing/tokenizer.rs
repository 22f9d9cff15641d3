use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Words of two or more Unicode word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

pub fn tokenize(text: &str) -> Vec<String> {
    let lowercased = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowercased)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Unigrams followed by bigrams (adjacent tokens joined by a single space).
pub fn ngrams(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let bigrams: Vec<String> = tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();

    let mut terms = tokens;
    terms.extend(bigrams);
    terms
}

/// Builds the term -> column index dictionary.
///
/// Keeps the `max_features` terms with the highest document frequency (ties broken
/// alphabetically), then indexes the survivors in lexicographic order.
pub fn build_vocabulary<'a, I>(texts: I, max_features: usize) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut document_frequency: HashMap<String, usize> = HashMap::new();

    for text in texts {
        let unique: HashSet<String> = ngrams(text).into_iter().collect();
        for term in unique {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = document_frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(max_features);

    let mut term_list: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
    term_list.sort();
    term_list
        .into_iter()
        .enumerate()
        .map(|(i, term)| (term, i))
        .collect()
}
