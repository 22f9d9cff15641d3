use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sprs::{CsMat, CsVec, TriMat};

use crate::preprocessing::tokenizer::{build_vocabulary, ngrams};

/// Term x document TF-IDF matrix over unigrams and bigrams.
///
/// Columns are L2-normalized document vectors, so cosine similarity against a
/// normalized query is a plain dot product. The index is rebuilt from scratch whenever
/// the corpus changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfMatrix {
    pub terms: HashMap<String, usize>,
    pub matrix: CsMat<f64>,
    pub idf: Vec<f64>,
}

impl TfIdfMatrix {
    pub fn build<S: AsRef<str>>(texts: &[S], max_features: usize) -> Self {
        let terms = build_vocabulary(texts.iter().map(|t| t.as_ref()), max_features);
        let n_docs = texts.len();
        let n_terms = terms.len();

        let mut df = vec![0usize; n_terms];
        let mut triplets = Vec::new(); // (term_index, doc_index, count)

        for (doc_index, text) in texts.iter().enumerate() {
            let mut term_counts: HashMap<usize, f64> = HashMap::new();
            let mut seen_terms = HashSet::new();

            for term in ngrams(text.as_ref()) {
                if let Some(&term_index) = terms.get(&term) {
                    *term_counts.entry(term_index).or_insert(0.0) += 1.0;
                    if seen_terms.insert(term_index) {
                        df[term_index] += 1;
                    }
                }
            }

            for (term_index, count) in term_counts {
                triplets.push((term_index, doc_index, count));
            }
        }

        // Smoothed idf: every term behaves as if seen in one extra document.
        let idf: Vec<f64> = df
            .iter()
            .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut tri_mat = TriMat::new((n_terms, n_docs));
        for (row, col, count) in triplets {
            tri_mat.add_triplet(row, col, count * idf[row]);
        }

        let mut matrix = tri_mat.to_csc();

        for mut col in matrix.outer_iterator_mut() {
            let norm = col.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, value) in col.iter_mut() {
                    *value /= norm;
                }
            }
        }

        Self {
            terms,
            matrix,
            idf,
        }
    }

    pub fn document_count(&self) -> usize {
        self.matrix.cols()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Normalized query vector, or `None` when no query term is in the vocabulary.
    fn query_vector(&self, query: &str) -> Option<CsVec<f64>> {
        let mut query_tf: BTreeMap<usize, f64> = BTreeMap::new();
        for term in ngrams(query) {
            if let Some(&idx) = self.terms.get(&term) {
                *query_tf.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let (indices, mut data): (Vec<usize>, Vec<f64>) = query_tf
            .into_iter()
            .map(|(term_idx, count)| (term_idx, count * self.idf[term_idx]))
            .unzip();

        let norm = data.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        for value in data.iter_mut() {
            *value /= norm;
        }
        Some(CsVec::new(self.terms.len(), indices, data))
    }

    /// Cosine similarity of `query` against every document, by corpus position.
    ///
    /// Out-of-vocabulary terms carry no weight; a query with none in the vocabulary
    /// scores 0 everywhere.
    pub fn similarity(&self, query: &str) -> Vec<f64> {
        let Some(query_vec) = self.query_vector(query) else {
            return vec![0.0; self.document_count()];
        };

        self.matrix
            .outer_iterator()
            .map(|doc_vec| query_vec.dot(&doc_vec).clamp(0.0, 1.0))
            .collect()
    }
}
