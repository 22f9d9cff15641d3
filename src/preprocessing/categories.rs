//! Category classification.
//!
//! Maps a restaurant's name and combined review text to a set of category tags.
//! The taxonomy is data: the built-in table is `data/taxonomy.json`, embedded at
//! compile time, and a replacement can be loaded from disk.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static BUILTIN_TAXONOMY: LazyLock<Taxonomy> = LazyLock::new(|| {
    let json = include_str!("../../data/taxonomy.json");
    Taxonomy::from_json(json).expect("built-in taxonomy is valid")
});

/// Category keyword tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Category -> keywords searched for in the combined text.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Name keyword -> categories added when the keyword occurs in the restaurant name.
    #[serde(default)]
    pub name_overrides: BTreeMap<String, Vec<String>>,
    /// Tag assigned when nothing matched.
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    "uncategorized".to_string()
}

impl Taxonomy {
    pub fn builtin() -> Self {
        BUILTIN_TAXONOMY.clone()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let taxonomy: Taxonomy =
            serde_json::from_str(json).map_err(|e| Error::Taxonomy(e.to_string()))?;
        taxonomy.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&json)
    }

    /// Lowercases every keyword and rejects empty keywords or tags.
    fn validated(self) -> Result<Self> {
        let fallback = self.fallback.trim().to_string();
        if fallback.is_empty() {
            return Err(Error::Taxonomy("fallback tag is empty".to_string()));
        }

        let categories = lowercase_table(self.categories, "category")?;
        let name_overrides = lowercase_table(self.name_overrides, "name override")?;

        for (keyword, tags) in &name_overrides {
            if tags.iter().any(|tag| tag.trim().is_empty()) {
                return Err(Error::Taxonomy(format!(
                    "name override '{}' maps to an empty tag",
                    keyword
                )));
            }
        }

        Ok(Taxonomy {
            categories,
            name_overrides,
            fallback,
        })
    }
}

fn lowercase_table(
    table: BTreeMap<String, Vec<String>>,
    kind: &str,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut lowered = BTreeMap::new();
    for (key, values) in table {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(Error::Taxonomy(format!("empty {} key", kind)));
        }
        let values: Vec<String> = values
            .into_iter()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .collect();
        lowered.insert(key.to_lowercase(), values);
    }
    Ok(lowered)
}

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    taxonomy: Taxonomy,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(Taxonomy::builtin())
    }
}

impl CategoryClassifier {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Returns the category tags for a restaurant. Never empty.
    ///
    /// Keyword tests are plain substring matches over lowercased input, so one text
    /// can yield several unrelated tags.
    pub fn classify(&self, name: &str, combined_text: &str) -> BTreeSet<String> {
        let text = combined_text.to_lowercase();
        let name = name.to_lowercase();

        let mut detected: BTreeSet<String> = self
            .taxonomy
            .categories
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword.as_str())))
            .map(|(category, _)| category.clone())
            .collect();

        for (keyword, tags) in &self.taxonomy.name_overrides {
            if name.contains(keyword.as_str()) {
                detected.extend(tags.iter().cloned());
            }
        }

        if detected.is_empty() {
            detected.insert(self.taxonomy.fallback.clone());
        }
        detected
    }
}
