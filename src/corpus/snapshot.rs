use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Corpus;
use crate::config::Config;
use crate::document::parser::parse_restaurants;
use crate::error::{Error, Result};
use crate::matrix::TfIdfMatrix;

/// An enriched corpus together with the text index built over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    corpus: Corpus,
    index: TfIdfMatrix,
    /// Digest of the inputs this snapshot was built from; `None` when built in memory.
    fingerprint: Option<String>,
}

/// SHA-256 over the raw source and every setting that shapes enrichment or indexing.
pub fn fingerprint(config: &Config, source: &str) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(config.index.max_features.to_le_bytes());
    hasher.update(serde_json::to_vec(&config.taxonomy()?)?);
    hasher.update(serde_json::to_vec(&config.scoring)?);
    Ok(hex::encode(hasher.finalize()))
}

impl Snapshot {
    pub fn build(corpus: Corpus, max_features: usize) -> Self {
        let index = TfIdfMatrix::build(&corpus.combined_texts(), max_features);
        info!(
            "Text index built: {} documents, {} terms",
            index.document_count(),
            index.vocabulary_size()
        );
        Self {
            corpus,
            index,
            fingerprint: None,
        }
    }

    /// Pairs a corpus with an index, rejecting an index built over a different corpus size.
    pub fn from_parts(corpus: Corpus, index: TfIdfMatrix) -> Result<Self> {
        let snapshot = Self {
            corpus,
            index,
            fingerprint: None,
        };
        snapshot.check_index()?;
        Ok(snapshot)
    }

    fn check_index(&self) -> Result<()> {
        if self.index.document_count() != self.corpus.len() {
            return Err(Error::IndexMismatch {
                index: self.index.document_count(),
                corpus: self.corpus.len(),
            });
        }
        Ok(())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &TfIdfMatrix {
        &self.index
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Runs the full enrichment pass over the configured source.
    pub fn from_source(config: &Config) -> Result<Self> {
        let source = read_source(config)?;
        let fingerprint = fingerprint(config, &source)?;
        Self::enrich(config, &source, fingerprint)
    }

    fn enrich(config: &Config, source: &str, fingerprint: String) -> Result<Self> {
        let raw = parse_restaurants(source)?;
        info!("Loaded {} raw restaurants from {}", raw.len(), config.data.source.display());
        let corpus = Corpus::enrich(raw, &config.enricher()?);
        let mut snapshot = Self::build(corpus, config.index.max_features);
        snapshot.fingerprint = Some(fingerprint);
        Ok(snapshot)
    }

    /// Loads the cached snapshot when it was built from the current source and settings,
    /// otherwise rebuilds it and refreshes the cache.
    ///
    /// An unreadable source falls back to whatever cache exists.
    pub fn load_or_build(config: &Config) -> Result<Self> {
        let cache = &config.data.snapshot;
        let source = match read_source(config) {
            Ok(source) => source,
            Err(source_err) => {
                let snapshot = Self::load(cache).map_err(|_| source_err)?;
                warn!(
                    "Source {} is unreadable, serving cached snapshot {}",
                    config.data.source.display(),
                    cache.display()
                );
                return Ok(snapshot);
            }
        };
        let fingerprint = fingerprint(config, &source)?;

        match Self::load(cache) {
            Ok(snapshot) if snapshot.fingerprint() == Some(fingerprint.as_str()) => {
                info!("Loaded snapshot from {} ({} restaurants)", cache.display(), snapshot.corpus.len());
                return Ok(snapshot);
            }
            Ok(_) => info!("Snapshot at {} is stale, rebuilding", cache.display()),
            Err(e) => info!("No usable snapshot at {} ({}), rebuilding", cache.display(), e),
        }

        let snapshot = Self::enrich(config, &source, fingerprint)?;
        match snapshot.save(cache) {
            Ok(()) => info!("Snapshot written to {}", cache.display()),
            Err(e) => warn!("Could not write snapshot to {}: {}", cache.display(), e),
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let reader = BufReader::new(file);
        let snapshot: Snapshot = bincode::deserialize_from(reader)?;
        snapshot.check_index()?;
        Ok(snapshot)
    }
}

fn read_source(config: &Config) -> Result<String> {
    let path = &config.data.source;
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Enricher;
    use crate::document::RawRestaurant;
    use tempfile::TempDir;

    fn corpus() -> Corpus {
        let raw = vec![
            RawRestaurant {
                name: "Adana Sofrası".to_string(),
                url: "u1".to_string(),
                rating: Some(4.5),
                review_count: 1,
                reviews: vec!["Kebap harika".to_string()],
            },
            RawRestaurant {
                name: "Kervan Bistro".to_string(),
                url: "u2".to_string(),
                ..Default::default()
            },
        ];
        Corpus::enrich(raw, &Enricher::default())
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.bin");

        let snapshot = Snapshot::build(corpus(), 1000);
        snapshot.save(&path).unwrap();
        let loaded = Snapshot::load(&path).unwrap();

        assert_eq!(loaded.corpus(), snapshot.corpus());
        assert_eq!(loaded.index().similarity("kebap"), snapshot.index().similarity("kebap"));
    }

    #[test]
    fn test_mismatched_index_rejected() {
        let index = TfIdfMatrix::build(&["only one document"], 1000);
        let result = Snapshot::from_parts(corpus(), index);
        assert!(matches!(result, Err(Error::IndexMismatch { index: 1, corpus: 2 })));
    }

    fn write_source(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.data.source = dir.path().join("restaurants.json");
        config.data.snapshot = dir.path().join("snapshot.bin");
        config
    }

    const MADO: &str =
        r#"[{"restaurant_name": "Mado", "url": "u1", "rating": "4,2", "comments": ["Dondurma harika"]}]"#;
    const TANTUNI: &str = r#"[{"name": "Tantuni Evi", "url": "u9", "reviews": ["Tantuni ucuz"]}]"#;

    #[test]
    fn test_load_or_build_writes_cache() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_source(&config.data.source, MADO);

        let built = Snapshot::load_or_build(&config).unwrap();
        assert_eq!(built.corpus().len(), 1);
        assert!(config.data.snapshot.exists());
        assert!(built.fingerprint().is_some());

        let cached = Snapshot::load_or_build(&config).unwrap();
        assert_eq!(cached.corpus(), built.corpus());
        assert_eq!(cached.fingerprint(), built.fingerprint());
    }

    #[test]
    fn test_changed_source_rebuilds() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        write_source(&config.data.source, MADO);
        Snapshot::load_or_build(&config).unwrap();

        // Same path, new content.
        write_source(&config.data.source, TANTUNI);
        let rebuilt = Snapshot::load_or_build(&config).unwrap();
        assert_eq!(rebuilt.corpus().restaurants()[0].name, "Tantuni Evi");

        // Different path.
        let other = dir.path().join("other.json");
        write_source(&other, MADO);
        config.data.source = other;
        let switched = Snapshot::load_or_build(&config).unwrap();
        assert_eq!(switched.corpus().restaurants()[0].name, "Mado");
    }

    #[test]
    fn test_changed_settings_rebuild() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        write_source(&config.data.source, MADO);
        let first = Snapshot::load_or_build(&config).unwrap();

        config.index.max_features = 2;
        let capped = Snapshot::load_or_build(&config).unwrap();
        assert_ne!(capped.fingerprint(), first.fingerprint());
        assert_eq!(capped.index().vocabulary_size(), 2);

        config.scoring.sentiment.positive.push("tatlı".to_string());
        let rescored = Snapshot::load_or_build(&config).unwrap();
        assert_ne!(rescored.fingerprint(), capped.fingerprint());
    }

    #[test]
    fn test_missing_source_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_source(&config.data.source, MADO);
        let built = Snapshot::load_or_build(&config).unwrap();

        std::fs::remove_file(&config.data.source).unwrap();
        let cached = Snapshot::load_or_build(&config).unwrap();
        assert_eq!(cached.corpus(), built.corpus());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data.source = dir.path().join("missing.json");
        config.data.snapshot = dir.path().join("snapshot.bin");
        assert!(matches!(Snapshot::load_or_build(&config), Err(Error::Io { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = Snapshot::load("/nonexistent/snapshot.bin");
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
