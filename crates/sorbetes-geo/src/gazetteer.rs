//! Curated place-name reference data.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::normalize;

/// Built-in Philippine dataset, compiled into the crate. Deployments can
/// override it via `SORBETES_GAZETTEER_PATH` without rebuilding.
const BUILTIN_GAZETTEER: &str = include_str!("data/gazetteer.yaml");

#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("failed to read gazetteer file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse gazetteer YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid gazetteer: {0}")]
    Validation(String),
}

/// One canonical place with its known textual variants.
///
/// Variants are stored normalized (lowercase, suffix-stripped) so matching
/// never normalizes the same string twice. Variant sets may overlap across
/// entries; ambiguity is resolved by declaration order, not rejected here.
#[derive(Debug, Clone, Deserialize)]
pub struct GazetteerEntry {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// An ordered, immutable list of [`GazetteerEntry`] values.
///
/// Declaration order is the deterministic scan order for exact matching and
/// the tie-break order for equal fuzzy scores (first seen wins).
#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    /// Validate and normalize raw entries into a usable gazetteer.
    ///
    /// Every variant is passed through [`normalize`]; variants that normalize
    /// to the empty string are dropped, duplicates within an entry are
    /// deduplicated preserving first position.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Validation`] if any canonical name is blank,
    /// an entry has no usable variants, or two entries share a canonical name.
    pub fn new(raw: Vec<GazetteerEntry>) -> Result<Self, GazetteerError> {
        let mut seen_canonicals = HashSet::new();
        let mut entries = Vec::with_capacity(raw.len());

        for entry in raw {
            if entry.canonical.trim().is_empty() {
                return Err(GazetteerError::Validation(
                    "canonical name must be non-empty".to_string(),
                ));
            }
            if !seen_canonicals.insert(entry.canonical.clone()) {
                return Err(GazetteerError::Validation(format!(
                    "duplicate canonical name '{}'",
                    entry.canonical
                )));
            }

            let mut seen_variants = HashSet::new();
            let variants: Vec<String> = entry
                .variants
                .iter()
                .map(|v| normalize(v))
                .filter(|v| !v.is_empty())
                .filter(|v| seen_variants.insert(v.clone()))
                .collect();

            if variants.is_empty() {
                return Err(GazetteerError::Validation(format!(
                    "entry '{}' has no usable variants",
                    entry.canonical
                )));
            }

            entries.push(GazetteerEntry {
                canonical: entry.canonical,
                variants,
            });
        }

        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    cities: Vec<GazetteerEntry>,
    provinces: Vec<GazetteerEntry>,
}

/// The pair of gazetteers the matcher operates over.
#[derive(Debug, Clone)]
pub struct GazetteerSet {
    pub cities: Gazetteer,
    pub provinces: Gazetteer,
}

impl GazetteerSet {
    /// Load the built-in Philippine dataset.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the embedded YAML fails to parse or
    /// validate; both indicate a broken build rather than a runtime condition.
    pub fn builtin() -> Result<Self, GazetteerError> {
        Self::from_yaml(BUILTIN_GAZETTEER)
    }

    /// Load a gazetteer set from a YAML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load_from_path(path: &Path) -> Result<Self, GazetteerError> {
        let content = std::fs::read_to_string(path).map_err(|e| GazetteerError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self, GazetteerError> {
        let file: GazetteerFile = serde_yaml::from_str(content)?;
        Ok(Self {
            cities: Gazetteer::new(file.cities)?,
            provinces: Gazetteer::new(file.provinces)?,
        })
    }
}
