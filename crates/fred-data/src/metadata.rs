//! Indicator metadata catalog
//!
//! The catalog is a JSON array scraped from the Wikipedia FRED table, one
//! record per series with upper-case keys:
//!
//! ```json
//! [{"SERIES": "UNRATE", "INDICATOR": "Civilian Unemployment Rate", "PERIOD": "M"}]
//! ```

use crate::Frequency;
use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// One row of the metadata table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct IndicatorMetadata {
    /// FRED series id
    pub series: String,
    /// Human readable indicator name
    pub indicator: String,
    /// Free-text reporting period
    #[serde(default)]
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl IndicatorMetadata {
    pub fn frequency(&self) -> Option<Frequency> {
        Frequency::from_period(&self.period)
    }
}

/// Read-only lookup table keyed by series id
#[derive(Debug, Clone, Default)]
pub struct MetadataCatalog {
    entries: Vec<IndicatorMetadata>,
    index: HashMap<String, usize>,
}

impl MetadataCatalog {
    /// Build a catalog from records; later duplicates win
    pub fn from_entries(entries: Vec<IndicatorMetadata>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.series.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Load the catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DataError::MetadataIo {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<IndicatorMetadata> = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), count = entries.len(), "Loaded indicator metadata");
        Ok(Self::from_entries(entries))
    }

    pub fn lookup(&self, series_id: &str) -> Option<&IndicatorMetadata> {
        self.index.get(series_id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorMetadata> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, e)| self.index.get(&e.series) == Some(i))
            .map(|(_, e)| e)
    }

    /// Render the indicator guide shown to the model, one `ID: name (M)` per line
    ///
    /// Entries are grouped under their category when one is present.
    pub fn indicator_guide(&self) -> String {
        let mut guide = String::new();
        let mut current_category: Option<&str> = None;

        for entry in self.iter() {
            let category = entry.category.as_deref();
            if category.is_some() && category != current_category {
                if !guide.is_empty() {
                    guide.push('\n');
                }
                guide.push_str(&format!("[{}]\n", category.unwrap_or_default()));
                current_category = category;
            }
            guide.push_str(&entry.series);
            guide.push_str(": ");
            guide.push_str(&entry.indicator);
            if let Some(freq) = entry.frequency() {
                guide.push_str(&format!(" ({})", freq.short_label()));
            }
            guide.push('\n');
        }
        guide
    }
}
