//! Histogram rows grouped by link key

use indexmap::{IndexMap, IndexSet};

use crate::model::{HistogramEntry, LinkKey};

/// Histogram buckets keyed by link key.
///
/// Buckets and the rows inside them keep first-seen order. Built once per
/// view and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    buckets: IndexMap<LinkKey, Vec<HistogramEntry>>,
    /// Coordinate names across all buckets, first-seen order
    coord_names: Vec<String>,
    /// Largest `|coord_value|` over the whole table
    max_abs: f64,
}

impl GroupIndex {
    /// Group a flat table by key
    pub fn build(entries: impl IntoIterator<Item = HistogramEntry>) -> Self {
        let mut buckets: IndexMap<LinkKey, Vec<HistogramEntry>> = IndexMap::new();
        let mut coord_names: IndexSet<String> = IndexSet::new();
        let mut max_abs = 0.0_f64;

        for entry in entries {
            max_abs = max_abs.max(entry.coord_value.abs());
            if !coord_names.contains(&entry.coord_name) {
                coord_names.insert(entry.coord_name.clone());
            }
            buckets.entry(entry.key.clone()).or_default().push(entry);
        }

        tracing::debug!(
            "Built group index: {} buckets, {} coordinates, max |value| {}",
            buckets.len(),
            coord_names.len(),
            max_abs
        );

        Self {
            buckets,
            coord_names: coord_names.into_iter().collect(),
            max_abs,
        }
    }

    pub fn get(&self, key: &LinkKey) -> Option<&[HistogramEntry]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &LinkKey) -> bool {
        self.buckets.contains_key(key)
    }

    /// Key of the first row that was indexed
    pub fn first_key(&self) -> Option<&LinkKey> {
        self.buckets.keys().next()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LinkKey> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LinkKey, &[HistogramEntry])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn coord_names(&self) -> &[String] {
        &self.coord_names
    }

    pub fn max_abs(&self) -> f64 {
        self.max_abs
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of indexed rows
    pub fn row_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
