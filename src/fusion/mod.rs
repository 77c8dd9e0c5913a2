//! Weighted multi-source context fusion.
//!
//! Documents retrieved from several sources are merged into one ranked list
//! by multiplying each document's raw retrieval score with a fixed
//! per-source reliability weight. The weights are priors about the sources,
//! not derived from data, and they are independent multipliers rather than a
//! probability distribution.

use crate::types::{ContextDocument, FusedDocument};
use std::collections::HashMap;

/// Weight applied to documents from a source the table does not know.
pub const NEUTRAL_WEIGHT: f64 = 0.5;

/// Fixed source-reliability multipliers.
///
/// The built-in table covers the sources of the historical archive; any
/// entry can be overridden (or a new source added) through configuration.
#[derive(Debug, Clone)]
pub struct SourceWeights {
    weights: HashMap<String, f64>,
}

impl Default for SourceWeights {
    fn default() -> Self {
        let mut weights = HashMap::new();
        weights.insert("ACLED".to_string(), 0.5); // event-based, volatile
        weights.insert("CIA_FACTS".to_string(), 0.6); // structural, long-term
        weights.insert("FREEDOM_WORLD".to_string(), 0.6); // institutional, moderate confidence
        weights.insert("IMF".to_string(), 0.75); // high reliability, quantitative
        weights.insert("WBI".to_string(), 0.7); // robust, socio-economic fundamentals
        Self { weights }
    }
}

impl SourceWeights {
    /// Built-in table with configured overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut table = Self::default();
        for (tag, weight) in overrides {
            table.weights.insert(tag.clone(), *weight);
        }
        table
    }

    pub fn weight_for(&self, source_tag: &str) -> f64 {
        self.weights.get(source_tag).copied().unwrap_or(NEUTRAL_WEIGHT)
    }

    /// Merge ranked result sets from multiple sources into one list ordered
    /// by weighted score, descending.
    ///
    /// Pure function: same input, byte-identical output. The sort is stable,
    /// so documents with equal weighted scores keep their retrieval order.
    /// Empty input yields an empty list.
    pub fn fuse(
        &self,
        source_results: &HashMap<String, Vec<ContextDocument>>,
    ) -> Vec<FusedDocument> {
        // Iterate sources in sorted-tag order so output is deterministic
        // regardless of HashMap iteration order.
        let mut tags: Vec<&String> = source_results.keys().collect();
        tags.sort();

        let mut fused: Vec<FusedDocument> = Vec::new();
        for tag in tags {
            let weight = self.weight_for(tag);
            for doc in &source_results[tag] {
                fused.push(FusedDocument {
                    weighted_score: doc.raw_score * weight,
                    document: doc.clone(),
                });
            }
        }

        fused.sort_by(|a, b| {
            b.weighted_score
                .partial_cmp(&a.weighted_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(count = fused.len(), "Fused context documents");
        fused
    }

    /// Fuse a flat document list by grouping on each document's source tag.
    pub fn fuse_tagged(&self, documents: &[ContextDocument]) -> Vec<FusedDocument> {
        let mut by_source: HashMap<String, Vec<ContextDocument>> = HashMap::new();
        for doc in documents {
            by_source
                .entry(doc.source_tag.clone())
                .or_default()
                .push(doc.clone());
        }
        self.fuse(&by_source)
    }
}
