//! Reciprocal Rank Fusion: merge per-provider ranked lists into one ordering.
//!
//! Each hit contributes `1 / (K + rank)` to its canonical key's cumulative
//! score, so a link ranked highly by several independent providers beats a
//! link ranked first by only one. Hits sharing a canonical key are merged
//! into a single entry.

use std::collections::HashMap;

use crate::types::{AggregatedResult, ProviderResult};

use super::canonical::canonicalize;

/// Reciprocal Rank Fusion constant.
pub const RRF_K: f64 = 60.0;

/// Score contribution of a single hit at the given 1-based rank.
pub fn rrf_contribution(original_rank: usize) -> f64 {
    1.0 / (RRF_K + original_rank as f64)
}

/// Fuse the concatenated provider results into one deduplicated, ranked list.
///
/// Input order across providers is irrelevant to scores and membership.
/// Hits without a link are discarded. Merge policy for hits sharing a
/// canonical key:
///
/// - scores sum;
/// - the longer non-empty snippet wins;
/// - image fields are back-filled from the first contributor that supplies
///   a thumbnail, when the stored entry lacks one;
/// - link, title, and source stay as first seen.
///
/// The output is sorted descending by score with a stable sort, so exact
/// score ties keep first-encountered order.
pub fn fuse(results: Vec<ProviderResult>) -> Vec<AggregatedResult> {
    let mut fused: Vec<AggregatedResult> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in results {
        let Some(link) = result.link else {
            tracing::trace!(source = %result.source, "dropping hit without link");
            continue;
        };

        let key = canonicalize(&link);
        let contribution = rrf_contribution(result.original_rank);

        if let Some(&at) = index.get(&key) {
            let entry = &mut fused[at];
            entry.rrf_score += contribution;
            if !result.snippet.is_empty() && entry.snippet.len() < result.snippet.len() {
                entry.snippet = result.snippet;
            }
            if entry.thumbnail_link.is_none() && result.thumbnail_link.is_some() {
                entry.thumbnail_link = result.thumbnail_link;
                entry.context_link = result.context_link;
            }
        } else {
            index.insert(key.clone(), fused.len());
            fused.push(AggregatedResult {
                canonical_key: key,
                link,
                title: result.title,
                snippet: result.snippet,
                source: result.source,
                rrf_score: contribution,
                context_link: result.context_link,
                thumbnail_link: result.thumbnail_link,
            });
        }
    }

    fused.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused
}
