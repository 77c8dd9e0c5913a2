//! Keyword-based intent routing.

use crate::types::WorkerRole;

/// Terms that indicate the query is about spatial distribution of events.
const GEOSPATIAL_KEYWORDS: &[&str] = &[
    "map",
    "where",
    "location",
    "region",
    "hotspot",
    "cluster",
    "coordinates",
    "geographic",
    "spatial",
    "border",
];

/// Terms that indicate the query needs analytical reasoning over data.
const ANALYTICAL_KEYWORDS: &[&str] = &[
    "analyze",
    "analysis",
    "pattern",
    "trend",
    "statistics",
    "data",
    "compare",
    "evaluate",
    "forecast",
    "why",
];

/// Terms that indicate the query needs fresh information from the web.
const SEARCH_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "look up",
    "news",
    "latest",
    "recent",
    "current",
    "today",
    "happening",
];

fn matches_any(query: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| query.contains(k))
}

/// Maps a free-text query to the worker roles relevant to it.
///
/// Pure and deterministic. Categories are checked in a fixed order
/// (geospatial, analytical, search) and a query may match several of them.
/// A query that matches nothing routes to the analyst so the output is
/// never empty.
pub fn route(query: &str) -> Vec<WorkerRole> {
    let q = query.to_lowercase();
    let mut roles = Vec::new();

    if matches_any(&q, GEOSPATIAL_KEYWORDS) {
        roles.push(WorkerRole::Geo);
    }
    if matches_any(&q, ANALYTICAL_KEYWORDS) {
        roles.push(WorkerRole::Analyst);
    }
    if matches_any(&q, SEARCH_KEYWORDS) {
        roles.push(WorkerRole::Search);
    }

    if roles.is_empty() {
        roles.push(WorkerRole::Analyst);
    }
    roles
}
