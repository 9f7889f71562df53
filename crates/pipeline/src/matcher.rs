//! Framework matching — fuzzy query routing over the catalog.

use caretutor_core::error::RoutingError;
use rapidfuzz::fuzz;
use tracing::debug;

use crate::catalog::FrameworkEntry;

/// Pick the catalog entry whose name best matches the query.
///
/// Scoring is partial-ratio fuzzy similarity between the lower-cased query
/// and each lower-cased entry name: best-aligned substring overlap, scaled
/// 0-100, tolerant of length mismatch between the strings. The first entry
/// wins unless a later entry scores strictly higher, so ties keep the
/// earliest entry. There is no score threshold; even a poor best match is
/// returned.
pub fn choose_framework<'a>(
    query: &str,
    catalog: &'a [FrameworkEntry],
) -> std::result::Result<&'a FrameworkEntry, RoutingError> {
    let Some(first) = catalog.first() else {
        return Err(RoutingError::NoFrameworksAvailable);
    };

    let query_lower = query.to_lowercase();
    let mut best = first;
    let mut best_score = -1.0_f64;

    for entry in catalog {
        let score = fuzz::partial_ratio(query_lower.chars(), entry.name.to_lowercase().chars());
        if score > best_score {
            best_score = score;
            best = entry;
        }
    }

    debug!(framework = %best.name, score = best_score, "framework chosen");
    Ok(best)
}
