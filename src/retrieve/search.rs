//! Filtered retrieval and context rendering.

use crate::error::Result;
use tracing::debug;

use super::snippet::{Snippet, SnippetIndex};

/// Separator placed between rendered snippets.
pub const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";

/// Retrieval tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    /// Number of snippets handed to the planner.
    pub k: usize,
    /// Below this many filtered hits, unfiltered hits are used instead.
    pub min_filtered_hits: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            k: 4,
            min_filtered_hits: 2,
        }
    }
}

/// Search query for a request.
pub fn build_query(intent: &str, resource: &str, name: &str, selector: Option<&str>) -> String {
    let mut query = format!("{intent} {resource} {name}");
    if let Some(selector) = selector.filter(|s| !s.is_empty()) {
        query.push_str(&format!(" with selector {selector}"));
    }
    query
}

/// Semantic search narrowed to cards matching `intent` and `resource`.
///
/// Over-fetches `2k` hits and filters them. If fewer than
/// `min_filtered_hits` survive, the top unfiltered hits are returned
/// instead. The result never exceeds `k`.
pub fn filtered_search(
    index: &dyn SnippetIndex,
    query: &str,
    intent: Option<&str>,
    resource: Option<&str>,
    options: &RetrievalOptions,
) -> Result<Vec<Snippet>> {
    let mut hits = index.semantic_search(query, options.k * 2)?;

    if intent.is_none() && resource.is_none() {
        hits.truncate(options.k);
        return Ok(hits);
    }

    let filtered: Vec<Snippet> = hits
        .iter()
        .filter(|hit| intent.is_none_or(|i| hit.intent == i))
        .filter(|hit| resource.is_none_or(|r| hit.resource == r))
        .cloned()
        .collect();

    debug!(
        fetched = hits.len(),
        kept = filtered.len(),
        "filtered retrieval hits"
    );

    let mut selected = if filtered.len() < options.min_filtered_hits {
        hits
    } else {
        filtered
    };
    selected.truncate(options.k);
    Ok(selected)
}

/// Retrieve and render planner context for a request.
///
/// Falls back to a plain semantic search when the filtered search finds
/// nothing. Returns an empty string when there is no context at all; the
/// prompt builder substitutes its placeholder.
pub fn retrieve_context(
    index: &dyn SnippetIndex,
    intent: &str,
    resource: &str,
    query: &str,
    options: &RetrievalOptions,
) -> Result<String> {
    let mut hits = filtered_search(index, query, Some(intent), Some(resource), options)?;
    if hits.is_empty() {
        hits = index.semantic_search(query, options.k)?;
    }
    hits.truncate(options.k);

    Ok(render_snippets(&hits))
}

/// Join compact renderings of `hits`.
pub fn render_snippets(hits: &[Snippet]) -> String {
    hits.iter()
        .map(Snippet::render_compact)
        .collect::<Vec<_>>()
        .join(SNIPPET_SEPARATOR)
}
