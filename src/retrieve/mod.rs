//! Context retrieval from a command-card search backend.
//!
//! The index itself is external. The core asks for the top-k cards for a
//! query, narrows them to the requested intent and resource when enough
//! match, and renders compact snippets for the planner prompt.

mod command;
mod search;
mod snippet;

pub use command::CommandIndex;
pub use search::{
    RetrievalOptions, SNIPPET_SEPARATOR, build_query, filtered_search, render_snippets,
    retrieve_context,
};
pub use snippet::{CardExample, NoIndex, Snippet, SnippetIndex};
