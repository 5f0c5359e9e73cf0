//! Retrieved command cards and the index seam.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A worked example attached to a command card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardExample {
    pub goal: String,
    pub command: String,
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub intent: String,

    #[serde(default)]
    pub resource: String,

    #[serde(default)]
    pub risk_level: String,

    pub command_template: String,

    #[serde(default)]
    pub examples: Vec<CardExample>,

    #[serde(default)]
    pub notes: Vec<String>,

    /// Similarity score; higher is closer.
    #[serde(default)]
    pub score: f32,
}

impl Snippet {
    /// Compact rendering used as planner context.
    ///
    /// At most two examples and three notes are included.
    pub fn render_compact(&self) -> String {
        let mut lines = vec![
            format!("Card: {}", self.id),
            format!("Template: {}", self.command_template),
        ];

        if !self.examples.is_empty() {
            lines.push("Examples:".to_string());
            lines.extend(
                self.examples
                    .iter()
                    .take(2)
                    .map(|ex| format!("  - {}: {}", ex.goal, ex.command)),
            );
        }

        if !self.notes.is_empty() {
            lines.push("Notes:".to_string());
            lines.extend(self.notes.iter().take(3).map(|note| format!("  - {note}")));
        }

        lines.join("\n")
    }
}

/// A semantic search backend over command cards.
///
/// Results are ordered best first. Implementations may return fewer than
/// `k` hits.
pub trait SnippetIndex: Send + Sync {
    fn semantic_search(&self, query: &str, k: usize) -> Result<Vec<Snippet>>;
}

/// Index used when no search backend is configured; never returns hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndex;

impl SnippetIndex for NoIndex {
    fn semantic_search(&self, _query: &str, _k: usize) -> Result<Vec<Snippet>> {
        Ok(Vec::new())
    }
}
