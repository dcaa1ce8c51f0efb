//! Prompt contract for the generation backend and parsing of its response.

pub mod parser;
pub mod prompt;

use serde::{Deserialize, Serialize};

pub use parser::{parse, ResponseParser, MARKDOWN_HEADING_MARKER, RESPONSE_HEADING_MARKER};
pub use prompt::{build_prompt, PromptPayload, SYSTEM_PROMPT};

/// Categories the generation backend is asked to use, in prompt order.
///
/// Responses may carry other labels; those pass through verbatim.
pub const KNOWN_CATEGORIES: [&str; 6] = [
    "Features",
    "Fixes",
    "Improvements",
    "Deletions",
    "Documentation",
    "Other",
];

/// One category of the changelog with its display-ready items.
///
/// Items are opaque strings: author and timestamp stay embedded in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogSection {
    /// Category label as emitted, case preserved, trailing colon removed.
    pub category_name: String,
    /// Item texts in response order, without the bullet marker.
    pub items: Vec<String>,
}

impl ChangelogSection {
    /// Creates an empty section.
    pub fn new(category_name: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
            items: Vec::new(),
        }
    }

    /// Returns the known category whose name occurs in this label,
    /// compared case-insensitively.
    pub fn known_category(&self) -> Option<&'static str> {
        let label = self.category_name.to_lowercase();
        KNOWN_CATEGORIES
            .into_iter()
            .find(|known| label.contains(&known.to_lowercase()))
    }
}

/// Serializes sections back into the response shape the parser reads.
pub fn to_response_markdown(sections: &[ChangelogSection]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(&format!(
            "{RESPONSE_HEADING_MARKER}{}:\n",
            section.category_name
        ));
        for item in &section.items {
            out.push_str(&format!("- {item}\n\n"));
        }
        out.push('\n');
    }
    out
}
