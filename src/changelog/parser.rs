//! Tolerant line-oriented parser for generated changelog markdown.

use tracing::debug;

use super::ChangelogSection;

/// Heading marker used by the generation backend.
pub const RESPONSE_HEADING_MARKER: &str = "## ";

/// Heading marker used by the markdown file renderer.
pub const MARKDOWN_HEADING_MARKER: &str = "### ";

const ITEM_MARKER: &str = "- ";

/// Splits loosely structured markdown into ordered sections.
///
/// Two states: outside any section, where everything but a heading is
/// dropped, and inside a section, where `- ` lines append items. Other
/// lines are ignored in both states. No semantic validation is applied
/// to item text.
#[derive(Debug, Clone, Copy)]
pub struct ResponseParser {
    heading_marker: &'static str,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// Parser for backend responses (`## ` headings).
    pub const fn new() -> Self {
        Self {
            heading_marker: RESPONSE_HEADING_MARKER,
        }
    }

    /// Parser using a different heading marker, e.g. `### ` for files
    /// written by the markdown renderer.
    pub const fn with_heading_marker(heading_marker: &'static str) -> Self {
        Self { heading_marker }
    }

    /// Parses `raw_text` into sections in order of appearance.
    pub fn parse(&self, raw_text: &str) -> Vec<ChangelogSection> {
        let mut sections: Vec<ChangelogSection> = Vec::new();
        let mut dropped = 0usize;

        for line in raw_text.lines().map(str::trim) {
            if let Some(heading) = line.strip_prefix(self.heading_marker) {
                sections.push(ChangelogSection::new(category_name(heading)));
            } else if let Some(item) = line.strip_prefix(ITEM_MARKER) {
                match sections.last_mut() {
                    Some(section) => section.items.push(item.trim().to_string()),
                    None => dropped += 1,
                }
            }
        }

        debug!(
            sections = sections.len(),
            items = sections.iter().map(|s| s.items.len()).sum::<usize>(),
            dropped,
            "Parsed changelog response"
        );
        sections
    }
}

/// Parses a backend response with the default `## ` marker.
pub fn parse(raw_text: &str) -> Vec<ChangelogSection> {
    ResponseParser::new().parse(raw_text)
}

fn category_name(heading: &str) -> String {
    let heading = heading.trim();
    heading.strip_suffix(':').unwrap_or(heading).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "\
Here is your changelog:

## Features:
- Added dark mode toggle in `settings.js` - by Jane Smith (Nov 4, 9:30 AM)

- Avatar uploads in `profile.py` - by Bob (Nov 3, 1:15 PM)

## Fixes
- Fixed password reset in `auth.py` - by Unknown ()

Some trailing commentary.
## Other (vague commit message):
-   Updated dependencies   
";

    #[test]
    fn parses_sections_and_items_in_order() {
        let sections = parse(RESPONSE);
        let names: Vec<&str> = sections.iter().map(|s| s.category_name.as_str()).collect();
        assert_eq!(names, ["Features", "Fixes", "Other (vague commit message)"]);

        assert_eq!(
            sections[0].items,
            [
                "Added dark mode toggle in `settings.js` - by Jane Smith (Nov 4, 9:30 AM)",
                "Avatar uploads in `profile.py` - by Bob (Nov 3, 1:15 PM)",
            ]
        );
        assert_eq!(sections[1].items.len(), 1);
        assert_eq!(sections[2].items, ["Updated dependencies"]);
    }

    #[test]
    fn items_before_first_heading_are_dropped() {
        let sections = parse("- orphan item\n## Fixes:\n- real item");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].items, ["real item"]);
    }

    #[test]
    fn no_headings_yields_no_sections() {
        assert!(parse("- a\n- b\nplain text").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn heading_without_items_is_kept() {
        let sections = parse("## Deletions:\n\n## Features:\n- x");
        assert_eq!(sections[0].category_name, "Deletions");
        assert!(sections[0].items.is_empty());
        assert_eq!(sections[1].items, ["x"]);
    }

    #[test]
    fn unknown_labels_pass_through_with_case() {
        let sections = parse("## security HARDENING:\n- pinned TLS");
        assert_eq!(sections[0].category_name, "security HARDENING");
    }

    #[test]
    fn deeper_headings_are_not_sections_by_default() {
        let sections = parse("## Features:\n### Sub\n- item");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].items, ["item"]);
    }

    #[test]
    fn custom_marker_reads_level_three_headings() {
        let parser = ResponseParser::with_heading_marker(MARKDOWN_HEADING_MARKER);
        let sections = parser.parse("# CHANGELOG\n\n---\n\n### FIXES\n\n- crash fix\n\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category_name, "FIXES");
        assert_eq!(sections[0].items, ["crash fix"]);
    }

    mod prop {
        use super::*;
        use crate::changelog::to_response_markdown;
        use proptest::prelude::*;

        fn section_strategy() -> impl Strategy<Value = ChangelogSection> {
            (
                "[A-Za-z][A-Za-z ()]{0,20}[A-Za-z)]",
                proptest::collection::vec("[A-Za-z0-9`(][A-Za-z0-9 `.,()-]{0,40}[A-Za-z0-9`)]", 0..5),
            )
                .prop_map(|(category_name, items)| ChangelogSection {
                    category_name,
                    items,
                })
        }

        proptest! {
            #[test]
            fn parse_is_idempotent(sections in proptest::collection::vec(section_strategy(), 0..6)) {
                let once = parse(&to_response_markdown(&sections));
                prop_assert_eq!(&once, &sections);
                let twice = parse(&to_response_markdown(&once));
                prop_assert_eq!(twice, once);
            }
        }
    }
}
