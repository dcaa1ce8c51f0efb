//! Adapter for free-form pasted `git log --oneline` style text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::git::commit::CommitRecord;

/// Abbreviated or full hex commit hash.
static HASH_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{4,40}$").unwrap());

/// Splits pasted text into commit records, one per non-blank line.
///
/// Each line is `<hash> <message>`. A line whose first token is not a
/// recognizable hash keeps the whole line as its message and gets a
/// synthetic `commit-<line_index>` hash, where the index counts lines of the
/// trimmed input. This never fails; an empty result means the input held no
/// non-blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PastedLogAdapter;

impl PastedLogAdapter {
    /// Creates the adapter.
    pub fn new() -> Self {
        Self
    }

    /// Parses `text` into at most `limit` records (`None` for no cap).
    pub fn normalize(&self, text: &str, limit: Option<usize>) -> Vec<CommitRecord> {
        let records: Vec<CommitRecord> = text
            .trim()
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| parse_line(index, line.trim()))
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        debug!(count = records.len(), "Parsed pasted git log");
        records
    }
}

fn parse_line(index: usize, line: &str) -> CommitRecord {
    if let Some((token, rest)) = line.split_once(char::is_whitespace) {
        let message = rest.trim_start();
        if HASH_TOKEN_PATTERN.is_match(token) && !message.is_empty() {
            return CommitRecord::new(token, message, None, "");
        }
    }
    CommitRecord::new(format!("commit-{index}"), line, None, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::commit::UNKNOWN_AUTHOR;

    #[test]
    fn oneline_log_is_split_into_hash_and_message() {
        let records = PastedLogAdapter::new().normalize(
            "a83b1c9 fix(auth): resolve bug\nb1d4e2a feat(ui): add toggle",
            None,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].short_hash, "a83b1c9");
        assert_eq!(records[0].message, "fix(auth): resolve bug");
        assert_eq!(records[1].short_hash, "b1d4e2a");
        assert_eq!(records[1].message, "feat(ui): add toggle");
        assert!(records
            .iter()
            .all(|r| r.author_display_name == UNKNOWN_AUTHOR && r.timestamp.is_empty()));
    }

    #[test]
    fn line_without_hash_gets_synthetic_hash() {
        let records = PastedLogAdapter::new().normalize("a83b1c9 first\nupdated-readme\n", None);
        assert_eq!(records[1].short_hash, "commit-1");
        assert_eq!(records[1].message, "updated-readme");
    }

    #[test]
    fn non_hex_first_token_keeps_whole_line() {
        let records = PastedLogAdapter::new().normalize("Fix the login page", None);
        assert_eq!(records[0].short_hash, "commit-0");
        assert_eq!(records[0].message, "Fix the login page");
    }

    #[test]
    fn leading_blank_lines_do_not_shift_index() {
        let records = PastedLogAdapter::new().normalize("\n\n  \nwip\n", None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].short_hash, "commit-0");
    }

    #[test]
    fn inner_blank_lines_are_skipped_but_counted_for_index() {
        let records = PastedLogAdapter::new().normalize("\nfirst\n\nsecond", None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].short_hash, "commit-0");
        assert_eq!(records[1].short_hash, "commit-2");
    }

    #[test]
    fn tabs_and_runs_of_spaces_separate_hash() {
        let records = PastedLogAdapter::new().normalize("deadbeef\t  chore: bump", None);
        assert_eq!(records[0].short_hash, "deadbeef");
        assert_eq!(records[0].message, "chore: bump");
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        assert!(PastedLogAdapter::new().normalize(" \n\t\n", None).is_empty());
        assert!(PastedLogAdapter::new().normalize("", None).is_empty());
    }

    #[test]
    fn limit_caps_records() {
        let records = PastedLogAdapter::new().normalize("a\nb\nc", Some(2));
        assert_eq!(records.len(), 2);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn one_record_per_non_blank_line(lines in proptest::collection::vec("[ -~]{0,40}", 0..20)) {
                let text = lines.join("\n");
                let expected = lines.iter().filter(|l| !l.trim().is_empty()).count();
                let records = PastedLogAdapter::new().normalize(&text, None);
                prop_assert_eq!(records.len(), expected);
                prop_assert!(records.iter().all(|r| !r.message.is_empty()));
            }

            #[test]
            fn single_token_lines_are_synthetic(lines in proptest::collection::vec("[!-~]{1,30}", 1..10)) {
                let text = lines.join("\n");
                let records = PastedLogAdapter::new().normalize(&text, None);
                for (index, (record, line)) in records.iter().zip(&lines).enumerate() {
                    prop_assert_eq!(&record.message, line);
                    prop_assert_eq!(record.short_hash.clone(), format!("commit-{index}"));
                }
            }
        }
    }
}
