//! Presentation surfaces for parsed changelog sections.

pub mod markdown;
pub mod terminal;

pub use markdown::MarkdownFileRenderer;
pub use terminal::TerminalRenderer;

/// `"<n> commit"` or `"<n> commits"`.
pub(crate) fn commit_count_label(commit_count: usize) -> String {
    if commit_count == 1 {
        "1 commit".to_string()
    } else {
        format!("{commit_count} commits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_count_label_pluralizes() {
        assert_eq!(commit_count_label(0), "0 commits");
        assert_eq!(commit_count_label(1), "1 commit");
        assert_eq!(commit_count_label(42), "42 commits");
    }
}
