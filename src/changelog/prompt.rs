//! Prompt contract sent to the generation backend.

use serde::Serialize;
use tracing::debug;

use crate::git::commit::CommitRecord;

/// Label used in the range header when no lower bound was given.
pub const RANGE_START_LABEL: &str = "start";

/// Lead-in placed before the commit log in the user message.
pub const USER_PROMPT_PREFIX: &str = "Here is the git log to convert into a changelog:\n\n";

/// Fixed categorization, noise-filtering and formatting rules for the generation backend
pub const SYSTEM_PROMPT: &str = r#"You are a professional technical writer who creates simple, easy-to-read changelogs.

Your task is to analyze git commits and create a changelog that anyone can understand:

1. **Categorize commits** into:
   - Features: New stuff added
   - Fixes: Bugs that were fixed
   - Improvements: Things that work better now
   - Deletions: Things that were removed
   - Documentation: Updates to docs or comments
   - Other (vague commit message): Config changes or unclear updates

2. **Skip the noise**:
   - Ignore: merge commits, version bumps, "WIP" commits
   - Ignore: trivial stuff like "fix typo", "update .gitignore"
   - Ignore: developer-only changes that don't affect users

3. **Write simply with file information**:
   - Each item should be 1-2 lines with easy-to-understand language
   - **Always mention which file(s) were changed, added, or deleted** (if available in the commit info)
   - Format file mentions like: "in `filename.py`" or "to `folder/file.js`"
   - Use simple, everyday words - avoid technical jargon
   - Focus on WHAT changed in plain English
   - For features: say what new thing was added and which files
   - For fixes: say what problem was solved and which files were fixed
   - For improvements: say what got better and which files were updated
   - For deletions: say what was removed (files or features)
   - Remove commit hashes
   - **Always include the author name** from the commit
   - Include the date and time

4. **Format with spacing**:
## Features:
- Added new login system in `auth.py` - by John Doe (Nov 4, 10:00 AM)

- Created dark mode toggle in `settings.js` - by Jane Smith (Nov 4, 9:30 AM)

## Fixes:
- Fixed password bug in `auth.py` - by John Doe (Nov 3, 2:30 PM)

- Resolved crash in `app.js` - by Bob Johnson (Nov 3, 1:15 PM)

## Improvements:
- Faster loading in `index.html` - by Jane Smith (Nov 2, 4:15 PM)

- Better error messages in `api.py` - by John Doe (Nov 2, 2:00 PM)

## Deletions:
- Removed old config file `old_config.json` - by Bob Johnson (Nov 1, 3:00 PM)

- Deleted unused feature from `legacy.py` - by Jane Smith (Nov 1, 2:00 PM)

## Documentation:
- Updated README.md with installation guide - by Jane Smith (Nov 1, 9:00 AM)

## Other (vague commit message):
- Updated dependencies in `package.json` - by John Doe (Oct 31, 3:45 PM)

**Important Rules:**
- Only include categories that have items
- **Always mention the file name(s) affected** when available
- Use simple, everyday language - no technical terms
- Keep it short (1-2 lines max per item)
- Use bullet points, not numbers
- **Add a blank line after each bullet point**
- **Always include " - by <Author Name>" before the timestamp**
- Always include the date and time in parentheses
- Make it easy for anyone to understand
- For deletions, clearly state what file or feature was removed"#;

/// System and user messages for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPayload {
    /// Fixed instruction text.
    pub system: String,
    /// Range header followed by one line per commit.
    pub user: String,
}

/// Builds the generation prompt for `commits` in their given order.
///
/// The user message reads:
///
/// ```text
/// Here is the git log to convert into a changelog:
///
/// Commits from <from|start> to <to>:
///
/// - <message> - by <author> (<timestamp>)
/// ```
pub fn build_prompt(commits: &[CommitRecord], from_ref: Option<&str>, to_ref: &str) -> PromptPayload {
    let from = from_ref
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(RANGE_START_LABEL);
    let commit_lines: Vec<String> = commits.iter().map(commit_line).collect();
    let git_log = format!(
        "Commits from {from} to {to_ref}:\n\n{}",
        commit_lines.join("\n")
    );

    debug!(
        commit_count = commits.len(),
        from,
        to = to_ref,
        "Built changelog prompt"
    );

    PromptPayload {
        system: SYSTEM_PROMPT.to_string(),
        user: format!("{USER_PROMPT_PREFIX}{git_log}"),
    }
}

fn commit_line(commit: &CommitRecord) -> String {
    format!(
        "- {} - by {} ({})",
        commit.message, commit.author_display_name, commit.timestamp
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, message: &str, author: Option<&str>, ts: &str) -> CommitRecord {
        CommitRecord::new(hash, message, author, ts)
    }

    #[test]
    fn user_message_lists_commits_in_order() {
        let commits = vec![
            commit("b1d4e2a", "feat(ui): add toggle", Some("Jane"), "Nov 04, 09:30 AM"),
            commit("a83b1c9", "fix(auth): resolve bug", None, ""),
        ];
        let prompt = build_prompt(&commits, Some("v1.0.0"), "HEAD");

        assert_eq!(
            prompt.user,
            "Here is the git log to convert into a changelog:\n\n\
             Commits from v1.0.0 to HEAD:\n\n\
             - feat(ui): add toggle - by Jane (Nov 04, 09:30 AM)\n\
             - fix(auth): resolve bug - by Unknown ()"
        );
        assert_eq!(prompt.system, SYSTEM_PROMPT);
    }

    #[test]
    fn missing_from_ref_reads_start() {
        let prompt = build_prompt(&[commit("a", "m", None, "")], None, "main");
        assert!(prompt.user.contains("Commits from start to main:"));

        let prompt = build_prompt(&[commit("a", "m", None, "")], Some(" "), "HEAD");
        assert!(prompt.user.contains("Commits from start to HEAD:"));
    }

    #[test]
    fn commit_line_shape() {
        let line = commit_line(&commit("a", "docs: readme", Some("Bob"), "2025-11-08T22:24:30Z"));
        insta::assert_snapshot!(line, @"- docs: readme - by Bob (2025-11-08T22:24:30Z)");
    }

    #[test]
    fn system_prompt_states_contract() {
        for category in crate::changelog::KNOWN_CATEGORIES {
            assert!(SYSTEM_PROMPT.contains(&format!("## {category}")));
        }
        assert!(SYSTEM_PROMPT.contains(r#"" - by <Author Name>""#));
        assert!(SYSTEM_PROMPT.contains("Only include categories that have items"));
    }
}
