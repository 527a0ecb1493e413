use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{Result, TermtimeError};
use crate::record::CommandRecord;

/// True when the program name (first token) of `command` is in `ignore_list`.
/// Matching is exact and case-sensitive; blank commands are never ignored.
pub fn should_ignore(command: &str, ignore_list: &BTreeSet<String>) -> bool {
    match command.split_whitespace().next() {
        Some(program) => ignore_list.contains(program),
        None => false,
    }
}

/// Include filter on the full command line, e.g. `--grep '^git '`.
#[derive(Debug, Clone)]
pub struct CommandPattern {
    regex: Regex,
}

impl CommandPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| TermtimeError::Config(format!("invalid pattern '{}': {}", pattern, e)))?;
        Ok(CommandPattern { regex })
    }

    pub fn is_match(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for CommandPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for CommandPattern {}

/// Build a new record list without ignored commands, keeping the order of
/// the survivors. When `pattern` is given only matching commands are kept.
pub fn filter_records(
    records: &[CommandRecord],
    ignore_list: &BTreeSet<String>,
    pattern: Option<&CommandPattern>,
) -> Vec<CommandRecord> {
    records
        .iter()
        .filter(|record| !should_ignore(&record.command, ignore_list))
        .filter(|record| pattern.map_or(true, |p| p.is_match(&record.command)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_should_ignore_first_token_only() {
        let ignore = list(&["git"]);
        assert!(should_ignore("git status", &ignore));
        assert!(should_ignore("  git   push origin", &ignore));
        assert!(!should_ignore("gitk", &ignore));
        assert!(!should_ignore("echo git", &ignore));
        assert!(!should_ignore("Git status", &ignore));
    }

    #[test]
    fn test_blank_command_never_ignored() {
        assert!(!should_ignore("  ", &list(&["git", ""])));
        assert!(!should_ignore("", &list(&[])));
    }

    #[test]
    fn test_filter_preserves_order_and_input() {
        let records = vec![
            CommandRecord::untimed("ls"),
            CommandRecord::untimed("git status"),
            CommandRecord::untimed("cd /tmp"),
            CommandRecord::untimed("vim notes"),
            CommandRecord::untimed("ls -la"),
        ];
        let filtered = filter_records(&records, &list(&["ls", "cd"]), None);

        let commands: Vec<&str> = filtered.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, vec!["git status", "vim notes"]);
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_filter_with_pattern() {
        let records = vec![
            CommandRecord::untimed("git status"),
            CommandRecord::untimed("cargo test"),
            CommandRecord::untimed("git push"),
            CommandRecord::untimed("cargo build"),
        ];
        let pattern = CommandPattern::new("^(git|cargo) (status|build)").unwrap();
        let filtered = filter_records(&records, &list(&["cargo"]), Some(&pattern));

        assert_eq!(filtered, vec![CommandRecord::untimed("git status")]);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = CommandPattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, TermtimeError::Config(_)));
    }
}
