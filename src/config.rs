use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, TermtimeError};
use crate::filter::CommandPattern;

const CONFIG_FILE: &str = ".termtimerc";
const DEFAULT_TOP_LIMIT: i64 = 10;

/// Optional settings read from `~/.termtimerc`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub limit: Option<i64>,
    pub shell: Option<String>,
    pub ignore: Option<Vec<String>>,
    pub file: Option<PathBuf>,
    pub pattern: Option<String>,
}

impl ConfigFile {
    /// Missing, unreadable or malformed files all fall back to defaults.
    pub fn load() -> Self {
        match dirs::home_dir() {
            Some(home) => Self::load_from(&home.join(CONFIG_FILE)),
            None => ConfigFile::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!("No config loaded from {}: {}", path.display(), e);
                return ConfigFile::default();
            }
        };
        match toml::from_str(&text) {
            Ok(file) => file,
            Err(e) => {
                warn!("Ignoring malformed config {}: {}", path.display(), e);
                ConfigFile::default()
            }
        }
    }
}

/// Run configuration. Construct with defaults, apply overrides, then call
/// [`Config::validate`]; the validated value is only read from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub top_limit: i64,
    pub shell_hint: Option<String>,
    pub ignore_list: BTreeSet<String>,
    pub history_file: Option<PathBuf>,
    pub pattern: Option<String>,
    /// Compiled form of `pattern`, set by [`Config::validate`].
    compiled_pattern: Option<CommandPattern>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            top_limit: DEFAULT_TOP_LIMIT,
            shell_hint: None,
            ignore_list: BTreeSet::new(),
            history_file: None,
            pattern: None,
            compiled_pattern: None,
        }
    }
}

impl Config {
    pub fn apply_file(mut self, file: ConfigFile) -> Self {
        if let Some(limit) = file.limit {
            self.top_limit = limit;
        }
        if file.shell.is_some() {
            self.shell_hint = file.shell;
        }
        if let Some(ignore) = file.ignore {
            self.ignore_list
                .extend(ignore.iter().flat_map(|entry| parse_ignore_list(entry)));
        }
        if file.file.is_some() {
            self.history_file = file.file;
        }
        if file.pattern.is_some() {
            self.pattern = file.pattern;
        }
        self
    }

    /// Add the entries of a comma-separated ignore string.
    pub fn add_ignore_commands(&mut self, ignore: &str) {
        self.ignore_list.extend(parse_ignore_list(ignore));
    }

    pub fn validate(mut self) -> Result<Self> {
        if self.top_limit < 0 {
            return Err(TermtimeError::Config(
                "top commands limit cannot be negative".to_string(),
            ));
        }
        self.compiled_pattern = self.pattern.as_deref().map(CommandPattern::new).transpose()?;
        Ok(self)
    }

    /// Limit as used by `top_commands`, where 0 means no limit.
    pub fn top_limit(&self) -> usize {
        usize::try_from(self.top_limit).unwrap_or(0)
    }

    /// `None` until validated or when no pattern is configured.
    pub fn command_pattern(&self) -> Option<&CommandPattern> {
        self.compiled_pattern.as_ref()
    }
}

/// Split on `,`, trim each entry and drop empty ones.
pub fn parse_ignore_list(ignore: &str) -> Vec<String> {
    ignore
        .split(',')
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .map(String::from)
        .collect()
}
