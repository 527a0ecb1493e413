//! History file discovery and parsing.
//!
//! Two line formats are understood:
//!
//! * zsh extended history, one record per line: `: 1698247289:0;ls -l`
//! * bash history, optionally preceded by `#<epoch>` marker lines when
//!   `HISTTIMEFORMAT` is set.

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info};

use crate::error::{Result, TermtimeError};
use crate::record::CommandRecord;

/// Supported history file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Zsh,
    Bash,
}

impl Dialect {
    /// Probe order used when the preferred shell has no history file.
    pub const ALL: [Dialect; 2] = [Dialect::Zsh, Dialect::Bash];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Zsh => "zsh",
            Dialect::Bash => "bash",
        }
    }

    pub fn history_file_name(self) -> &'static str {
        match self {
            Dialect::Zsh => ".zsh_history",
            Dialect::Bash => ".bash_history",
        }
    }

    pub fn candidate(self, home: &Path) -> PathBuf {
        home.join(self.history_file_name())
    }

    /// Parse every line of `reader` in this dialect. Malformed lines are
    /// skipped; only read failures are reported.
    pub fn parse<R: BufRead>(self, reader: R) -> io::Result<Vec<CommandRecord>> {
        match self {
            Dialect::Zsh => parse_zsh(reader),
            Dialect::Bash => parse_bash(reader),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guess the dialect from a shell path such as `$SHELL`.
pub fn classify_shell(shell: &str) -> Option<Dialect> {
    let shell = shell.to_lowercase();
    Dialect::ALL
        .into_iter()
        .find(|dialect| shell.contains(dialect.name()))
}

/// Pick the parser for a history file from its path alone. Anything that
/// does not mention zsh is read as bash history.
pub fn determine_dialect(path: &Path) -> Dialect {
    let path = path.to_string_lossy().to_lowercase();
    if path.contains(Dialect::Zsh.name()) {
        Dialect::Zsh
    } else {
        Dialect::Bash
    }
}

/// Find the history file for the current user.
///
/// `shell_hint` overrides `$SHELL` as the preferred-shell signal.
pub fn locate(shell_hint: Option<&str>) -> Result<(PathBuf, Dialect)> {
    let home = dirs::home_dir().ok_or_else(|| {
        TermtimeError::Environment("could not determine the home directory".to_string())
    })?;

    let signal = preferred_shell(shell_hint, env::var("SHELL").ok());
    debug!("Preferred shell signal: {:?}", signal);

    locate_in(&home, signal.as_deref())
}

/// A configured shell hint wins over the `$SHELL` value.
pub fn preferred_shell(shell_hint: Option<&str>, env_shell: Option<String>) -> Option<String> {
    shell_hint.map(str::to_string).or(env_shell)
}

/// Same as [`locate`] with the home directory and shell signal supplied.
pub fn locate_in(home: &Path, preferred_shell: Option<&str>) -> Result<(PathBuf, Dialect)> {
    if let Some(dialect) = preferred_shell.and_then(classify_shell) {
        let path = dialect.candidate(home);
        if path.exists() {
            return Ok((path, dialect));
        }
        debug!("No {} history at {}", dialect, path.display());
    }

    Dialect::ALL
        .into_iter()
        .map(|dialect| (dialect.candidate(home), dialect))
        .find(|(path, _)| path.exists())
        .ok_or_else(|| TermtimeError::NotFound {
            home: home.to_path_buf(),
        })
}

/// Open `path` and parse it with the dialect its name suggests.
pub fn parse_file(path: &Path) -> Result<Vec<CommandRecord>> {
    parse_file_as(path, determine_dialect(path))
}

fn parse_file_as(path: &Path, dialect: Dialect) -> Result<Vec<CommandRecord>> {
    let io_error = |source| TermtimeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let records = dialect.parse(BufReader::new(file)).map_err(io_error)?;

    info!(
        "Parsed {} records from {} as {} history",
        records.len(),
        path.display(),
        dialect
    );
    Ok(records)
}

/// Decode a Unix epoch in seconds. Anything that is not a plain decimal
/// `i64` within chrono's range yields `None`.
pub fn parse_epoch(s: &str) -> Option<DateTime<Local>> {
    let secs: i64 = s.parse().ok()?;
    Local.timestamp_opt(secs, 0).single()
}

fn parse_zsh<R: BufRead>(reader: R) -> io::Result<Vec<CommandRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for_each_line(reader, |line| match parse_zsh_line(line) {
        Some(record) => records.push(record),
        None if !line.trim().is_empty() => skipped += 1,
        None => {}
    })?;

    if skipped > 0 {
        debug!("Skipped {} malformed zsh history lines", skipped);
    }
    Ok(records)
}

fn parse_zsh_line(line: &str) -> Option<CommandRecord> {
    let rest = line.trim().strip_prefix(": ")?;
    let (meta, command) = rest.split_once(';')?;

    // meta is "<epoch>:<elapsed>"
    let token = meta.split_whitespace().next()?;
    let token = token.strip_prefix(':').unwrap_or(token);
    let epoch = token.split(':').next()?;
    let timestamp = parse_epoch(epoch)?;

    let command = command.trim();
    if command.is_empty() {
        return None;
    }
    Some(CommandRecord::new(command, Some(timestamp)))
}

fn parse_bash<R: BufRead>(reader: R) -> io::Result<Vec<CommandRecord>> {
    let mut records = Vec::new();
    let mut pending: Option<DateTime<Local>> = None;

    for_each_line(reader, |line| {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        // A marker that does not hold an epoch is an ordinary command
        if let Some(timestamp) = line.strip_prefix('#').and_then(parse_epoch) {
            pending = Some(timestamp);
            return;
        }

        records.push(CommandRecord::new(line, pending.take()));
    })?;

    if pending.is_some() {
        debug!("Dropping trailing bash timestamp marker without a command");
    }
    Ok(records)
}

/// Feed each line to `on_line`, decoding invalid UTF-8 lossily.
fn for_each_line<R: BufRead>(mut reader: R, mut on_line: impl FnMut(&str)) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        on_line(&String::from_utf8_lossy(&buf));
    }
}
