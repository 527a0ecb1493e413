use chrono::{DateTime, Local};

/// One executed command taken from a history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Command line with any history metadata stripped.
    pub command: String,
    /// `None` when the history line carried no time information.
    pub timestamp: Option<DateTime<Local>>,
}

impl CommandRecord {
    pub fn new(command: impl Into<String>, timestamp: Option<DateTime<Local>>) -> Self {
        CommandRecord {
            command: command.into(),
            timestamp,
        }
    }

    pub fn untimed(command: impl Into<String>) -> Self {
        Self::new(command, None)
    }

    /// First whitespace-separated token, i.e. the program that was run.
    pub fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }
}
