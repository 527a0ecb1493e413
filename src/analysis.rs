use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local, Timelike, Weekday};

use crate::record::CommandRecord;

/// Monday-first order used for `day_counts`.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStats {
    pub command: String,
    pub count: usize,
}

/// Earliest and latest timestamp seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub first: DateTime<Local>,
    pub last: DateTime<Local>,
}

impl TimeSpan {
    fn extend(span: Option<TimeSpan>, ts: DateTime<Local>) -> TimeSpan {
        match span {
            None => TimeSpan { first: ts, last: ts },
            Some(span) => TimeSpan {
                first: span.first.min(ts),
                last: span.last.max(ts),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Per-program counts in first-seen order.
    commands: Vec<CommandStats>,
    index: HashMap<String, usize>,
    /// Indexed by hour of day, 0-23.
    pub hour_counts: [usize; 24],
    /// Indexed like [`WEEKDAYS`].
    pub day_counts: [usize; 7],
    pub time_span: Option<TimeSpan>,
    pub has_timestamps: bool,
    pub total_records: usize,
}

/// Build statistics from parsed records in a single pass.
pub fn analyze(records: &[CommandRecord]) -> Statistics {
    let mut stats = Statistics::default();
    for record in records {
        stats.process_command(record);
        stats.process_timestamp(record);
    }
    stats
}

impl Statistics {
    fn process_command(&mut self, record: &CommandRecord) {
        self.total_records += 1;
        let Some(program) = record.program() else {
            return;
        };

        match self.index.get(program) {
            Some(&i) => self.commands[i].count += 1,
            None => {
                self.index.insert(program.to_string(), self.commands.len());
                self.commands.push(CommandStats {
                    command: program.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn process_timestamp(&mut self, record: &CommandRecord) {
        let Some(ts) = record.timestamp else {
            return;
        };

        self.has_timestamps = true;
        self.hour_counts[ts.hour() as usize] += 1;
        self.day_counts[ts.weekday().num_days_from_monday() as usize] += 1;
        self.time_span = Some(TimeSpan::extend(self.time_span, ts));
    }

    pub fn command_count(&self, command: &str) -> usize {
        self.index
            .get(command)
            .map_or(0, |&i| self.commands[i].count)
    }

    pub fn distinct_commands(&self) -> usize {
        self.commands.len()
    }

    pub fn day_count(&self, day: Weekday) -> usize {
        self.day_counts[day.num_days_from_monday() as usize]
    }

    pub fn timestamped_records(&self) -> usize {
        self.hour_counts.iter().sum()
    }

    /// Most used programs, highest count first. A `limit` of 0 returns all
    /// of them. Equal counts keep first-seen order.
    pub fn top_commands(&self, limit: usize) -> Vec<CommandStats> {
        let mut stats = self.commands.clone();
        stats.sort_by(|a, b| b.count.cmp(&a.count));
        if limit > 0 {
            stats.truncate(limit);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    fn timed(command: &str, secs: i64) -> CommandRecord {
        CommandRecord::new(command, Some(at(secs)))
    }

    #[test]
    fn test_empty_input() {
        let stats = analyze(&[]);
        assert_eq!(stats.distinct_commands(), 0);
        assert_eq!(stats.hour_counts, [0; 24]);
        assert_eq!(stats.day_counts, [0; 7]);
        assert_eq!(stats.time_span, None);
        assert!(!stats.has_timestamps);
        assert!(stats.top_commands(0).is_empty());
    }

    #[test]
    fn test_counts_first_token() {
        let records: Vec<CommandRecord> = ["ls", "ls -la", "ls /tmp", "  ls"]
            .iter()
            .map(|c| CommandRecord::untimed(*c))
            .collect();
        let stats = analyze(&records);
        assert_eq!(stats.command_count("ls"), 4);
        assert_eq!(stats.command_count("ls -la"), 0);
        assert_eq!(stats.distinct_commands(), 1);
        assert!(!stats.has_timestamps);
    }

    #[test]
    fn test_blank_command_counts_nothing() {
        let stats = analyze(&[CommandRecord::untimed("   ")]);
        assert_eq!(stats.distinct_commands(), 0);
        assert_eq!(stats.total_records, 1);
    }

    #[test]
    fn test_top_commands_limit_and_order() {
        let mut records = Vec::new();
        for (cmd, n) in [("cd", 2), ("git", 5), ("ls", 3), ("vim", 1)] {
            for _ in 0..n {
                records.push(CommandRecord::untimed(cmd));
            }
        }
        let stats = analyze(&records);

        let all = stats.top_commands(0);
        let counts: Vec<usize> = all.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![5, 3, 2, 1]);
        assert_eq!(all[0].command, "git");

        let top2 = stats.top_commands(2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].command, "git");
        assert_eq!(top2[1].command, "ls");

        assert_eq!(stats.top_commands(10).len(), 4);
    }

    #[test]
    fn test_top_commands_ties_keep_first_seen_order() {
        let records = vec![
            CommandRecord::untimed("zz"),
            CommandRecord::untimed("aa"),
            CommandRecord::untimed("mm"),
        ];
        let names: Vec<String> = analyze(&records)
            .top_commands(0)
            .into_iter()
            .map(|s| s.command)
            .collect();
        assert_eq!(names, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn test_time_buckets_match_timestamped_records() {
        let records = vec![
            timed("ls", 1_700_000_000),
            CommandRecord::untimed("pwd"),
            timed("git status", 1_700_003_600),
            timed("ls", 1_700_090_000),
        ];
        let stats = analyze(&records);

        assert!(stats.has_timestamps);
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.hour_counts.iter().sum::<usize>(), 3);
        assert_eq!(stats.day_counts.iter().sum::<usize>(), 3);
        assert_eq!(stats.timestamped_records(), 3);

        let first = at(1_700_000_000);
        assert!(stats.hour_counts[first.hour() as usize] >= 1);
        assert!(stats.day_count(first.weekday()) >= 1);
    }

    #[test]
    fn test_time_span_tracks_extrema_in_any_order() {
        let records = vec![
            timed("b", 1_700_050_000),
            timed("a", 1_700_000_000),
            timed("c", 1_700_090_000),
            timed("d", 1_700_020_000),
        ];
        let span = analyze(&records).time_span.unwrap();
        assert_eq!(span.first, at(1_700_000_000));
        assert_eq!(span.last, at(1_700_090_000));
    }

    #[test]
    fn test_single_timestamp_is_both_ends() {
        let span = analyze(&[timed("ls", 86_400)]).time_span.unwrap();
        assert_eq!(span.first, span.last);
    }
}
