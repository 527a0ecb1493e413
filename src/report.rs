use std::collections::BTreeSet;
use std::error::Error;
use std::io::Write;
use std::path::Path;

use serde_json::json;
use thousands::Separable;

use crate::analysis::{CommandStats, Statistics, TimeSpan, WEEKDAYS};

const HOUR_BAR_WIDTH: usize = 50;
const DAY_BAR_WIDTH: usize = 40;
const SPAN_FORMAT: &str = "%d %b %Y %H:%M";

/// What was analyzed, printed above the charts.
pub struct Source<'a> {
    pub shell: &'a str,
    pub path: &'a Path,
}

pub struct ChartItem {
    pub label: String,
    pub value: usize,
}

/// Horizontal bars scaled so the largest value spans `bar_width` cells.
pub fn draw_bar_chart(
    out: &mut impl Write,
    items: &[ChartItem],
    bar_width: usize,
) -> std::io::Result<()> {
    let max = items.iter().map(|item| item.value).max().unwrap_or(0);

    for item in items {
        let bar_len = if max > 0 { item.value * bar_width / max } else { 0 };
        writeln!(
            out,
            "{} │{} {}",
            item.label,
            "█".repeat(bar_len),
            item.value.separate_with_commas()
        )?;
    }
    Ok(())
}

pub fn print_top_commands(out: &mut impl Write, stats: &[CommandStats]) -> std::io::Result<()> {
    writeln!(out, "=== Most Used Commands ===")?;
    for (i, stat) in stats.iter().enumerate() {
        writeln!(
            out,
            "{:2}. {:<10} {}",
            i + 1,
            stat.command,
            stat.count.separate_with_commas()
        )?;
    }
    Ok(())
}

pub fn print_hourly_chart(
    out: &mut impl Write,
    hour_counts: &[usize; 24],
) -> std::io::Result<()> {
    writeln!(out, "\n=== Hourly Activity ===")?;
    let items: Vec<ChartItem> = hour_counts
        .iter()
        .enumerate()
        .map(|(hour, &value)| ChartItem {
            label: format!("{:02}:00", hour),
            value,
        })
        .collect();
    draw_bar_chart(out, &items, HOUR_BAR_WIDTH)
}

pub fn print_day_of_week_chart(
    out: &mut impl Write,
    day_counts: &[usize; 7],
) -> std::io::Result<()> {
    writeln!(out, "\n=== Days of Week ===")?;
    let items: Vec<ChartItem> = WEEKDAYS
        .iter()
        .zip(day_counts)
        .map(|(day, &value)| ChartItem {
            label: day.to_string(),
            value,
        })
        .collect();
    draw_bar_chart(out, &items, DAY_BAR_WIDTH)
}

pub fn print_time_span(out: &mut impl Write, span: &TimeSpan) -> std::io::Result<()> {
    writeln!(
        out,
        "\nFrom {} to {}",
        span.first.format(SPAN_FORMAT),
        span.last.format(SPAN_FORMAT)
    )
}

pub fn print_text_report(
    out: &mut impl Write,
    source: &Source,
    ignore_list: &BTreeSet<String>,
    stats: &Statistics,
    limit: usize,
) -> std::io::Result<()> {
    writeln!(out, "Using {} history file: {}\n", source.shell, source.path.display())?;
    if !ignore_list.is_empty() {
        let ignored: Vec<&str> = ignore_list.iter().map(String::as_str).collect();
        writeln!(out, "Ignoring commands: {}\n", ignored.join(", "))?;
    }

    print_top_commands(out, &stats.top_commands(limit))?;

    match &stats.time_span {
        Some(span) => {
            print_hourly_chart(out, &stats.hour_counts)?;
            print_day_of_week_chart(out, &stats.day_counts)?;
            print_time_span(out, span)
        }
        None => writeln!(out, "\nNo timestamps found, history doesn't include time info."),
    }
}

pub fn print_json_report(
    out: &mut impl Write,
    source: &Source,
    stats: &Statistics,
    limit: usize,
) -> Result<(), Box<dyn Error>> {
    let top: Vec<_> = stats
        .top_commands(limit)
        .into_iter()
        .map(|s| json!({ "command": s.command, "count": s.count }))
        .collect();
    // Monday first, same as the text chart
    let days: Vec<_> = WEEKDAYS
        .iter()
        .zip(stats.day_counts)
        .map(|(day, count)| json!({ "day": day.to_string(), "count": count }))
        .collect();

    let mut result = json!({
        "shell": source.shell,
        "file": source.path.display().to_string(),
        "commands": stats.total_records,
        "unique_commands": stats.distinct_commands(),
        "top_commands": top,
        "has_timestamps": stats.has_timestamps,
    });
    if let Some(span) = &stats.time_span {
        result["hours"] = json!(stats.hour_counts.to_vec());
        result["days"] = json!(days);
        result["time_span"] = json!({
            "first": span.first.to_rfc3339(),
            "last": span.last.to_rfc3339(),
        });
    }

    serde_json::to_writer_pretty(&mut *out, &result)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_csv_report(
    out: &mut impl Write,
    stats: &Statistics,
    limit: usize,
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["rank", "command", "count"])?;
    for (i, stat) in stats.top_commands(limit).iter().enumerate() {
        writer.write_record([(i + 1).to_string(), stat.command.clone(), stat.count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
