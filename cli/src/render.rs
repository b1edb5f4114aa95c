//! Live terminal rendering for the watch loop.

use std::io::{self, Write};
use std::time::Duration;

use androidstat_core::TrendDelta;
use chrono::{DateTime, Local};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

const DATE_FORMAT: &str = "%d.%m.%Y (%H:%M:%S)";
const VALUE_WIDTH: usize = 10;
const TREND_WIDTH: usize = 11;

/// One rendered metric: key, latest value, and movement across windows.
pub type TrendRow = (String, i64, TrendDelta);

/// Timing of the current measurement.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub started: DateTime<Local>,
    pub current: DateTime<Local>,
    pub index: u64,
    pub interval: Duration,
}

/// Clears the screen and prints the measurement banner.
pub fn draw_header(out: &mut impl Write, measurement: &Measurement) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    label(out, "Start:              ")?;
    queue!(out, Print(measurement.started.format(DATE_FORMAT)), Print("\n"))?;
    label(out, "Current measurement:")?;
    queue!(
        out,
        Print(measurement.current.format(DATE_FORMAT)),
        Print(format!(" [{}]\n", measurement.index))
    )?;
    let next = measurement.current
        + chrono::Duration::from_std(measurement.interval).unwrap_or(chrono::Duration::zero());
    label(out, "Next measurement:   ")?;
    queue!(
        out,
        Print(next.format(DATE_FORMAT)),
        Print(format!(
            " [{}; rate=1/{}sec]\n",
            measurement.index + 1,
            measurement.interval.as_secs()
        ))
    )
}

pub fn draw_active(out: &mut impl Write, package: &str, pid: u32) -> io::Result<()> {
    label(out, "Process:            ")?;
    queue!(
        out,
        SetForegroundColor(Color::Green),
        Print("ACTIVE"),
        ResetColor,
        Print(format!(" ({package} => pid:{pid})\n\n"))
    )
}

/// Shows that the process could not be captured, with the time since it was
/// last seen.
pub fn draw_inactive(out: &mut impl Write, package: &str, since: Duration) -> io::Result<()> {
    label(out, "Process:            ")?;
    queue!(
        out,
        SetForegroundColor(Color::Red),
        Print("INACTIVE"),
        ResetColor,
        Print(format!(" since {}sec ({package})\n", since.as_secs()))
    )
}

pub fn draw_trends(out: &mut impl Write, rows: &[TrendRow]) -> io::Result<()> {
    let name_width = rows.iter().map(|row| row.0.len()).max().unwrap_or(4).max(4);

    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(trend_header(name_width)),
        SetAttribute(Attribute::Reset),
        Print("\n"),
        SetForegroundColor(Color::DarkGrey),
        Print(trend_rule(name_width)),
        ResetColor,
        Print("\n")
    )?;
    for (key, value, delta) in rows {
        queue!(out, Print(trend_line(name_width, key, *value, delta)), Print("\n"))?;
    }
    Ok(())
}

/// Reports what the last CSV row added.
pub fn draw_recorded(out: &mut impl Write, path: &str, added: usize, total: usize) -> io::Result<()> {
    queue!(
        out,
        Print("\n"),
        Print(format!(
            "Added {added} bytes to {path} (filesize: {})\n",
            human_size(total)
        ))
    )
}

fn label(out: &mut impl Write, text: &str) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(text),
        SetAttribute(Attribute::Reset),
        Print(" ")
    )
}

pub fn trend_header(name_width: usize) -> String {
    format!(
        "{:<name_width$} | {:>VALUE_WIDTH$} | {:>TREND_WIDTH$} | {:>TREND_WIDTH$} | {:>TREND_WIDTH$} | {:>TREND_WIDTH$}",
        "Name", "Value", "T1000", "T100", "T10", "T1"
    )
}

/// Dashed rule under the header, with `+` where the header has `|`.
pub fn trend_rule(name_width: usize) -> String {
    let cell = |width: usize| "-".repeat(width + 2);
    format!(
        "{}+{}+{}+{}+{}+{}",
        "-".repeat(name_width + 1),
        cell(VALUE_WIDTH),
        cell(TREND_WIDTH),
        cell(TREND_WIDTH),
        cell(TREND_WIDTH),
        "-".repeat(TREND_WIDTH + 1)
    )
}

pub fn trend_line(name_width: usize, key: &str, value: i64, delta: &TrendDelta) -> String {
    format!(
        "{key:<name_width$} | {value:>VALUE_WIDTH$} | {:>TREND_WIDTH$.1} | {:>TREND_WIDTH$.1} | {:>TREND_WIDTH$.1} | {:>TREND_WIDTH$.1}",
        delta.p1000, delta.p100, delta.p10, delta.p1
    )
}

/// Formats a byte count as B, kB (above 2048 bytes) or MB (above 10 MiB).
pub fn human_size(bytes: usize) -> String {
    if bytes > 10 * 1024 * 1024 {
        format!("{}MB", bytes / (1024 * 1024))
    } else if bytes > 2048 {
        format!("{}kB", bytes / 1024)
    } else {
        format!("{bytes}B")
    }
}
