//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one line per item.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use ordinal_core::{RenumberEntry, Rule};

use crate::cli::{ColorMode, OutputFormat};

const SUMMARY_WIDTH: usize = 72;

pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&line_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a one-line status message to stderr, keeping stdout parseable.
pub fn print_status(message: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    let mut stderr = io::stderr().lock();
    if color {
        let _ = writeln!(stderr, "{} {message}", "✓".green());
    } else {
        let _ = writeln!(stderr, "{message}");
    }
}

/// Render a single document: JSON when asked for, YAML otherwise.
pub fn render_document<T: serde::Serialize>(format: &OutputFormat, data: &T) -> String {
    match format {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Table | OutputFormat::Yaml | OutputFormat::Plain => render_yaml(data),
    }
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct RuleRow {
    #[tabled(rename = "#")]
    number: u32,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Fields")]
    fields: String,
}

impl RuleRow {
    fn of(rule: &Rule) -> Self {
        let description = rule
            .field("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Self {
            number: rule.number,
            description,
            fields: summarize_fields(rule),
        }
    }
}

pub fn render_rules(format: &OutputFormat, rules: &[Rule]) -> String {
    render_list(format, rules, RuleRow::of, |r| r.number.to_string())
}

/// `key=value` pairs of every payload field except the description.
fn summarize_fields(rule: &Rule) -> String {
    let summary = rule
        .payload
        .iter()
        .filter(|(k, _)| k.as_str() != "description")
        .map(|(k, v)| match v {
            Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ");

    if summary.chars().count() > SUMMARY_WIDTH {
        let cut: String = summary.chars().take(SUMMARY_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        summary
    }
}

// ── Renumbering transactions ─────────────────────────────────────────

#[derive(Tabled)]
pub struct EntryRow {
    #[tabled(rename = "Old #")]
    old_number: u32,
    #[tabled(rename = "New #")]
    new_number: u32,
    #[tabled(rename = "Change")]
    change: &'static str,
}

impl EntryRow {
    fn of(entry: &RenumberEntry) -> Self {
        Self {
            old_number: entry.old_number,
            new_number: entry.new_number,
            change: if entry.is_identity() { "" } else { "moved" },
        }
    }
}

pub fn render_entries(format: &OutputFormat, entries: &[RenumberEntry]) -> String {
    render_list(format, entries, EntryRow::of, |e| {
        format!("{} -> {}", e.old_number, e.new_number)
    })
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}
