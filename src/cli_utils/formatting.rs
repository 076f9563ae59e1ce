use colored::Colorize;

use crate::aggregators::{AggregateRecord, AggregationPlan};

/// Format a table with columns and rows
pub fn format_table(headers: Vec<&str>, rows: Vec<Vec<String>>) {
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.len())
                .fold(header.len(), usize::max)
        })
        .collect();

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = col_widths[i]))
        .collect::<Vec<_>>()
        .join(" | ");

    println!("{}", header_line.bold());
    println!("{}", "-".repeat(header_line.len()));

    for row in rows {
        let row_line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:>width$}", cell, width = col_widths.get(i).copied().unwrap_or(20)))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{}", row_line);
    }
}

/// Format data as JSON
pub fn format_json<T: serde::Serialize>(data: &T) -> String {
    match serde_json::to_string_pretty(data) {
        Ok(json) => json,
        Err(_) => "Unable to format as JSON".to_string(),
    }
}

/// Format a single record as key-value pairs
pub fn format_record(data: Vec<(&str, String)>) {
    let max_key_len = data.iter().map(|(k, _)| k.len()).max().unwrap_or(20);

    for (key, value) in data {
        let padded_key = format!("{:width$}", key, width = max_key_len);
        println!("  {}: {}", padded_key.bright_cyan(), value);
    }
}

pub fn print_header(text: &str) {
    println!();
    println!("{}", text.bold().bright_cyan());
    println!("{}", "=".repeat(text.len()));
    println!();
}

pub fn print_section(text: &str) {
    println!();
    println!("{}", text.bold().bright_white());
    println!("{}", "-".repeat(text.len()));
}

pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a cache status with color
pub fn format_status(status: &str) -> String {
    match status {
        "fresh" => status.green().to_string(),
        "cached" => status.bright_green().to_string(),
        "stale" => status.yellow().to_string(),
        "fallback" => status.red().to_string(),
        _ => status.white().to_string(),
    }
}

/// Rows of a window table, one per bucket, in the plan's field order.
pub fn record_rows(records: &[AggregateRecord], plan: &AggregationPlan) -> Vec<Vec<String>> {
    let fields = plan.field_names();

    records
        .iter()
        .map(|record| {
            let mut row = vec![record.time.clone()];
            row.extend(fields.iter().map(|field| format_amount(record.value(field))));
            row
        })
        .collect()
}

/// Column sums across a window, in the plan's field order.
pub fn window_totals(records: &[AggregateRecord], plan: &AggregationPlan) -> Vec<(&'static str, f64)> {
    plan.field_names()
        .into_iter()
        .map(|field| {
            let sum: f64 = records.iter().map(|r| r.value(field)).sum();
            (field, sum)
        })
        .collect()
}
