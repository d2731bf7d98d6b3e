use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::inference::ColumnProfile;

const REPORT_HEADERS: [&str; 4] = ["#", "column", "type", "max_bytes"];

#[derive(Debug, Serialize)]
struct ProfileReport<'a> {
    rows: usize,
    columns: &'a [ColumnProfile],
}

/// Renders profiles as an aligned text table with a dashed separator.
pub fn render_profiles(profiles: &[ColumnProfile]) -> String {
    let rows: Vec<[String; 4]> = profiles
        .iter()
        .enumerate()
        .map(|(idx, profile)| {
            [
                idx.to_string(),
                profile.name.clone(),
                profile.inferred_type.to_string(),
                profile.max_byte_width.to_string(),
            ]
        })
        .collect();

    let mut widths = REPORT_HEADERS.map(|header| header.chars().count().max(3));
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&REPORT_HEADERS, &widths));
    let separator = widths.map(|width| "-".repeat(width));
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Pretty JSON document with the scanned row count and every profile.
pub fn render_profiles_json(profiles: &[ColumnProfile], rows: usize) -> Result<String> {
    let report = ProfileReport {
        rows,
        columns: profiles,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}
