//! Assembles a Redshift `create table` statement from a [`Table`].

use std::{collections::BTreeMap, fmt};

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::{
    diagnostics::{Advisory, DiagnosticSink},
    error::{DdlError, DdlResult},
    identifiers::sanitize_column_names,
    inference::{ColumnProfile, RedshiftType, profile_columns},
    tabular::Table,
    width,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableOptions {
    /// Fraction added to every VARCHAR width, e.g. `0.2` for 20%.
    pub padding: Option<f64>,
    pub distkey: Option<String>,
    pub sortkey: Option<String>,
    /// Sanitized column names whose width is forced to the VARCHAR maximum.
    pub varchar_max: Vec<String>,
    /// Clamp widths above the VARCHAR maximum.
    pub varchar_truncate: bool,
    /// Round widths up to the next step in [`width::VARCHAR_STEPS`].
    pub round_to_steps: bool,
    /// Column type overrides keyed by sanitized column name.
    pub column_types: BTreeMap<String, String>,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self {
            padding: None,
            distkey: None,
            sortkey: None,
            varchar_max: Vec::new(),
            varchar_truncate: true,
            round_to_steps: false,
            column_types: BTreeMap::new(),
        }
    }
}

/// Final SQL type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnSqlType {
    Inferred(RedshiftType),
    /// Caller-supplied type text, emitted verbatim.
    Override(String),
}

impl ColumnSqlType {
    fn from_override(text: &str) -> Self {
        match text.parse::<RedshiftType>() {
            Ok(parsed) => ColumnSqlType::Inferred(parsed),
            Err(_) => ColumnSqlType::Override(text.to_string()),
        }
    }

    pub fn is_varchar(&self) -> bool {
        matches!(self, ColumnSqlType::Inferred(RedshiftType::Varchar))
    }
}

impl fmt::Display for ColumnSqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSqlType::Inferred(inferred) => write!(f, "{inferred}"),
            ColumnSqlType::Override(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: ColumnSqlType,
    pub width: usize,
}

impl ColumnDefinition {
    /// `"name" type`, with the width appended for VARCHAR columns.
    pub fn render(&self) -> String {
        let name = quote_identifier(&self.name);
        if self.sql_type.is_varchar() {
            format!("{name} varchar({})", self.width)
        } else {
            format!("{name} {}", self.sql_type)
        }
    }
}

/// Double-quoted identifier; embedded `"` are doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDefinition {
    pub sql: String,
    pub columns: Vec<ColumnDefinition>,
    pub advisories: Vec<Advisory>,
}

/// Infers column names, types and widths for `table` and renders the
/// `create table` statement. Headers of `table` are rewritten in place to
/// their sanitized form.
///
/// Advisories are returned on the definition and also logged. Advisories
/// recorded before a failure are logged as well.
pub fn create_statement(
    table: &mut Table,
    table_name: &str,
    options: &CreateTableOptions,
) -> DdlResult<TableDefinition> {
    let mut advisories: Vec<Advisory> = Vec::new();
    let built = build_columns(table, table_name, options, &mut advisories);
    advisories.iter().for_each(Advisory::emit);
    let columns = built?;

    let sql = render_sql(
        table_name,
        &columns,
        options.distkey.as_deref(),
        options.sortkey.as_deref(),
    );
    Ok(TableDefinition {
        sql,
        columns,
        advisories,
    })
}

fn build_columns(
    table: &mut Table,
    table_name: &str,
    options: &CreateTableOptions,
    sink: &mut impl DiagnosticSink,
) -> DdlResult<Vec<ColumnDefinition>> {
    log_key_warning(options, sink);
    if table.is_empty() {
        return Err(DdlError::EmptyTable);
    }

    let headers = sanitize_column_names(table.headers(), sink);
    table.set_headers(headers);

    let profiles = profile_columns(table);
    debug!(
        "Profiled {} column(s) across {} row(s) for '{}'",
        profiles.len(),
        table.num_rows(),
        table_name
    );
    let widths = finalize_widths(&profiles, table.headers(), options)?;
    Ok(apply_overrides(&profiles, widths, &options.column_types, sink))
}

fn log_key_warning(options: &CreateTableOptions, sink: &mut impl DiagnosticSink) {
    let distkey = options.distkey.as_deref().is_none_or(str::is_empty);
    let sortkey = options.sortkey.as_deref().is_none_or(str::is_empty);
    if distkey || sortkey {
        sink.record(Advisory::MissingKeys { distkey, sortkey });
    }
}

/// Runs the width stages in order: padding, step rounding, force-max,
/// truncation, validation.
pub fn finalize_widths(
    profiles: &[ColumnProfile],
    headers: &[String],
    options: &CreateTableOptions,
) -> DdlResult<Vec<usize>> {
    let mut widths: Vec<usize> = profiles.iter().map(|p| p.max_byte_width).collect();
    if let Some(padding) = options.padding {
        width::pad_widths(&mut widths, padding)?;
    }
    if options.round_to_steps {
        width::round_widths_to_steps(&mut widths);
    }
    if !options.varchar_max.is_empty() {
        width::force_max_widths(&mut widths, headers, &options.varchar_max)?;
    }
    if options.varchar_truncate {
        width::truncate_widths(&mut widths);
    }
    width::validate_widths(&mut widths);
    Ok(widths)
}

fn apply_overrides(
    profiles: &[ColumnProfile],
    widths: Vec<usize>,
    overrides: &BTreeMap<String, String>,
    sink: &mut impl DiagnosticSink,
) -> Vec<ColumnDefinition> {
    for column in overrides.keys() {
        if !profiles.iter().any(|profile| &profile.name == column) {
            sink.record(Advisory::UnknownOverride {
                column: column.clone(),
            });
        }
    }

    profiles
        .iter()
        .zip(widths)
        .map(|(profile, width)| {
            let sql_type = match overrides.get(&profile.name) {
                Some(text) if !text.is_empty() => ColumnSqlType::from_override(text),
                _ => ColumnSqlType::Inferred(profile.inferred_type),
            };
            ColumnDefinition {
                name: profile.name.clone(),
                sql_type,
                width,
            }
        })
        .collect()
}

/// Emits the statement text. `table_name` and the keys are interpolated
/// as given; column names are quoted.
pub fn render_sql(
    table_name: &str,
    columns: &[ColumnDefinition],
    distkey: Option<&str>,
    sortkey: Option<&str>,
) -> String {
    let body = columns
        .iter()
        .map(|column| format!("\n  {}", column.render()))
        .join(",");
    let mut statement = format!("create table {table_name} ({body}) ");
    if let Some(key) = distkey.filter(|key| !key.is_empty()) {
        statement.push_str(&format!("\ndistkey({key}) "));
    }
    if let Some(key) = sortkey.filter(|key| !key.is_empty()) {
        statement.push_str(&format!("\nsortkey({key})"));
    }
    statement.push(';');
    statement
}
