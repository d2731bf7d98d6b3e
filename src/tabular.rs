//! In-memory tabular input: a header row plus rectangular rows of scalars.
//!
//! Inference and width tracking operate on a value's *string form*, so each
//! [`Value`] renders the way the upstream loaders print it. Floats follow the
//! shortest round-trip notation with a trailing `.0` for integral values and
//! scientific notation outside `1e-4..1e16` (`1.0`, `1e+20`, `1.5e-05`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, DdlResult};

/// Text values that mark a missing cell.
pub const NULL_MARKERS: &[&str] = &["NA", ""];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null_marker(&self) -> bool {
        match self {
            Value::Text(text) => NULL_MARKERS.contains(&text.as_str()),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// UTF-8 byte length of the string form.
    pub fn byte_width(&self) -> usize {
        match self {
            Value::Text(text) => text.len(),
            other => other.to_string().len(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => f.write_str(&format_float(*value)),
            Value::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{value:e}");
        let Some((mantissa, exponent)) = rendered.split_once('e') else {
            return rendered;
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    let mut rendered = value.to_string();
    if !rendered.contains('.') {
        rendered.push_str(".0");
    }
    rendered
}

/// Header row plus data rows. Every row carries one value per header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> DdlResult<Self> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != headers.len())
        {
            return Err(DdlError::RaggedRow {
                row,
                expected: headers.len(),
                found: values.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Builds a table from string cells, as read from a delimited file.
    pub fn from_text_rows<H, R, C>(headers: H, rows: R) -> DdlResult<Self>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| Value::Text(cell.into()))
                    .collect()
            })
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column in row order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Replaces the header row. The column count must not change.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        debug_assert_eq!(headers.len(), self.headers.len());
        self.headers = headers;
    }
}
