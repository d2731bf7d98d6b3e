//! Column type inference over tabular values.
//!
//! Types form a lattice `int < bigint < decimal < varchar`. A column starts
//! unset, every non-null value proposes a candidate, and [`RedshiftType::promote`]
//! keeps the wider of the two, so a column never narrows during a scan.
//! Values are classified by parsing their string form as a numeric literal
//! (see [`parse_literal`]); anything that is not a number makes the column
//! `varchar` for good.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::tabular::{Table, Value};

const INT_LOWER_EXCLUSIVE: i128 = -2_147_483_648;
const INT_UPPER_EXCLUSIVE: i128 = 2_147_483_647;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedshiftType {
    Int,
    BigInt,
    Decimal,
    Varchar,
}

impl RedshiftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedshiftType::Int => "int",
            RedshiftType::BigInt => "bigint",
            RedshiftType::Decimal => "decimal",
            RedshiftType::Varchar => "varchar",
        }
    }

    /// Returns the wider of `self` and `candidate`.
    pub fn promote(self, candidate: RedshiftType) -> RedshiftType {
        self.max(candidate)
    }
}

impl fmt::Display for RedshiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedshiftType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "int" => Ok(RedshiftType::Int),
            "bigint" => Ok(RedshiftType::BigInt),
            "decimal" => Ok(RedshiftType::Decimal),
            "varchar" => Ok(RedshiftType::Varchar),
            other => Err(format!("Unknown inferred type '{other}'")),
        }
    }
}

/// Outcome of reading a value's string form as a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// Integral literal. Magnitudes beyond `i128` saturate.
    Integer(i128),
    Float,
    /// Not a numeric literal.
    Other,
}

/// Parses `text` with numeric literal rules: one optional unary sign, decimal
/// integers (leading zeros only when every digit is zero), `0x`/`0o`/`0b`
/// integers, floats with fraction and/or exponent, and `_` separators
/// between digits. Imaginary literals (`1j`) and everything else are
/// [`Literal::Other`].
pub fn parse_literal(text: &str) -> Literal {
    let mut rest = text.trim_start_matches([' ', '\t']).trim_end();
    let negative = rest.starts_with('-');
    if let Some(unsigned) = rest.strip_prefix(['-', '+']) {
        rest = unsigned.trim_start();
    }
    if rest.is_empty() {
        return Literal::Other;
    }

    let lowered = rest.to_ascii_lowercase();
    let radix = match lowered.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    let magnitude = match radix {
        Some(radix) => parse_prefixed(&lowered[2..], radix),
        None => return parse_decimal(&lowered, negative),
    };
    match magnitude {
        Some(value) => Literal::Integer(if negative { -value } else { value }),
        None => Literal::Other,
    }
}

fn parse_prefixed(body: &str, radix: u32) -> Option<i128> {
    // `0x_ff` is allowed: one separator may directly follow the prefix.
    let body = body.strip_prefix('_').unwrap_or(body);
    let digits = digit_part(body, |c| c.is_digit(radix))?;
    if digits.len() != body.len() {
        return None;
    }
    Some(accumulate(digits, radix))
}

fn parse_decimal(body: &str, negative: bool) -> Literal {
    let integer = digit_part(body, |c| c.is_ascii_digit());
    let after_integer = &body[integer.map_or(0, str::len)..];

    let (fraction, after_fraction) = match after_integer.strip_prefix('.') {
        Some(tail) => {
            let fraction = digit_part(tail, |c| c.is_ascii_digit());
            (Some(fraction), &tail[fraction.map_or(0, str::len)..])
        }
        None => (None, after_integer),
    };
    if integer.is_none() && !matches!(fraction, Some(Some(_))) {
        return Literal::Other;
    }

    let mut tail = after_fraction;
    let mut has_exponent = false;
    if let Some(exponent) = tail.strip_prefix('e') {
        let unsigned = exponent
            .strip_prefix(['+', '-'])
            .unwrap_or(exponent);
        let Some(digits) = digit_part(unsigned, |c| c.is_ascii_digit()) else {
            return Literal::Other;
        };
        tail = &unsigned[digits.len()..];
        has_exponent = true;
    }
    if !tail.is_empty() {
        // `j` suffixes and trailing garbage alike.
        return Literal::Other;
    }

    if fraction.is_some() || has_exponent {
        return Literal::Float;
    }
    let Some(integer) = integer else {
        return Literal::Other;
    };
    let significant = integer.trim_start_matches(['0', '_']);
    if integer.starts_with('0') && !significant.is_empty() {
        return Literal::Other;
    }
    let value = accumulate(integer, 10);
    Literal::Integer(if negative { -value } else { value })
}

/// Longest prefix of `text` made of digits with single `_` separators
/// between them. `None` when `text` does not start with a digit.
fn digit_part(text: &str, is_digit: impl Fn(char) -> bool) -> Option<&str> {
    let mut end = 0;
    let mut pending_separator = false;
    for (idx, ch) in text.char_indices() {
        if is_digit(ch) {
            end = idx + ch.len_utf8();
            pending_separator = false;
        } else if ch == '_' && end > 0 && !pending_separator {
            pending_separator = true;
        } else {
            break;
        }
    }
    (end > 0).then(|| &text[..end])
}

fn accumulate(digits: &str, radix: u32) -> i128 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0i128, |acc, digit| {
            acc.saturating_mul(radix as i128)
                .saturating_add(digit as i128)
        })
}

/// Integers written with separators or zero-padding are identifiers such as
/// zip codes rather than quantities. Only all-digit text is checked for the
/// leading zero, so `-007` and `0.5` are unaffected.
fn text_is_valid_integer(text: &str) -> bool {
    if text.contains('_') {
        return false;
    }
    let all_digits = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
    !(all_digits && text.starts_with('0'))
}

/// Type `value` proposes given the column's type so far, already promoted
/// against `current`.
pub fn infer_value_type(value: &Value, current: Option<RedshiftType>) -> RedshiftType {
    let floor = current.unwrap_or(RedshiftType::Int);
    if floor == RedshiftType::Varchar {
        return floor;
    }
    let candidate = match parse_literal(&value.to_string()) {
        Literal::Other => RedshiftType::Varchar,
        Literal::Float => RedshiftType::Decimal,
        Literal::Integer(_) if floor == RedshiftType::Decimal => RedshiftType::Decimal,
        Literal::Integer(number) => {
            if value.as_text().is_some_and(|text| !text_is_valid_integer(text)) {
                RedshiftType::Varchar
            } else if INT_LOWER_EXCLUSIVE < number && number < INT_UPPER_EXCLUSIVE {
                RedshiftType::Int
            } else {
                RedshiftType::BigInt
            }
        }
    };
    floor.promote(candidate)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: RedshiftType,
    pub max_byte_width: usize,
}

/// Running per-column state while rows are scanned.
#[derive(Debug, Clone, Default)]
pub struct ColumnScanner {
    current: Option<RedshiftType>,
    max_byte_width: usize,
}

impl ColumnScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, value: &Value) {
        if self.current != Some(RedshiftType::Varchar) && !value.is_null_marker() {
            self.current = Some(infer_value_type(value, self.current));
        }
        self.max_byte_width = self.max_byte_width.max(value.byte_width());
    }

    pub fn current(&self) -> Option<RedshiftType> {
        self.current
    }

    /// Columns that only held null markers default to `varchar`.
    pub fn finish(self, name: impl Into<String>) -> ColumnProfile {
        ColumnProfile {
            name: name.into(),
            inferred_type: self.current.unwrap_or(RedshiftType::Varchar),
            max_byte_width: self.max_byte_width,
        }
    }
}

/// Scans every row and returns one profile per header, in header order.
pub fn profile_columns(table: &Table) -> Vec<ColumnProfile> {
    let mut scanners = vec![ColumnScanner::new(); table.num_columns()];
    for row in table.rows() {
        for (scanner, value) in scanners.iter_mut().zip(row) {
            scanner.observe(value);
        }
    }
    scanners
        .into_iter()
        .zip(table.headers())
        .map(|(scanner, name)| scanner.finish(name.clone()))
        .collect()
}
