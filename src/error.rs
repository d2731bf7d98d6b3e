use thiserror::Error;

/// Failures surfaced by the table-definition generator.
///
/// Values that do not parse as numbers are not errors; they widen the column
/// to `varchar` instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DdlError {
    #[error("Table is empty. Must have 1 or more rows.")]
    EmptyTable,

    #[error("Could not find column '{0}' provided for varchar max")]
    ColumnNotFound(String),

    #[error("Row {row} has {found} value(s) but the header defines {expected} column(s)")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Padding must be a finite number, got {0}")]
    InvalidPadding(f64),
}

pub type DdlResult<T> = Result<T, DdlError>;
