//! Advisory messages produced while generating a table definition.
//!
//! Nothing here is an error. Callers pass a [`DiagnosticSink`] to collect the
//! advisories; [`Advisory::emit`] forwards one to the `log` facade.

use std::fmt;

use log::{Level, log};
use serde::Serialize;

const DIST_KEY_DOCS: &str = "https://aws.amazon.com/about-aws/whats-new/2019/08/amazon-redshift-now-recommends-distribution-keys-for-improved-query-performance/";
const SORT_KEY_DOCS: &str =
    "https://docs.amazonaws.cn/en_us/redshift/latest/dg/c_best-practices-sort-key.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameReason {
    Empty,
    Reserved,
    LeadingDigit,
    Truncated,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    Renamed {
        index: usize,
        from: String,
        to: String,
        reason: RenameReason,
    },
    MissingKeys {
        distkey: bool,
        sortkey: bool,
    },
    UnknownOverride {
        column: String,
    },
}

impl Advisory {
    pub fn level(&self) -> Level {
        match self {
            Advisory::Renamed { .. } => Level::Info,
            Advisory::MissingKeys { .. } | Advisory::UnknownOverride { .. } => Level::Warn,
        }
    }

    pub fn emit(&self) {
        log!(self.level(), "{self}");
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::Renamed {
                index,
                from,
                to,
                reason,
            } => {
                let why = match reason {
                    RenameReason::Empty => "is an empty string",
                    RenameReason::Reserved => "is a Redshift reserved word",
                    RenameReason::LeadingDigit => "begins with a digit",
                    RenameReason::Truncated => "is longer than 120 characters",
                    RenameReason::Duplicate => "duplicates an earlier column",
                };
                let shown: String = from.chars().take(24).collect();
                let ellipsis = if shown.len() < from.len() { "..." } else { "" };
                write!(
                    f,
                    "Column {index} '{shown}{ellipsis}' {why}. Renaming column to '{to}'."
                )
            }
            Advisory::MissingKeys { distkey, sortkey } => {
                for (missing, name, docs) in [
                    (*distkey, "DIST", DIST_KEY_DOCS),
                    (*sortkey, "SORT", SORT_KEY_DOCS),
                ] {
                    if missing {
                        writeln!(
                            f,
                            "You didn't provide a {name} key. Best practices: {docs}"
                        )?;
                    }
                }
                write!(f, "You may be able to further optimize your queries.")
            }
            Advisory::UnknownOverride { column } => write!(
                f,
                "Column type override for '{column}' matches no column and was ignored."
            ),
        }
    }
}

/// Receives advisories as they are produced.
pub trait DiagnosticSink {
    fn record(&mut self, advisory: Advisory);
}

impl DiagnosticSink for Vec<Advisory> {
    fn record(&mut self, advisory: Advisory) {
        self.push(advisory);
    }
}

/// Sink that forwards straight to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, advisory: Advisory) {
        advisory.emit();
    }
}
