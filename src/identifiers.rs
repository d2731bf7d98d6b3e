//! Column name normalization for Redshift identifiers.

use std::collections::HashSet;

use crate::diagnostics::{Advisory, DiagnosticSink, RenameReason};

/// Longest identifier emitted, in characters. Redshift allows 127 bytes.
pub const MAX_IDENTIFIER_CHARS: usize = 120;

/// Words Redshift reserves; they cannot be used as bare column names.
pub const RESERVED_WORDS: &[&str] = &[
    "AES128", "AES256", "ALL", "ALLOWOVERWRITE", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY",
    "AS", "ASC", "AUTHORIZATION", "BACKUP", "BETWEEN", "BINARY", "BLANKSASNULL", "BOTH",
    "BYTEDICT", "BZIP2", "CASE", "CAST", "CHECK", "COLLATE", "COLUMN", "CONSTRAINT", "CREATE",
    "CREDENTIALS", "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "CURRENT_USER_ID", "DEFAULT", "DEFERRABLE", "DEFLATE", "DEFRAG", "DELTA", "DELTA32K", "DESC",
    "DISABLE", "DISTINCT", "DO", "ELSE", "EMPTYASNULL", "ENABLE", "ENCODE", "ENCRYPT",
    "ENCRYPTION", "END", "EXCEPT", "EXPLICIT", "FALSE", "FOR", "FOREIGN", "FREEZE", "FROM",
    "FULL", "GLOBALDICT256", "GLOBALDICT64K", "GRANT", "GROUP", "GZIP", "HAVING", "IDENTITY",
    "IGNORE", "ILIKE", "IN", "INITIALLY", "INNER", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "LEADING", "LEFT", "LIKE", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "LUN", "LUNS", "LZO",
    "LZOP", "MINUS", "MOSTLY13", "MOSTLY32", "MOSTLY8", "NATURAL", "NEW", "NOT", "NOTNULL",
    "NULL", "NULLS", "OFF", "OFFLINE", "OFFSET", "OLD", "ON", "ONLY", "OPEN", "OR", "ORDER",
    "OUTER", "OVERLAPS", "PARALLEL", "PARTITION", "PERCENT", "PERMISSIONS", "PLACING", "PRIMARY",
    "RAW", "READRATIO", "RECOVER", "REFERENCES", "RESPECT", "REJECTLOG", "RESORT", "RESTORE",
    "RIGHT", "SELECT", "SESSION_USER", "SIMILAR", "SOME", "SYSDATE", "SYSTEM", "TABLE", "TAG",
    "TDES", "TEXT255", "TEXT32K", "THEN", "TIMESTAMP", "TO", "TOP", "TRAILING", "TRUE",
    "TRUNCATECOLUMNS", "UNION", "UNIQUE", "USER", "USING", "VERBOSE", "WALLET", "WHEN", "WHERE",
    "WITH", "WITHOUT",
];

pub fn is_reserved_word(name: &str) -> bool {
    let upper = name.to_uppercase();
    RESERVED_WORDS.contains(&upper.as_str())
}

/// Rewrites raw column names into unique, lower-case, non-reserved
/// identifiers, one per input position.
///
/// Names are lower-cased and stripped of spaces; empty or reserved names
/// become `col_{index}`; digit-leading names gain an `x_` prefix; names are
/// cut to [`MAX_IDENTIFIER_CHARS`]; duplicates gain an `_{index}` suffix.
pub fn sanitize_column_names<S>(columns: &[S], sink: &mut impl DiagnosticSink) -> Vec<String>
where
    S: AsRef<str>,
{
    let mut clean = Vec::with_capacity(columns.len());
    let mut seen = HashSet::with_capacity(columns.len());

    for (idx, raw) in columns.iter().enumerate() {
        let raw = raw.as_ref();
        let mut name = raw.to_lowercase().replace(' ', "");
        let mut rename = |name: &mut String, to: String, reason| {
            sink.record(Advisory::Renamed {
                index: idx,
                from: std::mem::take(name),
                to: to.clone(),
                reason,
            });
            *name = to;
        };

        if name.is_empty() {
            rename(&mut name, format!("col_{idx}"), RenameReason::Empty);
        }
        if is_reserved_word(&name) {
            rename(&mut name, format!("col_{idx}"), RenameReason::Reserved);
        }
        if name.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
            let prefixed = format!("x_{name}");
            rename(&mut name, prefixed, RenameReason::LeadingDigit);
        }
        if name.chars().count() > MAX_IDENTIFIER_CHARS {
            let truncated = truncate_chars(&name, MAX_IDENTIFIER_CHARS);
            rename(&mut name, truncated, RenameReason::Truncated);
        }
        if seen.contains(&name) {
            let unique = dedupe(&name, idx, &seen);
            rename(&mut name, unique, RenameReason::Duplicate);
        }

        seen.insert(name.clone());
        clean.push(name);
    }

    clean
}

// A suffixed name can itself be taken (`a`, `a_2`, `a` at index 2), so
// `_{idx}` falls back to `_{idx}_1`, `_{idx}_2`, ... Every attempt cuts the
// original name so the whole candidate fits the identifier limit.
fn dedupe(name: &str, idx: usize, seen: &HashSet<String>) -> String {
    let base_suffix = format!("_{idx}");
    (0usize..)
        .map(|attempt| match attempt {
            0 => base_suffix.clone(),
            n => format!("{base_suffix}_{n}"),
        })
        .map(|suffix| {
            let room = MAX_IDENTIFIER_CHARS.saturating_sub(suffix.len());
            format!("{}{suffix}", truncate_chars(name, room))
        })
        .find(|candidate| !seen.contains(candidate))
        .unwrap_or_else(|| format!("{name}{base_suffix}"))
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sanitize(columns: &[&str]) -> Vec<String> {
        let mut sink: Vec<Advisory> = Vec::new();
        sanitize_column_names(columns, &mut sink)
    }

    #[test]
    fn lowercases_and_strips_spaces() {
        assert_eq!(sanitize(&["Order ID", "First Name"]), vec!["orderid", "firstname"]);
    }

    #[test]
    fn empty_and_reserved_names_become_positional() {
        assert_eq!(
            sanitize(&["id", "", "Select", "  "]),
            vec!["id", "col_1", "col_2", "col_3"]
        );
    }

    #[test]
    fn digit_leading_names_are_prefixed() {
        assert_eq!(sanitize(&["1st col", "2024"]), vec!["x_1stcol", "x_2024"]);
    }

    #[test]
    fn duplicates_take_their_index() {
        assert_eq!(
            sanitize(&["Order ID", "orderid", "ORDER id"]),
            vec!["orderid", "orderid_1", "orderid_2"]
        );
    }

    #[test]
    fn suffix_repeats_when_suffixed_name_is_taken() {
        assert_eq!(sanitize(&["a", "a_2", "a"]), vec!["a", "a_2", "a_2_1"]);
        assert_eq!(
            sanitize(&["a", "a_3", "a_3_1", "a"]),
            vec!["a", "a_3", "a_3_1", "a_3_2"]
        );
    }

    #[test]
    fn suffix_fallback_terminates_at_identifier_limit() {
        let full = "x".repeat(120);
        let taken = format!("{}_2", "x".repeat(118));
        let cleaned = sanitize(&[full.as_str(), taken.as_str(), full.as_str()]);
        assert_eq!(cleaned[0], full);
        assert_eq!(cleaned[1], taken);
        assert_eq!(cleaned[2], format!("{}_2_1", "x".repeat(116)));
        assert_eq!(cleaned[2].chars().count(), MAX_IDENTIFIER_CHARS);
    }

    #[test]
    fn only_ascii_digits_force_a_prefix() {
        assert_eq!(sanitize(&["½cup", "Ⅻ", "7up"]), vec!["½cup", "ⅻ", "x_7up"]);
    }

    #[test]
    fn long_names_are_truncated_before_dedupe() {
        let long = "x".repeat(150);
        let cleaned = sanitize(&[long.as_str(), long.as_str()]);
        assert_eq!(cleaned[0].chars().count(), MAX_IDENTIFIER_CHARS);
        assert_eq!(cleaned[1].chars().count(), MAX_IDENTIFIER_CHARS);
        assert!(cleaned[1].ends_with("_1"));
        assert_ne!(cleaned[0], cleaned[1]);
    }

    #[test]
    fn renames_are_reported_with_reasons() {
        let mut sink: Vec<Advisory> = Vec::new();
        let long = "n".repeat(MAX_IDENTIFIER_CHARS + 1);
        sanitize_column_names(&["", "from", "9lives", long.as_str(), "ok", "ok"], &mut sink);
        let reasons: Vec<RenameReason> = sink
            .iter()
            .filter_map(|advisory| match advisory {
                Advisory::Renamed { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                RenameReason::Empty,
                RenameReason::Reserved,
                RenameReason::LeadingDigit,
                RenameReason::Truncated,
                RenameReason::Duplicate,
            ]
        );
        assert!(sink.contains(&Advisory::Renamed {
            index: 3,
            from: long.clone(),
            to: "n".repeat(MAX_IDENTIFIER_CHARS),
            reason: RenameReason::Truncated,
        }));
    }

    #[test]
    fn reserved_lookup_ignores_case() {
        assert!(is_reserved_word("timestamp"));
        assert!(is_reserved_word("Current_Date"));
        assert!(!is_reserved_word("timestamps"));
    }

    proptest! {
        #[test]
        fn sanitized_names_hold_identifier_invariants(
            columns in proptest::collection::vec("[a-zA-Z0-9 _]{0,140}", 0..12)
        ) {
            let cleaned = sanitize(&columns.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(cleaned.len(), columns.len());
            let unique: HashSet<&String> = cleaned.iter().collect();
            prop_assert_eq!(unique.len(), cleaned.len());
            for name in &cleaned {
                prop_assert!(!name.is_empty());
                prop_assert!(!is_reserved_word(name));
                prop_assert!(!name.starts_with(|c: char| c.is_ascii_digit()));
                prop_assert!(name.chars().count() <= MAX_IDENTIFIER_CHARS);
            }
        }

        #[test]
        fn sanitizing_is_idempotent(
            columns in proptest::collection::vec("[a-zA-Z0-9 _]{0,140}", 0..12)
        ) {
            let once = sanitize(&columns.iter().map(String::as_str).collect::<Vec<_>>());
            let twice = sanitize(&once.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(once, twice);
        }
    }
}
