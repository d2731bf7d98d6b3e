//! Loading delimited files into a [`Table`] and writing generated text.
//!
//! - **Delimiter resolution**: `.tsv` inputs default to tab, everything else
//!   to comma, unless overridden.
//! - **Encoding**: input bytes are decoded via `encoding_rs`, defaulting to
//!   UTF-8.
//! - **stdin/stdout**: the `-` path reads stdin; a missing output path writes
//!   to stdout.

use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::tabular::Table;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(reader)
}

pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(Box::new(BufReader::new(file)))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Reads a delimited stream whose first record is the header row. Every
/// field is kept as text.
pub fn read_table_from_reader<R>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Table>
where
    R: Read,
{
    let mut reader = open_csv_reader(reader, delimiter);
    let headers = decode_record(reader.byte_headers()?, encoding)
        .context("Decoding header row")?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        // Line numbers count the header as line 1.
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        rows.push(decoded);
    }
    debug!("Read {} row(s) with {} column(s)", rows.len(), headers.len());

    Ok(Table::from_text_rows(headers, rows)?)
}

pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let input = open_input(path)?;
    read_table_from_reader(input, delimiter, encoding)
        .with_context(|| format!("Reading table from {path:?}"))
}

/// Writes `contents` plus a trailing newline to `path`, or stdout when no
/// path (or `-`) is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(p) if !is_dash(p) => {
            let mut file =
                File::create(p).with_context(|| format!("Creating output file {p:?}"))?;
            writeln!(file, "{contents}").with_context(|| format!("Writing {p:?}"))?;
        }
        _ => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{contents}").context("Writing to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.TSV"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn unknown_encoding_label_is_an_error() {
        assert!(resolve_encoding(Some("not-a-charset")).is_err());
        assert_eq!(resolve_encoding(None).expect("default"), UTF_8);
        assert_eq!(
            resolve_encoding(Some(" windows-1252 ")).expect("label"),
            WINDOWS_1252
        );
    }

    #[test]
    fn reads_header_and_text_rows() {
        let input = "id,name\n1,Ann\n2,\n";
        let table = read_table_from_reader(input.as_bytes(), b',', UTF_8).expect("table");
        assert_eq!(table.headers(), &["id", "name"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows()[1][1].as_text(), Some(""));
    }

    #[test]
    fn decodes_legacy_encodings() {
        let (encoded, _, _) = WINDOWS_1252.encode("name\nCaf\u{e9}\n");
        let table = read_table_from_reader(&encoded[..], b',', WINDOWS_1252).expect("table");
        assert_eq!(table.rows()[0][0].as_text(), Some("Caf\u{e9}"));
    }

    #[test]
    fn ragged_input_is_reported() {
        let input = "a,b\n1,2\n3\n";
        let err = read_table_from_reader(input.as_bytes(), b',', UTF_8).unwrap_err();
        assert!(format!("{err:#}").contains("Reading row 3"));
    }
}
