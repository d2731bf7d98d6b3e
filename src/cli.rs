use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate Redshift table definitions from CSV data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer a `create table` statement for a CSV file
    Create(CreateArgs),
    /// Show sanitized column names, inferred types and byte widths
    Profile(ProfileArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Input CSV file with a header row (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Table name interpolated into the statement
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Destination file for the statement (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Fraction added to every varchar width, e.g. 0.2 for 20%
    #[arg(long)]
    pub padding: Option<f64>,
    /// Distribution key column
    #[arg(long)]
    pub distkey: Option<String>,
    /// Sort key column
    #[arg(long)]
    pub sortkey: Option<String>,
    /// Columns whose varchar width is forced to the maximum (65535)
    #[arg(long = "varchar-max", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub varchar_max: Vec<String>,
    /// Keep widths above 65535 instead of clamping them
    #[arg(long = "no-truncate")]
    pub no_truncate: bool,
    /// Round varchar widths up to the next standard step
    #[arg(long = "round-widths")]
    pub round_widths: bool,
    /// Column type overrides of the form `column:type`
    #[arg(long = "column-type", action = clap::ArgAction::Append)]
    pub column_types: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Input CSV file with a header row (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Report format
    #[arg(long, value_enum, default_value = "table")]
    pub format: ReportFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
