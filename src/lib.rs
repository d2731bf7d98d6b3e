pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod identifiers;
pub mod inference;
pub mod io_utils;
pub mod report;
pub mod statement;
pub mod tabular;
pub mod width;

use std::{collections::BTreeMap, env, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::cli::{Cli, Commands, ReportFormat};

pub use crate::diagnostics::{Advisory, DiagnosticSink, LogSink, RenameReason};
pub use crate::error::{DdlError, DdlResult};
pub use crate::identifiers::sanitize_column_names;
pub use crate::inference::{ColumnProfile, RedshiftType, profile_columns};
pub use crate::statement::{CreateTableOptions, TableDefinition, create_statement};
pub use crate::tabular::{Table, Value};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("redshift_ddl", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Create(args) => handle_create(&args),
        Commands::Profile(args) => handle_profile(&args),
    }
}

fn handle_create(args: &cli::CreateArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Generating table '{}' from '{}' with delimiter '{}'",
        args.table,
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let column_types = parse_column_types(&args.column_types)
        .context("Parsing --column-type overrides")?;
    let options = CreateTableOptions {
        padding: args.padding,
        distkey: args.distkey.clone(),
        sortkey: args.sortkey.clone(),
        varchar_max: args
            .varchar_max
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect(),
        varchar_truncate: !args.no_truncate,
        round_to_steps: args.round_widths,
        column_types,
    };
    debug!("Create options: {:?}", options);

    let mut table = io_utils::read_table(&args.input, delimiter, encoding)?;
    let definition = create_statement(&mut table, &args.table, &options)
        .with_context(|| format!("Generating table definition for {:?}", args.input))?;
    io_utils::write_output(args.output.as_deref(), &definition.sql)?;
    info!(
        "Defined {} column(s) from {} row(s) for table '{}'",
        definition.columns.len(),
        table.num_rows(),
        args.table
    );
    Ok(())
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Profiling '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let mut table = io_utils::read_table(&args.input, delimiter, encoding)?;
    let headers = sanitize_column_names(table.headers(), &mut LogSink);
    table.set_headers(headers);
    let profiles = profile_columns(&table);
    let rendered = match args.format {
        ReportFormat::Table => report::render_profiles(&profiles),
        ReportFormat::Json => report::render_profiles_json(&profiles, table.num_rows())?,
    };
    io_utils::write_output(None, rendered.trim_end())?;
    Ok(())
}

/// Parses repeated `column:type` overrides. Column names are matched after
/// sanitization, so they are compared as given.
fn parse_column_types(specs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut overrides = BTreeMap::new();
    for token in specs.iter().map(|spec| spec.trim()).filter(|t| !t.is_empty()) {
        let (name, ty) = token
            .split_once(':')
            .ok_or_else(|| anyhow!("Column type '{token}' must use the form column:type"))?;
        let (name, ty) = (name.trim(), ty.trim());
        if name.is_empty() || ty.is_empty() {
            return Err(anyhow!(
                "Column type '{token}' needs both a column name and a type"
            ));
        }
        if overrides.insert(name.to_string(), ty.to_string()).is_some() {
            return Err(anyhow!("Duplicate column type override for '{name}'"));
        }
    }
    Ok(overrides)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
