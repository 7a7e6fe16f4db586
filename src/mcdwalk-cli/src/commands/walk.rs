//! Walk command
//!
//! Opens the dump, enumerates every top-level record, and writes the
//! decoded document. A table preview is printed whenever columns are
//! configured, either in the walk file, with `--columns`, or with `--table`.

use crate::cli::WalkArgs;
use anyhow::{bail, Context, Result};
use mcdwalk::{enumerate_roots, serialize, DumpFile, RootRecord, WalkConfig};

/// Apply command-line overrides on top of the loaded configuration
fn resolve_config(args: &WalkArgs) -> Result<WalkConfig> {
    let mut config = WalkConfig::load(&args.config)
        .with_context(|| format!("Invalid walk configuration {}", args.config.display()))?;

    if let Some(base) = args.base {
        config = config.with_base_address(base);
    }
    if let Some(max_records) = args.max_records {
        config = config.with_max_records(max_records);
    }
    if !args.columns.is_empty() {
        config = config.with_table(args.columns.clone());
    }
    if args.table && config.table.is_empty() {
        let columns = config.schema.fields.iter().map(|f| f.name.clone()).collect();
        config = config.with_table(columns);
    }

    config.validate().context("Invalid command-line overrides")?;
    Ok(config)
}

/// Handle the Walk command
pub fn handle(args: WalkArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let Some(dump_path) = args.dump.clone().or_else(|| config.dump.clone()) else {
        bail!("No dump file given (use --dump or set `dump` in the configuration)");
    };
    let dump = DumpFile::open(&dump_path)
        .with_context(|| format!("Failed to open dump file {}", dump_path.display()))?;

    let records = enumerate_roots(&dump, &config).context("Failed to walk records")?;

    let output = args.output.as_ref().or(config.output.as_ref());
    match output {
        Some(output) => {
            serialize::write_json(output, &records)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            eprintln!("- dump json: {}", output.display());
        }
        None => println!("{}", serialize::to_json_string(&records)?),
    }

    // stdout carries only the document when no output file is set
    if let Some(table) = table_preview(&records, &config)? {
        if output.is_some() {
            print!("{}", table);
        } else {
            eprint!("{}", table);
        }
    }

    Ok(())
}

/// Table over the configured columns, if any were declared
fn table_preview(records: &[RootRecord], config: &WalkConfig) -> Result<Option<String>> {
    if config.table.is_empty() {
        return Ok(None);
    }
    Ok(Some(serialize::render_table(records, &config.table)?))
}
