//! Extracts metadata reports from a Tableau workbook file.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use roxmltree::Document;
use tracing::warn;

use tableau_metadata::report::json::write_json_report;
use tableau_metadata::report::spreadsheet::write_connection_report;
use tableau_metadata::twb::catalog::build_column_catalog;
use tableau_metadata::twb::connection::resolve_connections;
use tableau_metadata::twb::mapper::map_worksheets_to_datasources;
use tableau_metadata::twb::usage::scan_column_usage;
use tableau_metadata::twb::WorkbookModel;
use tableau_metadata::values::resolve_data_source;

#[derive(Parser, Debug)]
#[command(name = "twbmeta", about = "Extract metadata reports from a Tableau workbook")]
struct Args {
    /// Path to the .twb workbook file
    input: PathBuf,

    /// Directory to write the reports into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let doc = Document::parse(&content)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_owned());
    let out = |suffix: &str| args.out_dir.join(format!("{stem}.{suffix}"));

    let model = WorkbookModel::from_document(&doc);
    write_json_report(&model, &out("model.json"))?;

    match resolve_connections(&doc) {
        Ok(connections) => {
            write_json_report(&connections, &out("connections.json"))?;
            write_connection_report(&connections, &out("connections.xlsx"))?;
        }
        Err(e) => warn!("skipping connection reports: {e}"),
    }

    let catalog = build_column_catalog(&doc);
    write_json_report(&catalog, &out("catalog.json"))?;

    let usage = scan_column_usage(&doc);
    write_json_report(&usage, &out("usage.json"))?;

    let mapping = map_worksheets_to_datasources(&doc);
    write_json_report(&mapping, &out("mapping.json"))?;

    let source = resolve_data_source(&doc);
    write_json_report(&source, &out("sources.json"))?;

    Ok(())
}
