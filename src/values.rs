//! Pulls actual data values for catalogued columns out of a workbook's
//! backing source.
//!
//! Excel-backed workbooks are read directly from the referenced file.
//! SQL-backed workbooks get a `SELECT` statement built for the caller to run
//! against their own connection; no database driver ships here.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context};
use calamine::{open_workbook, Reader, Xlsx};
use itertools::Itertools;
use roxmltree::Document;
use serde::{Deserialize, Serialize};

use crate::xml::NodeExt;

/// What kind of physical source backs the workbook's first connection.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub enum SourceKind {
    Excel,
    Sql,
    #[default]
    Unknown,
}

/// The resolved backing source of a workbook: its kind, the file it reads
/// from (Excel only), and the relation it selects from.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct DataSourceInfo {
    pub kind: SourceKind,
    pub file_path: Option<String>,
    pub table: Option<String>,
}

/// Inspects the document's first named connection and reports what backs it.
///
/// An `excel-direct` connection yields [`SourceKind::Excel`] with the
/// workbook-relative file path (the `directory` attribute joined to
/// `filename` when present). A `sqlserver` connection yields
/// [`SourceKind::Sql`]. Anything else, including a workbook with no named
/// connection, is [`SourceKind::Unknown`]. The table comes from the first
/// `relation` element's `table` attribute in either case.
pub fn resolve_data_source(doc: &Document) -> DataSourceInfo {
    let root = doc.root_element();
    let Some(named) = root.tagged_descendant("named-connection") else {
        return DataSourceInfo::default();
    };
    let nested = named.tagged_descendant("connection");
    let class = nested.map(|c| c.attr("class")).unwrap_or_default();
    let table = root
        .tagged_descendant("relation")
        .and_then(|r| r.opt_attr("table"));

    match class.as_str() {
        "excel-direct" => {
            let file_path = nested.and_then(|c| {
                let filename = c.opt_attr("filename")?;
                Some(match c.opt_attr("directory") {
                    Some(dir) => format!("{dir}/{filename}"),
                    None => filename,
                })
            });
            DataSourceInfo {
                kind: SourceKind::Excel,
                file_path,
                table,
            }
        }
        "sqlserver" => DataSourceInfo {
            kind: SourceKind::Sql,
            file_path: None,
            table,
        },
        _ => DataSourceInfo {
            kind: SourceKind::Unknown,
            file_path: None,
            table,
        },
    }
}

/// Reads the requested columns from the first sheet of an Excel file.
///
/// Header cells are matched against the requested names in their bracketed
/// `[Column]` form. Every requested column gets an entry in the result, empty
/// when the header row does not carry it. Cell values are rendered with their
/// display formatting.
pub fn extract_excel_values(
    path: &Path,
    columns: &[String],
) -> anyhow::Result<HashMap<String, Vec<String>>> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("opening {}", path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook {} has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet {sheet_name}"))?;

    let mut values: HashMap<String, Vec<String>> =
        columns.iter().map(|c| (c.clone(), vec![])).collect();

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(values);
    };
    // column index in the sheet -> requested name
    let wanted: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let bracketed = format!("[{cell}]");
            columns.contains(&bracketed).then_some((i, bracketed))
        })
        .collect();

    for row in rows {
        for (i, name) in &wanted {
            if let Some(cell) = row.get(*i) {
                if let Some(column) = values.get_mut(name) {
                    column.push(cell.to_string());
                }
            }
        }
    }
    Ok(values)
}

/// Like [`extract_excel_values`] but keeps only cells that parse as numbers.
pub fn extract_numeric_values(
    path: &Path,
    columns: &[String],
) -> anyhow::Result<HashMap<String, Vec<f64>>> {
    let values = extract_excel_values(path, columns)?;
    Ok(values
        .into_iter()
        .map(|(name, cells)| {
            let numbers = cells
                .iter()
                .filter_map(|cell| cell.parse::<f64>().ok())
                .collect();
            (name, numbers)
        })
        .collect())
}

/// Builds a `SELECT` statement for the given columns against a table.
/// Column names are unbracketed before use.
pub fn sql_select_statement(table: &str, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| c.trim_matches(['[', ']']))
        .join(", ");
    format!("SELECT {column_list} FROM {table}")
}
