//! Formatted xlsx reports over connection and lineage data.

use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::api::SheetLineage;
use crate::twb::connection::DatasourceInfo;

/// Writes the connection report: one row per table, with the connection's
/// cells merged vertically across its tables.
pub fn write_connection_report(info: &DatasourceInfo, path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("DataSourceInfo")?;

    let bold = Format::new().set_bold();
    let merged = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    sheet.write_string_with_format(0, 0, "Data Source(s)", &bold)?;
    sheet.write_string_with_format(0, 1, "Connection Info", &bold)?;
    sheet.write_string_with_format(0, 2, "Data Table(s)", &bold)?;
    sheet.write_string_with_format(0, 3, "Column(s)", &bold)?;

    let mut row: u32 = 1;
    for conn in &info.connections {
        if conn.tables.is_empty() {
            sheet.write_string(row, 0, &conn.connection_type)?;
            sheet.write_string(row, 1, &conn.connection_string)?;
            sheet.write_string(row, 2, "No tables found")?;
            sheet.write_string(row, 3, "No columns found")?;
            row += 1;
            continue;
        }

        let first = row;
        for table in &conn.tables {
            sheet.write_string(row, 2, &table.table_name)?;
            sheet.write_string(row, 3, &table.columns.iter().join(", "))?;
            row += 1;
        }
        let last = row - 1;
        if conn.tables.len() > 1 {
            // merge_range rejects single-cell ranges
            sheet.merge_range(first, 0, last, 0, &conn.connection_type, &merged)?;
            sheet.merge_range(first, 1, last, 1, &conn.connection_string, &merged)?;
        } else {
            sheet.write_string_with_format(first, 0, &conn.connection_type, &merged)?;
            sheet.write_string_with_format(first, 1, &conn.connection_string, &merged)?;
        }
    }

    sheet.autofit();
    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Writes the visualization lineage report: one row per worksheet.
pub fn write_visualization_report(rows: &[SheetLineage], path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Visualizations")?;

    let bold = Format::new().set_bold();
    sheet.write_string_with_format(0, 0, "Worksheet Name", &bold)?;
    sheet.write_string_with_format(0, 1, "Visualization Title", &bold)?;
    sheet.write_string_with_format(0, 2, "Visualization Type", &bold)?;
    sheet.write_string_with_format(0, 3, "Tables Used", &bold)?;
    sheet.write_string_with_format(0, 4, "Columns Used", &bold)?;

    for (i, lineage) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &lineage.worksheet_name)?;
        sheet.write_string(row, 1, &lineage.visualization_title)?;
        sheet.write_string(row, 2, &lineage.visualization_type)?;
        sheet.write_string(row, 3, &lineage.tables_used)?;
        sheet.write_string(row, 4, &lineage.columns_used)?;
    }

    sheet.autofit();
    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
