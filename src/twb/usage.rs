//! Flat column-usage log across every worksheet of a document.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::twb::{NAME_KEY, ROLE_KEY};
use crate::xml::NodeExt;

/// Where a column name was referenced.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum UsageKind {
    #[serde(rename = "Visual Encoding")]
    VisualEncoding,
    #[serde(rename = "Column Definition")]
    ColumnDefinition,
    Calculation,
}

/// One place a column name is referenced on a worksheet. Usage is cumulative:
/// the same (sheet, column) pair may appear many times and is never
/// deduplicated.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct ColumnUsage {
    pub sheet_name: String,
    pub column_name: String,
    pub usage: UsageKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    /// Encoding type (color, size, ...) for visual-encoding usages.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub encoding_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub formula: Option<String>,
}

/// Scans every worksheet in document order and returns the flat usage log.
///
/// Within a worksheet the ordering is contractual: visual encodings first,
/// then column definitions, then calculations. Encodings with an empty
/// `field` and columns with an empty `name` are skipped silently; the
/// worksheet name is propagated even when it is itself empty.
pub fn scan_column_usage(doc: &Document) -> Vec<ColumnUsage> {
    let mut usages = vec![];
    for worksheet in doc.root_element().tagged_descendants("worksheet") {
        let sheet_name = worksheet.attr(NAME_KEY);
        collect_encodings(worksheet, &sheet_name, &mut usages);
        collect_definitions(worksheet, &sheet_name, &mut usages);
        collect_calculations(worksheet, &sheet_name, &mut usages);
    }
    usages
}

fn collect_encodings(worksheet: Node, sheet_name: &str, usages: &mut Vec<ColumnUsage>) {
    for encoding in worksheet.tagged_descendants("encoding") {
        let field = encoding.attr("field");
        if field.is_empty() {
            continue;
        }
        usages.push(ColumnUsage {
            sheet_name: sheet_name.to_owned(),
            column_name: field,
            usage: UsageKind::VisualEncoding,
            role: encoding.opt_attr(ROLE_KEY),
            encoding_type: encoding.opt_attr("type"),
            formula: None,
        });
    }
}

fn collect_definitions(worksheet: Node, sheet_name: &str, usages: &mut Vec<ColumnUsage>) {
    for column in worksheet.tagged_descendants("column") {
        let name = column.attr(NAME_KEY);
        if name.is_empty() {
            continue;
        }
        usages.push(ColumnUsage {
            sheet_name: sheet_name.to_owned(),
            column_name: name,
            usage: UsageKind::ColumnDefinition,
            role: column.opt_attr(ROLE_KEY),
            encoding_type: None,
            formula: None,
        });
    }
}

fn collect_calculations(worksheet: Node, sheet_name: &str, usages: &mut Vec<ColumnUsage>) {
    for calc in worksheet.tagged_descendants("calculation") {
        usages.push(ColumnUsage {
            sheet_name: sheet_name.to_owned(),
            column_name: calc.attr(NAME_KEY),
            usage: UsageKind::Calculation,
            role: None,
            encoding_type: None,
            formula: Some(calc.all_text()),
        });
    }
}

/// Filters a usage log down to one worksheet and column: sheet name matched
/// case-insensitively by equality, column name case-insensitively by
/// substring.
pub fn usage_for_sheet_column<'a>(
    usages: &'a [ColumnUsage],
    sheet_name: &str,
    column_name: &str,
) -> Vec<&'a ColumnUsage> {
    let column_lower = column_name.to_lowercase();
    usages
        .iter()
        .filter(|u| u.sheet_name.eq_ignore_ascii_case(sheet_name))
        .filter(|u| u.column_name.to_lowercase().contains(&column_lower))
        .collect()
}
