//! Worksheet extraction: used columns, filters, dependencies.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::ensure_tag_or_default;
use crate::twb::column::{calculated_column, SheetColumn};
use crate::twb::NAME_KEY;
use crate::xml::NodeExt;

/// A single visualization unit. The name is unique within the workbook and
/// serves as the lookup key for dashboard zones.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<SheetColumn>,
    pub filters: Vec<Filter>,
    /// Names of other sheets or datasources this sheet requires.
    pub dependencies: Vec<String>,
}

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct Filter {
    pub field: String,
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Literal value or expression, taken from the element text.
    pub value: String,
}

impl<'a, 'b> From<Node<'a, 'b>> for Filter {
    fn from(n: Node) -> Self {
        ensure_tag_or_default!(n, "filter");
        Self {
            field: n.attr("field"),
            filter_type: n.attr("type"),
            value: n.all_text(),
        }
    }
}

impl<'a, 'b> From<Node<'a, 'b>> for Sheet {
    fn from(n: Node) -> Self {
        ensure_tag_or_default!(n, "worksheet");
        Self {
            name: n.attr(NAME_KEY),
            columns: extract_columns(n),
            filters: n
                .tagged_descendants("filter")
                .into_iter()
                .map(Filter::from)
                .collect(),
            dependencies: n
                .tagged_descendants("dependency")
                .iter()
                .filter_map(|d| d.opt_attr(NAME_KEY))
                .collect(),
        }
    }
}

/// Columns referenced by a worksheet: every descendant `column` element plus
/// a synthesized pseudo-column for every descendant `calculation` element.
/// Dashboard views call this too, to snapshot a worksheet's column list.
pub(crate) fn extract_columns(worksheet: Node) -> Vec<SheetColumn> {
    let mut columns: Vec<SheetColumn> = worksheet
        .tagged_descendants("column")
        .into_iter()
        .map(SheetColumn::from)
        .collect();
    columns.extend(
        worksheet
            .tagged_descendants("calculation")
            .into_iter()
            .map(calculated_column),
    );
    columns
}

pub(crate) fn parse_sheets(root: Node) -> Vec<Sheet> {
    root.tagged_descendants("worksheet")
        .into_iter()
        .map(Sheet::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twb::column::CALCULATED_DATATYPE;
    use roxmltree::Document;

    const SHEET_XML: &str = r#"
    <workbook>
      <worksheets>
        <worksheet name="Sales by Region">
          <table>
            <view>
              <datasource-dependencies datasource="sales">
                <column name="[Amount]" datatype="real" role="measure"/>
                <column name="[Region]" datatype="string" role="dimension"/>
              </datasource-dependencies>
              <filter field="[Region]" type="categorical">West</filter>
            </view>
            <calculation name="CalcA">[Amount]*2</calculation>
          </table>
          <dependency name="Base Sheet"/>
        </worksheet>
      </worksheets>
    </workbook>"#;

    #[test]
    fn test_sheet_collects_columns_and_calculations() {
        let doc = Document::parse(SHEET_XML).unwrap();
        let sheets = parse_sheets(doc.root_element());
        assert_eq!(1, sheets.len());

        let sheet = &sheets[0];
        assert_eq!("Sales by Region", sheet.name);
        assert_eq!(3, sheet.columns.len());
        // declared columns first, synthesized calculations after
        assert_eq!("[Amount]", sheet.columns[0].name);
        assert_eq!("CalcA", sheet.columns[2].name);
        assert_eq!(CALCULATED_DATATYPE, sheet.columns[2].datatype);
        assert_eq!(vec!["[Amount]*2"], sheet.columns[2].calculations);
    }

    #[test]
    fn test_sheet_filters_and_dependencies() {
        let doc = Document::parse(SHEET_XML).unwrap();
        let sheets = parse_sheets(doc.root_element());
        let sheet = &sheets[0];

        assert_eq!(1, sheet.filters.len());
        let filter = &sheet.filters[0];
        assert_eq!("[Region]", filter.field);
        assert_eq!("categorical", filter.filter_type);
        assert_eq!("West", filter.value);

        assert_eq!(vec!["Base Sheet"], sheet.dependencies);
    }

    #[test]
    fn test_unnamed_worksheet_keeps_empty_name() {
        let doc = Document::parse("<workbook><worksheet/></workbook>").unwrap();
        let sheets = parse_sheets(doc.root_element());
        assert_eq!("", sheets[0].name);
    }
}
