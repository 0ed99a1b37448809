//! Dashboard extraction: size, parameters, and zone views resolved against
//! the workbook's worksheets.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::twb::column::SheetColumn;
use crate::twb::worksheet::extract_columns;
use crate::twb::NAME_KEY;
use crate::xml::NodeExt;

/// A layout composing multiple worksheets.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct Dashboard {
    pub name: String,
    pub size: Size,
    pub views: Vec<View>,
    pub parameters: Vec<String>,
}

/// Dashboard dimensions, kept as free text: Tableau allows non-numeric
/// sizing tokens.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct Size {
    pub width: String,
    pub height: String,
}

/// One zone placement referencing a worksheet by name. The column list is a
/// snapshot of the worksheet taken at build time, not a live reference.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct View {
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: String,
    pub worksheet_name: String,
    pub used_columns: Vec<SheetColumn>,
}

/// Builds every dashboard, resolving each zone's `worksheet` attribute
/// against the workbook's worksheet elements (first match by name). A zone
/// naming a worksheet that does not exist yields a view with an empty column
/// list rather than an error. Zones without a worksheet attribute are not
/// views and are skipped.
pub(crate) fn parse_dashboards(root: Node) -> Vec<Dashboard> {
    root.tagged_descendants("dashboard")
        .into_iter()
        .map(|d| parse_dashboard(d, root))
        .collect()
}

fn parse_dashboard(n: Node, root: Node) -> Dashboard {
    let views = n
        .tagged_descendants("zone")
        .into_iter()
        .filter_map(|zone| {
            let worksheet_name = zone.attr("worksheet");
            if worksheet_name.is_empty() {
                return None;
            }
            let worksheet = root
                .tagged_descendants("worksheet")
                .into_iter()
                .find(|w| w.attr(NAME_KEY) == worksheet_name);
            Some(View {
                name: zone.opt_attr(NAME_KEY).unwrap_or_else(|| worksheet_name.clone()),
                view_type: zone
                    .opt_attr("type")
                    .unwrap_or_else(|| "worksheet".to_owned()),
                used_columns: worksheet.map(extract_columns).unwrap_or_default(),
                worksheet_name,
            })
        })
        .collect();

    Dashboard {
        name: n.attr(NAME_KEY),
        size: Size {
            width: n.attr("maxwidth"),
            height: n.attr("maxheight"),
        },
        views,
        parameters: n
            .tagged_descendants("parameter")
            .iter()
            .filter_map(|p| p.opt_attr(NAME_KEY))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const DASH_XML: &str = r#"
    <workbook>
      <worksheets>
        <worksheet name="Sales">
          <column name="[Amount]" datatype="real"/>
        </worksheet>
      </worksheets>
      <dashboards>
        <dashboard name="Overview" maxwidth="1200" maxheight="800">
          <parameter name="Region Param"/>
          <zones>
            <zone name="Sales zone" type="layout-basic" worksheet="Sales"/>
            <zone worksheet="Missing Sheet"/>
            <zone name="Filler" type="text"/>
          </zones>
        </dashboard>
      </dashboards>
    </workbook>"#;

    #[test]
    fn test_dashboard_shape() {
        let doc = Document::parse(DASH_XML).unwrap();
        let dashboards = parse_dashboards(doc.root_element());
        assert_eq!(1, dashboards.len());

        let dash = &dashboards[0];
        assert_eq!("Overview", dash.name);
        assert_eq!("1200", dash.size.width);
        assert_eq!("800", dash.size.height);
        assert_eq!(vec!["Region Param"], dash.parameters);
        // zone without a worksheet attribute is not a view
        assert_eq!(2, dash.views.len());
    }

    #[test]
    fn test_zone_resolves_worksheet_columns() {
        let doc = Document::parse(DASH_XML).unwrap();
        let dash = &parse_dashboards(doc.root_element())[0];

        let resolved = &dash.views[0];
        assert_eq!("Sales zone", resolved.name);
        assert_eq!("layout-basic", resolved.view_type);
        assert_eq!("Sales", resolved.worksheet_name);
        assert_eq!(1, resolved.used_columns.len());
        assert_eq!("[Amount]", resolved.used_columns[0].name);
    }

    #[test]
    fn test_zone_with_missing_worksheet_yields_empty_view() {
        let doc = Document::parse(DASH_XML).unwrap();
        let dash = &parse_dashboards(doc.root_element())[0];

        let missing = &dash.views[1];
        // name falls back to the worksheet reference, type to "worksheet"
        assert_eq!("Missing Sheet", missing.name);
        assert_eq!("worksheet", missing.view_type);
        assert!(missing.used_columns.is_empty());
    }
}
