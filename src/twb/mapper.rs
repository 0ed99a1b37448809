//! Maps each worksheet to the datasource it draws from and the columns it
//! references.

use std::collections::HashMap;

use roxmltree::Document;
use serde::{Deserialize, Serialize};

use crate::twb::NAME_KEY;
use crate::xml::NodeExt;

/// A worksheet's datasource binding and the column references under it.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct VisualizationSource {
    pub worksheet_name: String,
    pub datasource_id: Option<String>,
    pub used_columns: Vec<String>,
}

/// Builds a worksheet-name to source mapping for every worksheet in the
/// document.
///
/// The datasource id comes from the worksheet's first
/// `datasource-dependencies` element; a worksheet without one maps to `None`.
/// Used columns are the non-empty `name` attributes of all column elements
/// under the worksheet, in document order and not deduplicated. When two
/// worksheets share a name the later one in document order wins.
pub fn map_worksheets_to_datasources(doc: &Document) -> HashMap<String, VisualizationSource> {
    let mut mapping = HashMap::new();
    for worksheet in doc.root_element().tagged_descendants("worksheet") {
        let worksheet_name = worksheet.attr(NAME_KEY);
        let datasource_id = worksheet
            .tagged_descendant("datasource-dependencies")
            .and_then(|deps| deps.opt_attr("datasource"));
        let used_columns = worksheet
            .tagged_descendants("column")
            .into_iter()
            .map(|col| col.attr(NAME_KEY))
            .filter(|name| !name.is_empty())
            .collect();
        mapping.insert(
            worksheet_name.clone(),
            VisualizationSource {
                worksheet_name,
                datasource_id,
                used_columns,
            },
        );
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP_XML: &str = r#"
    <workbook>
      <worksheets>
        <worksheet name="Sales by Region">
          <datasource-dependencies datasource="federated.0xyz">
            <column name="[Sales]"/>
            <column name="[Region]"/>
            <column name="[Sales]"/>
            <column/>
          </datasource-dependencies>
        </worksheet>
        <worksheet name="Detail">
          <table/>
        </worksheet>
      </worksheets>
    </workbook>"#;

    #[test]
    fn test_maps_worksheets() {
        let doc = Document::parse(MAP_XML).unwrap();
        let mapping = map_worksheets_to_datasources(&doc);
        assert_eq!(2, mapping.len());

        let sales = &mapping["Sales by Region"];
        assert_eq!(Some("federated.0xyz".to_owned()), sales.datasource_id);
        assert_eq!(vec!["[Sales]", "[Region]", "[Sales]"], sales.used_columns);

        let detail = &mapping["Detail"];
        assert_eq!(None, detail.datasource_id);
        assert!(detail.used_columns.is_empty());
    }

    #[test]
    fn test_duplicate_worksheet_names_last_wins() {
        let xml = r#"<workbook>
          <worksheet name="Dup">
            <datasource-dependencies datasource="first"/>
          </worksheet>
          <worksheet name="Dup">
            <datasource-dependencies datasource="second"/>
          </worksheet>
        </workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let mapping = map_worksheets_to_datasources(&doc);
        assert_eq!(1, mapping.len());
        assert_eq!(Some("second".to_owned()), mapping["Dup"].datasource_id);
    }
}
