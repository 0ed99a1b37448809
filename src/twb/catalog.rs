//! Declared-column catalog for the first datasource in a document.

use roxmltree::Document;
use std::collections::HashMap;

use crate::twb::{DATATYPE_KEY, NAME_KEY};
use crate::xml::NodeExt;

/// Maps each declared column name to its datatype for the FIRST `datasource`
/// element in document order; documents with multiple datasources only report
/// the first.
///
/// Only `column` elements nested under a `columns` block and carrying both
/// `name` and `datatype` attributes are counted. Duplicate names keep the
/// first-seen type (insertion-wins). A document with no datasource yields an
/// empty map, not an error.
pub fn build_column_catalog(doc: &Document) -> HashMap<String, String> {
    let mut catalog = HashMap::new();
    let Some(datasource) = doc.root_element().tagged_descendant("datasource") else {
        return catalog;
    };
    for columns in datasource.tagged_descendants("columns") {
        for column in columns.tagged_descendants("column") {
            if let (Some(name), Some(datatype)) =
                (column.opt_attr(NAME_KEY), column.opt_attr(DATATYPE_KEY))
            {
                catalog.entry(name).or_insert(datatype);
            }
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_type_wins() {
        let xml = r#"<workbook><datasource><columns>
            <column name="[Amount]" datatype="real"/>
            <column name="[Amount]" datatype="integer"/>
            <column name="[Region]" datatype="string"/>
            <column name="[NoType]"/>
        </columns></datasource></workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let catalog = build_column_catalog(&doc);
        assert_eq!(2, catalog.len());
        assert_eq!("real", catalog["[Amount]"]);
        assert_eq!("string", catalog["[Region]"]);
    }

    #[test]
    fn test_only_first_datasource_consulted() {
        let xml = r#"<workbook>
            <datasource><columns><column name="[A]" datatype="real"/></columns></datasource>
            <datasource><columns><column name="[B]" datatype="string"/></columns></datasource>
        </workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let catalog = build_column_catalog(&doc);
        assert_eq!(1, catalog.len());
        assert!(catalog.contains_key("[A]"));
    }

    #[test]
    fn test_no_datasource_yields_empty_map() {
        let doc = Document::parse("<workbook><worksheet name=\"s\"/></workbook>").unwrap();
        assert!(build_column_catalog(&doc).is_empty());
    }
}
