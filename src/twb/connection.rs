//! Connection-centric view of a workbook: named connections and the tables
//! and columns they serve.

use anyhow::{anyhow, Context};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::twb::CAPTION_KEY;
use crate::xml::NodeExt;

/// All named connections resolved from the document's first datasource.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct DatasourceInfo {
    pub connections: Vec<ConnectionInfo>,
}

/// One physical connection: its class, a human-readable connection string,
/// and the tables it serves.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct ConnectionInfo {
    pub connection_type: String,
    pub connection_string: String,
    pub tables: Vec<TableInfo>,
}

/// A table and its columns, grouped from the document's column index.
/// Column order is insertion order of first appearance.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct TableInfo {
    pub table_name: String,
    pub columns: Vec<String>,
}

/// Resolves the named connections of the document's first `datasource`
/// element.
///
/// Fails when no datasource exists at all; a datasource whose connection
/// block has zero named connections yields an empty list instead. Every
/// connection receives the table/column groupings of the document-global
/// `cols` index; since the index carries no connection attribution, with
/// multiple named connections each one gets the same full table list.
pub fn resolve_connections(doc: &Document) -> anyhow::Result<DatasourceInfo> {
    let root = doc.root_element();
    let datasource = root
        .tagged_descendant("datasource")
        .ok_or_else(|| anyhow!("no datasource found in the workbook"))?;

    let named_connections = datasource
        .tagged_descendant("connection")
        .map(|c| c.tagged_descendants("named-connection"))
        .unwrap_or_default();

    // Grouped once; the same list is attached to every connection below.
    let tables = extract_table_index(root)?;

    let mut connections = vec![];
    for named in named_connections {
        let nested = named.tagged_descendant("connection");
        let connection_type = nested
            .map(|c| c.opt_attr("class").unwrap_or_else(|| "Unknown".to_owned()))
            .unwrap_or_else(|| {
                info!(
                    "named connection ({}) has no nested connection element",
                    named.attr("name")
                );
                "Unknown".to_owned()
            });
        let connection_string = build_connection_string(&connection_type, named, nested)?;
        connections.push(ConnectionInfo {
            connection_type,
            connection_string,
            tables: tables.clone(),
        });
    }
    Ok(DatasourceInfo { connections })
}

/// Renders a connection string from the connection class and attributes.
///
/// For the `sqlserver` class the string composes server (the named
/// connection's caption), database, authentication mode, and SSL requirement;
/// each source attribute is required. Every other class falls back to the
/// nested connection's `filename`, defaulting to `"Unknown"`.
fn build_connection_string(
    connection_type: &str,
    named: Node,
    nested: Option<Node>,
) -> anyhow::Result<String> {
    if connection_type == "sqlserver" {
        let nested = nested.ok_or_else(|| anyhow!("sqlserver connection has no attributes"))?;
        let server = named
            .opt_attr(CAPTION_KEY)
            .ok_or_else(|| anyhow!("sqlserver connection missing `caption` attribute"))?;
        let database = nested
            .opt_attr("dbname")
            .ok_or_else(|| anyhow!("sqlserver connection missing `dbname` attribute"))?;
        let authentication = nested
            .opt_attr("authentication")
            .ok_or_else(|| anyhow!("sqlserver connection missing `authentication` attribute"))?;
        let sslmode = nested
            .opt_attr("sslmode")
            .ok_or_else(|| anyhow!("sqlserver connection missing `sslmode` attribute"))?;
        let ssl = if sslmode == "require" { "Yes" } else { "No" };
        return Ok(format!(
            "sqlserver; Server: {server}; Database: {database}; \
             Authentication: {authentication}; Require SSL: {ssl}"
        ));
    }
    Ok(nested
        .and_then(|c| c.opt_attr("filename"))
        .unwrap_or_else(|| "Unknown".to_owned()))
}

/// Groups the document's first `cols` index into tables.
///
/// Each `map` entry's `value` is a `[Table].[Column]` reference, split on the
/// first `.`; a value with no separator is a hard error for the parse.
/// Entries without a `value` attribute are skipped. Grouping preserves
/// insertion order of first appearance for both tables and their columns.
fn extract_table_index(root: Node) -> anyhow::Result<Vec<TableInfo>> {
    let mut tables: Vec<TableInfo> = vec![];
    let maps = root
        .tagged_descendant("cols")
        .map(|c| c.tagged_descendants("map"))
        .unwrap_or_default();

    for map in maps {
        let Some(value) = map.opt_attr("value") else {
            continue;
        };
        let (table_part, column_part) = value
            .split_once('.')
            .with_context(|| format!("malformed table.column reference: {value}"))?;
        let table_name = table_part.trim_matches(['[', ']']).to_owned();
        let column_name = column_part.trim_matches(['[', ']']).to_owned();

        match tables.iter_mut().find(|t| t.table_name == table_name) {
            Some(table) => table.columns.push(column_name),
            None => tables.push(TableInfo {
                table_name,
                columns: vec![column_name],
            }),
        }
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONN_XML: &str = r#"
    <workbook>
      <datasource name="sales">
        <connection class="federated">
          <named-connections>
            <named-connection name="sqlserver.1" caption="db.example.com">
              <connection class="sqlserver" dbname="SalesDB"
                          authentication="sqlserver-auth" sslmode="require"/>
            </named-connection>
            <named-connection name="excel.1" caption="sample">
              <connection class="excel-direct" filename="sampleData.xlsx"/>
            </named-connection>
          </named-connections>
          <cols>
            <map key="[Amount]" value="[Orders].[Amount]"/>
            <map key="[Region]" value="[Orders].[Region]"/>
            <map key="[Name]" value="[Customers].[Name]"/>
          </cols>
        </connection>
      </datasource>
    </workbook>"#;

    #[test]
    fn test_resolves_both_connections() {
        let doc = Document::parse(CONN_XML).unwrap();
        let info = resolve_connections(&doc).unwrap();
        assert_eq!(2, info.connections.len());

        let sql = &info.connections[0];
        assert_eq!("sqlserver", sql.connection_type);
        assert_eq!(
            "sqlserver; Server: db.example.com; Database: SalesDB; \
             Authentication: sqlserver-auth; Require SSL: Yes",
            sql.connection_string
        );

        let excel = &info.connections[1];
        assert_eq!("excel-direct", excel.connection_type);
        assert_eq!("sampleData.xlsx", excel.connection_string);
    }

    #[test]
    fn test_index_is_global_to_every_connection() {
        let doc = Document::parse(CONN_XML).unwrap();
        let info = resolve_connections(&doc).unwrap();
        for conn in &info.connections {
            assert_eq!(2, conn.tables.len());
            assert_eq!("Orders", conn.tables[0].table_name);
            assert_eq!(vec!["Amount", "Region"], conn.tables[0].columns);
            assert_eq!("Customers", conn.tables[1].table_name);
            assert_eq!(vec!["Name"], conn.tables[1].columns);
        }
    }

    #[test]
    fn test_no_datasource_is_an_error() {
        let doc = Document::parse("<workbook><worksheet/></workbook>").unwrap();
        let err = resolve_connections(&doc).unwrap_err();
        assert!(err.to_string().contains("no datasource"));
    }

    #[test]
    fn test_zero_named_connections_is_not_an_error() {
        let xml = r#"<workbook><datasource><connection class="federated"/></datasource></workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let info = resolve_connections(&doc).unwrap();
        assert!(info.connections.is_empty());
    }

    #[test]
    fn test_sqlserver_missing_authentication_fails() {
        let xml = r#"<workbook><datasource><connection>
            <named-connection caption="srv">
              <connection class="sqlserver" dbname="SalesDB" sslmode="require"/>
            </named-connection>
        </connection></datasource></workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let err = resolve_connections(&doc).unwrap_err();
        assert!(err.to_string().contains("authentication"));
    }

    #[test]
    fn test_other_class_missing_filename_defaults_to_unknown() {
        let xml = r#"<workbook><datasource><connection>
            <named-connection name="csv.1">
              <connection class="textscan"/>
            </named-connection>
        </connection></datasource></workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let info = resolve_connections(&doc).unwrap();
        assert_eq!("Unknown", info.connections[0].connection_string);
    }

    #[test]
    fn test_malformed_index_value_is_a_hard_error() {
        let xml = r#"<workbook><datasource><connection>
            <cols><map key="[A]" value="[NoSeparator]"/></cols>
        </connection></datasource></workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let err = resolve_connections(&doc).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_sslmode_other_than_require_is_no() {
        let xml = r#"<workbook><datasource><connection>
            <named-connection caption="srv">
              <connection class="sqlserver" dbname="Db" authentication="sspi" sslmode="prefer"/>
            </named-connection>
        </connection></datasource></workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let info = resolve_connections(&doc).unwrap();
        assert!(info.connections[0].connection_string.ends_with("Require SSL: No"));
    }
}
