//! Datasource declarations: name, type, connection details, declared columns.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::ensure_tag_or_default;
use crate::twb::column::SheetColumn;
use crate::twb::NAME_KEY;
use crate::xml::NodeExt;

/// A named, typed data connection definition with its column catalog.
/// Datasources are independent of each other; there is no cross-datasource
/// identity.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct Datasource {
    pub name: String,
    #[serde(rename = "type")]
    pub ds_type: String,
    pub connection: ConnectionDetails,
    pub columns: Vec<SheetColumn>,
}

/// Coordinates of a datasource's single `connection` child. Absence of the
/// element or any attribute reads as empty strings.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct ConnectionDetails {
    pub server: String,
    pub database: String,
    pub class: String,
}

impl<'a, 'b> From<Node<'a, 'b>> for ConnectionDetails {
    fn from(n: Node) -> Self {
        ensure_tag_or_default!(n, "connection");
        Self {
            server: n.attr("server"),
            database: n.attr("database"),
            class: n.attr("class"),
        }
    }
}

impl<'a, 'b> From<Node<'a, 'b>> for Datasource {
    fn from(n: Node) -> Self {
        ensure_tag_or_default!(n, "datasource");
        Self {
            name: n.attr(NAME_KEY),
            ds_type: n.attr("type"),
            connection: n
                .tagged_child("connection")
                .map(ConnectionDetails::from)
                .unwrap_or_default(),
            columns: n
                .tagged_descendants("column")
                .into_iter()
                .map(SheetColumn::from)
                .collect(),
        }
    }
}

pub(crate) fn parse_datasources(root: Node) -> Vec<Datasource> {
    root.tagged_descendants("datasource")
        .into_iter()
        .map(Datasource::from)
        .collect()
}
