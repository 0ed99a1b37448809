//! Declared and worksheet-used column model.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::ensure_tag_or_default;
use crate::twb::{CAPTION_KEY, DATATYPE_KEY, NAME_KEY, ROLE_KEY};
use crate::xml::NodeExt;

/// Datatype tag given to columns synthesized from worksheet-local
/// `calculation` elements.
pub const CALCULATED_DATATYPE: &str = "Calculated";

/// A column as declared in datasource metadata or used on a worksheet.
///
/// The name is unique within its owning datasource only; the same identifier
/// may recur across datasources and denote different fields. Absent
/// attributes read as empty strings, never nulls.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct SheetColumn {
    pub name: String,
    pub caption: String,
    pub datatype: String,
    pub aggregation: String,
    pub role: String,
    /// Free-text calculation formulas attached to the column.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub calculations: Vec<String>,
    /// Names of other columns this one references.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub references: Vec<String>,
}

impl<'a, 'b> From<Node<'a, 'b>> for SheetColumn {
    fn from(n: Node) -> Self {
        ensure_tag_or_default!(n, "column");
        let references = n
            .tagged_descendants("reference")
            .iter()
            .filter_map(|r| r.opt_attr("field"))
            .collect();
        Self {
            name: n.attr(NAME_KEY),
            caption: n.attr(CAPTION_KEY),
            datatype: n.attr(DATATYPE_KEY),
            aggregation: n.attr("aggregation"),
            role: n.attr(ROLE_KEY),
            calculations: vec![],
            references,
        }
    }
}

/// Synthesizes a pseudo-column from a worksheet-local `calculation` element.
/// The datatype is pinned to [`CALCULATED_DATATYPE`] and the element text
/// becomes the formula.
pub(crate) fn calculated_column(n: Node) -> SheetColumn {
    SheetColumn {
        name: n.attr(NAME_KEY),
        caption: n.attr(CAPTION_KEY),
        datatype: CALCULATED_DATATYPE.to_owned(),
        calculations: vec![n.all_text()],
        ..Default::default()
    }
}
