//! Custom script extraction with best-effort field-reference scanning.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::ensure_tag_or_default;
use crate::twb::NAME_KEY;
use crate::xml::NodeExt;

/// A `script` element: name, raw text, and the bracket-delimited tokens
/// found in the text. The token list comes from [`extract_bracketed_tokens`]
/// and inherits its imprecision.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct CustomScript {
    pub name: String,
    pub content: String,
    pub referenced_fields: Vec<String>,
}

impl<'a, 'b> From<Node<'a, 'b>> for CustomScript {
    fn from(n: Node) -> Self {
        ensure_tag_or_default!(n, "script");
        let content = n.all_text();
        let referenced_fields = extract_bracketed_tokens(&content);
        Self {
            name: n.attr(NAME_KEY),
            content,
            referenced_fields,
        }
    }
}

/// Best-effort extraction of candidate field references from script text.
///
/// Splits on the literal `[` and `]` characters and keeps every non-blank
/// token verbatim. This is a heuristic, not a parser: it captures arbitrary
/// bracketed substrings and the text between brackets, so false positives
/// are expected.
pub fn extract_bracketed_tokens(text: &str) -> Vec<String> {
    text.split(['[', ']'])
        .filter(|t| !t.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn parse_scripts(root: Node) -> Vec<CustomScript> {
    root.tagged_descendants("script")
        .into_iter()
        .map(CustomScript::from)
        .collect()
}
