//! Convenience accessors over `roxmltree` nodes.
//!
//! Tableau's workbook schema is loose: almost every attribute is optional.
//! The accessors here read an absent attribute as an empty string rather than
//! an error, which is the degradation contract the extractors rely on.

use roxmltree::Node;

pub trait NodeExt<'a, 'input> {
    /// Attribute value, defaulting to an empty string when absent.
    fn attr(&self, name: &str) -> String;

    /// Attribute value, `None` when absent.
    fn opt_attr(&self, name: &str) -> Option<String>;

    /// Concatenated text of all descendant text nodes.
    fn all_text(&self) -> String;

    /// First direct child with the given tag.
    fn tagged_child(&self, tag: &str) -> Option<Node<'a, 'input>>;

    /// All direct children with the given tag, in document order.
    fn tagged_children(&self, tag: &str) -> Vec<Node<'a, 'input>>;

    /// First descendant with the given tag (document order).
    fn tagged_descendant(&self, tag: &str) -> Option<Node<'a, 'input>>;

    /// All descendants with the given tag, in document order.
    fn tagged_descendants(&self, tag: &str) -> Vec<Node<'a, 'input>>;
}

impl<'a, 'input> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn attr(&self, name: &str) -> String {
        self.attribute(name).unwrap_or_default().to_owned()
    }

    fn opt_attr(&self, name: &str) -> Option<String> {
        self.attribute(name).map(str::to_owned)
    }

    fn all_text(&self) -> String {
        self.descendants()
            .filter(Node::is_text)
            .filter_map(|n| n.text())
            .collect()
    }

    fn tagged_child(&self, tag: &str) -> Option<Node<'a, 'input>> {
        self.children().find(|ch| ch.has_tag_name(tag))
    }

    fn tagged_children(&self, tag: &str) -> Vec<Node<'a, 'input>> {
        self.children().filter(|ch| ch.has_tag_name(tag)).collect()
    }

    fn tagged_descendant(&self, tag: &str) -> Option<Node<'a, 'input>> {
        self.descendants().find(|d| d.has_tag_name(tag))
    }

    fn tagged_descendants(&self, tag: &str) -> Vec<Node<'a, 'input>> {
        self.descendants().filter(|d| d.has_tag_name(tag)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const TEST_XML: &str = r#"
    <a foo="bar">
        <b id="1"/>
        <b id="2"/>
        <c val="7">
            <b id="4"/>
            <d str="abc">hello <e/>world</d>
        </c>
        <b id="3"/>
    </a>"#;

    #[test]
    fn test_attr_defaults() {
        let doc = Document::parse(TEST_XML).unwrap();
        let a = doc.root_element();
        assert_eq!("bar", a.attr("foo"));
        assert_eq!("", a.attr("missing"));
        assert!(a.opt_attr("missing").is_none());
    }

    #[test]
    fn test_tagged_child_vs_descendant() {
        let doc = Document::parse(TEST_XML).unwrap();
        let a = doc.root_element();

        // children stop at depth one; descendants go all the way down
        assert_eq!(3, a.tagged_children("b").len());
        assert_eq!(4, a.tagged_descendants("b").len());
        assert!(a.tagged_child("d").is_none());
        assert!(a.tagged_descendant("d").is_some());

        // first match in document order
        assert_eq!("1", a.tagged_child("b").unwrap().attr("id"));
        let ids: Vec<String> = a
            .tagged_descendants("b")
            .iter()
            .map(|n| n.attr("id"))
            .collect();
        assert_eq!(vec!["1", "2", "4", "3"], ids);
    }

    #[test]
    fn test_all_text_concatenates() {
        let doc = Document::parse(TEST_XML).unwrap();
        let d = doc.root_element().tagged_descendant("d").unwrap();
        assert_eq!("hello world", d.all_text());
    }
}
