//! Core type definitions for the document tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Keep attributes in source order (serialization is deterministic)
//! 3. Use SmallVec for small arrays (avoid heap allocation)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any document
pub type NodeId = u32;

/// DOM `nodeType` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }

    /// Node name the DOM reports for nodes that have no tag
    pub fn default_node_name(&self) -> &'static str {
        match self {
            NodeType::Text => "#text",
            NodeType::CdataSection => "#cdata-section",
            NodeType::Comment => "#comment",
            NodeType::Document => "#document",
            NodeType::DocumentFragment => "#document-fragment",
            _ => "",
        }
    }
}

/// A single `name="value"` pair on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Lower-case tag name for elements, `#text` and friends otherwise
    pub node_name: String,
    /// Character data for text, comment and doctype nodes
    pub node_value: String,
    pub attributes: SmallVec<[Attribute; 4]>,
}

impl DomNode {
    /// Create a new node with required fields
    ///
    /// `node_id` is overwritten by the arena when the node is added.
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: SmallVec::new(),
        }
    }

    /// Create a detached element node
    pub fn element(tag: &str) -> Self {
        Self::new(0, NodeType::Element, tag.to_ascii_lowercase())
    }

    /// Create a detached text node
    pub fn text(data: impl Into<String>) -> Self {
        let mut node = Self::new(0, NodeType::Text, "#text");
        node.node_value = data.into();
        node
    }

    /// Create a detached comment node
    pub fn comment(data: impl Into<String>) -> Self {
        let mut node = Self::new(0, NodeType::Comment, "#comment");
        node.node_value = data.into();
        node
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// Set attribute value, keeping its position if it already exists
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Remove attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(position).value)
    }

    /// Whitespace-separated tokens of the class attribute
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Token membership test, as `classList.contains`
    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().any(|token| token == class)
    }

    /// Add class tokens that are not yet present
    pub fn add_class(&mut self, class: &str) {
        let mut tokens: Vec<String> = self.class_list().map(String::from).collect();
        for token in class.split_ascii_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
        self.set_attr("class", tokens.join(" "));
    }

    /// Remove every occurrence of the given class tokens
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_attr("class") {
            return;
        }
        let removed: Vec<&str> = class.split_ascii_whitespace().collect();
        let tokens: Vec<String> = self
            .class_list()
            .filter(|token| !removed.contains(token))
            .map(String::from)
            .collect();
        self.set_attr("class", tokens.join(" "));
    }

    /// Flip each given token; returns whether the last token ended up present
    pub fn toggle_class(&mut self, class: &str) -> bool {
        let mut present = false;
        for token in class.split_ascii_whitespace() {
            if self.has_class(token) {
                self.remove_class(token);
                present = false;
            } else {
                self.add_class(token);
                present = true;
            }
        }
        present
    }
}

/// Elements that never have an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are serialized without escaping
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_order() {
        let mut node = DomNode::element("DIV");
        node.set_attr("id", "main");
        node.set_attr("class", "a");
        node.set_attr("id", "other");

        assert_eq!(node.node_name, "div");
        assert_eq!(node.attributes[0], Attribute::new("id", "other"));
        assert_eq!(node.remove_attr("id").as_deref(), Some("other"));
        assert_eq!(node.attr("id"), None);
        assert!(node.has_attr("class"));
    }

    #[test]
    fn test_class_tokens() {
        let mut node = DomNode::element("li");
        node.set_attr("class", "tag  tagline");

        assert!(node.has_class("tag"));
        assert!(!node.has_class("tagl"));

        node.add_class("new tag");
        assert_eq!(node.attr("class"), Some("tag tagline new"));

        node.remove_class("tag");
        assert_eq!(node.attr("class"), Some("tagline new"));

        assert!(node.toggle_class("active"));
        assert!(!node.toggle_class("active"));
        assert_eq!(node.attr("class"), Some("tagline new"));
    }

    #[test]
    fn test_remove_class_without_attribute_is_noop() {
        let mut node = DomNode::element("p");
        node.remove_class("x");
        assert!(!node.has_attr("class"));
    }

    #[test]
    fn test_node_type_roundtrip() {
        assert_eq!(NodeType::from_u8(3), Some(NodeType::Text));
        assert_eq!(NodeType::from_u8(42), None);
        assert_eq!(NodeType::Comment.default_node_name(), "#comment");
    }
}
