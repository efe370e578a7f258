//! Document - Main entry point for DOM operations
//!
//! This handles:
//! - Loading a tree from HTML markup or a CDP `DOM.getDocument` snapshot
//! - Native descendant search (`querySelectorAll`)
//! - Content accessors (`textContent`, `innerHTML`, `outerHTML`)
//! - Node creation, cloning and tree mutation

use std::io::Read;

use serde_json::Value;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::parser;
use crate::select::SelectorList;
use crate::serializer::{DomSerializer, SerializerConfig};
use crate::types::*;
use crate::utils;

/// An owned document tree
///
/// Every query and mutation goes through `&self` / `&mut self`, so one
/// document is only ever touched from one control flow at a time.
#[derive(Debug, Clone)]
pub struct Document {
    arena: DomArena,
    serializer: DomSerializer,
}

impl Document {
    /// Create an empty `<html><head></head><body></body></html>` document
    pub fn new() -> Self {
        let arena = skeleton().expect("fresh html/head/body nodes form a valid tree");
        Self::from_arena(arena)
    }

    /// Wrap an arena whose root is already set
    pub fn from_arena(arena: DomArena) -> Self {
        Self {
            arena,
            serializer: DomSerializer::new(),
        }
    }

    /// Use a custom serializer configuration for `inner_html`/`outer_html`
    pub fn with_serializer_config(mut self, config: SerializerConfig) -> Self {
        self.serializer = DomSerializer::with_config(config);
        self
    }

    /// Parse an HTML document
    pub fn parse_html(markup: &str) -> Result<Self> {
        let (arena, _) = parser::parse_html(markup)?;
        Ok(Self::from_arena(arena))
    }

    /// Parse an HTML document from a UTF-8 byte stream
    pub fn read_html<R: Read>(reader: &mut R) -> Result<Self> {
        let (arena, _) = parser::read_html(reader)?;
        Ok(Self::from_arena(arena))
    }

    /// Build a document from a CDP `DOM.getDocument` response
    ///
    /// Input format:
    /// ```json
    /// {
    ///   "root": {
    ///     "nodeType": 9,
    ///     "nodeName": "#document",
    ///     "children": [...]
    ///   }
    /// }
    /// ```
    /// Attributes come as a flat `[name, value, name, value, ...]` array.
    pub fn from_cdp_json(cdp_response: &Value) -> Result<Self> {
        let root = cdp_response
            .get("root")
            .ok_or_else(|| DomError::CdpError("Missing 'root' in CDP response".to_string()))?;

        let mut arena = DomArena::new();
        let root_id = parse_cdp_node(&mut arena, root)?;
        arena.set_root(root_id)?;

        tracing::debug!("[Document] loaded {} nodes from CDP snapshot", arena.len());
        Ok(Self::from_arena(arena))
    }

    /// Parse a CDP snapshot from its JSON text
    pub fn from_cdp_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_cdp_json(&value)
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.arena.get_mut(node_id)
    }

    /// The document node
    pub fn root_id(&self) -> Result<NodeId> {
        self.arena
            .root_id()
            .ok_or_else(|| DomError::HierarchyRequest("Document has no root".to_string()))
    }

    /// The `<body>` element, if the tree has one
    pub fn body(&self) -> Option<NodeId> {
        self.arena.find_by_tag("body").into_iter().next()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.add_node(DomNode::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.arena.add_node(DomNode::text(data))
    }

    /// All descendants of `context` matching `selector`, in document order
    pub fn query_selector_all(&self, context: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let found = list.query_all(&self.arena, context)?;
        tracing::trace!(
            "[Document] query '{}' under node {} matched {} nodes",
            selector,
            context,
            found.len()
        );
        Ok(found)
    }

    /// First descendant of `context` matching `selector`
    pub fn query_selector(&self, context: NodeId, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(context, selector)?.into_iter().next())
    }

    /// Whether the node itself matches `selector`
    pub fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        SelectorList::parse(selector)?.matches(&self.arena, node_id)
    }

    pub fn text_content(&self, node_id: NodeId) -> Result<Option<String>> {
        utils::get_text_content(&self.arena, node_id)
    }

    /// Replace all children with a single text node (none for empty text)
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        let node = self.arena.get_mut(node_id)?;
        match node.node_type {
            NodeType::Text | NodeType::CdataSection | NodeType::Comment => {
                node.node_value = text.to_string();
                return Ok(());
            }
            NodeType::Document | NodeType::DocumentType => return Ok(()),
            _ => {}
        }

        self.arena.clear_children(node_id)?;
        if !text.is_empty() {
            let text_id = self.create_text(text);
            self.arena.append_child(node_id, text_id)?;
        }
        Ok(())
    }

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        self.serializer.inner_html(&self.arena, node_id)
    }

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        self.serializer.outer_html(&self.arena, node_id)
    }

    /// Replace all children with the parsed markup
    ///
    /// Elements parse the markup in their own context, as `innerHTML` does;
    /// document and fragment nodes use `<body>`.
    pub fn set_inner_html(&mut self, node_id: NodeId, markup: &str) -> Result<()> {
        let node = self.arena.get(node_id)?;
        let context = match node.tag_name() {
            Some(tag) => tag.to_string(),
            None => "body".to_string(),
        };
        let fragment = parser::parse_fragment_into(&mut self.arena, &context, markup)?;

        self.arena.clear_children(node_id)?;
        for child in fragment {
            self.arena.append_child(node_id, child)?;
        }
        Ok(())
    }

    /// Copy a node into a detached node, with its subtree when `deep`
    pub fn clone_node(&mut self, node_id: NodeId, deep: bool) -> Result<NodeId> {
        self.arena.clone_subtree(node_id, deep)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.arena.append_child(parent, child)
    }

    /// Detach a node from the tree; its id stays valid
    pub fn remove(&mut self, node_id: NodeId) -> Result<()> {
        self.arena.detach(node_id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn skeleton() -> Result<DomArena> {
    let mut arena = DomArena::with_capacity(4);
    let root = arena.add_node(DomNode::new(0, NodeType::Document, "#document"));
    let html = arena.add_node(DomNode::element("html"));
    let head = arena.add_node(DomNode::element("head"));
    let body = arena.add_node(DomNode::element("body"));

    arena.append_child(root, html)?;
    arena.append_child(html, head)?;
    arena.append_child(html, body)?;
    arena.set_root(root)?;
    Ok(arena)
}

/// Recursively parse a CDP node
fn parse_cdp_node(arena: &mut DomArena, cdp_node: &Value) -> Result<NodeId> {
    let node_type_val = cdp_node["nodeType"]
        .as_u64()
        .ok_or_else(|| DomError::CdpError("Missing nodeType".to_string()))?;

    let node_type = u8::try_from(node_type_val)
        .ok()
        .and_then(NodeType::from_u8)
        .ok_or_else(|| DomError::InvalidNodeType {
            expected: "valid NodeType".to_string(),
            actual: format!("{}", node_type_val),
        })?;

    let node_name = match cdp_node["nodeName"].as_str() {
        Some(name) if node_type == NodeType::Element => name.to_ascii_lowercase(),
        Some(name) => name.to_string(),
        None => node_type.default_node_name().to_string(),
    };

    let mut node = DomNode::new(0, node_type, node_name);
    node.node_value = cdp_node["nodeValue"].as_str().unwrap_or("").to_string();

    // Parse attributes
    if let Some(attrs) = cdp_node["attributes"].as_array() {
        for pair in attrs.chunks_exact(2) {
            if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                node.set_attr(key, value);
            }
        }
    }

    let node_id = arena.add_node(node);

    // Parse children
    if let Some(children) = cdp_node["children"].as_array() {
        for child in children {
            let child_id = parse_cdp_node(arena, child)?;
            arena.append_child(node_id, child_id)?;
        }
    }

    Ok(node_id)
}
