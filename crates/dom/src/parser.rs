//! HTML markup loading
//!
//! html5ever does the tokenizing and tree construction into an `RcDom`;
//! this module copies that tree into a [`DomArena`] so the rest of the
//! crate only ever sees indices.

use std::io::Read;

use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{Attribute, DomNode, NodeId, NodeType};

/// Parse a complete document; returns the arena and its document node
pub fn parse_html(markup: &str) -> Result<(DomArena, NodeId)> {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    import_document(dom)
}

/// Parse a complete document from a byte stream (UTF-8)
pub fn read_html<R: Read>(reader: &mut R) -> Result<(DomArena, NodeId)> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(reader)?;
    import_document(dom)
}

/// Parse markup as the children of a `context` element, importing the
/// resulting nodes into `arena` as detached top-level nodes, in order.
///
/// The context decides the tree builder's starting mode, so `<tr>` markup
/// survives under `tbody` and `option` markup under `select`.
pub fn parse_fragment_into(
    arena: &mut DomArena,
    context: &str,
    markup: &str,
) -> Result<Vec<NodeId>> {
    let context = QualName::new(None, ns!(html), LocalName::from(context));
    let sink = RcDom::default();
    let dom = parse_fragment(sink, Default::default(), context, Vec::new()).one(markup);

    // The fragment parser wraps its output in a synthetic <html> element.
    let document = dom.document;
    let wrapper = document.children.borrow().first().cloned();
    let Some(wrapper) = wrapper else {
        return Ok(Vec::new());
    };

    let mut imported = Vec::new();
    for child in wrapper.children.borrow().iter() {
        if let Some(node_id) = import_node(arena, child)? {
            imported.push(node_id);
        }
    }
    Ok(imported)
}

fn import_document(dom: RcDom) -> Result<(DomArena, NodeId)> {
    for error in dom.errors.iter() {
        tracing::debug!("[HtmlParser] recovered from: {}", error);
    }

    let mut arena = DomArena::new();
    let root_id = match import_node(&mut arena, &dom.document)? {
        Some(id) => id,
        None => arena.add_node(DomNode::new(0, NodeType::Document, "#document")),
    };
    arena.set_root(root_id)?;

    tracing::debug!("[HtmlParser] imported {} nodes", arena.len());
    Ok((arena, root_id))
}

/// Copy one rcdom node (and its subtree) into the arena
///
/// Processing instructions have no place in an HTML tree and are skipped.
fn import_node(arena: &mut DomArena, handle: &Handle) -> Result<Option<NodeId>> {
    let node = match &handle.data {
        NodeData::Document => DomNode::new(0, NodeType::Document, "#document"),
        NodeData::Doctype { name, .. } => {
            let mut node = DomNode::new(0, NodeType::DocumentType, name.to_string());
            node.node_value = name.to_string();
            node
        }
        NodeData::Text { contents } => DomNode::text(contents.borrow().to_string()),
        NodeData::Comment { contents } => DomNode::comment(contents.to_string()),
        NodeData::Element { name, attrs, .. } => {
            let mut node = DomNode::element(&name.local);
            node.attributes = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute::new(attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            node
        }
        NodeData::ProcessingInstruction { .. } => return Ok(None),
    };

    let node_id = arena.add_node(node);
    for child in handle.children.borrow().iter() {
        if let Some(child_id) = import_node(arena, child)? {
            arena.append_child(node_id, child_id)?;
        }
    }
    Ok(Some(node_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_skeleton() {
        let (arena, root) = parse_html("<p class=a>Hello</p>").unwrap();

        assert_eq!(arena.get(root).unwrap().node_type, NodeType::Document);
        assert_eq!(arena.find_by_tag("html").len(), 1);
        assert_eq!(arena.find_by_tag("body").len(), 1);

        let p = arena.find_by_tag("p")[0];
        let node = arena.get(p).unwrap();
        assert_eq!(node.attr("class"), Some("a"));
        assert_eq!(arena.children(p).unwrap()[0].node_value, "Hello");
    }

    #[test]
    fn test_read_html_from_bytes() {
        let mut bytes: &[u8] = b"<!DOCTYPE html><title>t</title>";
        let (arena, root) = read_html(&mut bytes).unwrap();

        let first = arena.children(root).unwrap()[0];
        assert_eq!(first.node_type, NodeType::DocumentType);
        assert_eq!(first.node_name, "html");
    }

    #[test]
    fn test_fragment_nodes_are_detached() {
        let mut arena = DomArena::new();
        let ids = parse_fragment_into(&mut arena, "body", "<b>x</b> tail<!--c-->").unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(arena.get(ids[0]).unwrap().node_name, "b");
        assert_eq!(arena.get(ids[1]).unwrap().node_value, " tail");
        assert_eq!(arena.get(ids[2]).unwrap().node_type, NodeType::Comment);
        assert!(ids.iter().all(|&id| arena.get(id).unwrap().parent_id.is_none()));
    }

    #[test]
    fn test_fragment_uses_context_insertion_mode() {
        let mut arena = DomArena::new();

        let rows = parse_fragment_into(&mut arena, "tbody", "<tr><td>b</td></tr>").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(arena.get(rows[0]).unwrap().node_name, "tr");
        let cell = arena.children(rows[0]).unwrap()[0];
        assert_eq!(cell.node_name, "td");

        // Under <body> the table parts are dropped as parse errors.
        let loose = parse_fragment_into(&mut arena, "body", "<tr><td>b</td></tr>").unwrap();
        assert!(loose.iter().all(|&id| arena.get(id).unwrap().is_text()));

        let options = parse_fragment_into(&mut arena, "select", "<option>x</option>").unwrap();
        assert_eq!(arena.get(options[0]).unwrap().node_name, "option");
    }
}
