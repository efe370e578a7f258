//! Argument shapes accepted by the collection API
//!
//! Filtering operations take a [`Query`], construction takes a [`Source`];
//! both are resolved by matching on the variant, never by probing types.

use dom::{DomNode, NodeId};

/// How `filter`, `not`, `is` and `index` test an element
#[derive(Clone, Copy)]
pub enum Query<'q> {
    /// Fragment query evaluated by the collection's matcher
    Selector(&'q str),
    /// Called with the element's position in the collection and the node
    Predicate(&'q dyn Fn(usize, &DomNode) -> bool),
    /// Identity: only this exact node
    Node(NodeId),
}

impl<'q> From<&'q str> for Query<'q> {
    fn from(selector: &'q str) -> Self {
        Query::Selector(selector)
    }
}

impl<'q> From<&'q String> for Query<'q> {
    fn from(selector: &'q String) -> Self {
        Query::Selector(selector)
    }
}

impl From<NodeId> for Query<'_> {
    fn from(node_id: NodeId) -> Self {
        Query::Node(node_id)
    }
}

impl std::fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Query::Predicate(_) => f.write_str("Predicate(..)"),
            Query::Node(node_id) => f.debug_tuple("Node").field(node_id).finish(),
        }
    }
}

/// What a collection can be built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<'s> {
    /// Native selector resolved against the document root
    Selector(&'s str),
    Node(NodeId),
    Nodes(Vec<NodeId>),
}

impl<'s> From<&'s str> for Source<'s> {
    fn from(selector: &'s str) -> Self {
        Source::Selector(selector)
    }
}

impl From<NodeId> for Source<'_> {
    fn from(node_id: NodeId) -> Self {
        Source::Node(node_id)
    }
}

impl From<Vec<NodeId>> for Source<'_> {
    fn from(nodes: Vec<NodeId>) -> Self {
        Source::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Source<'_> {
    fn from(nodes: &[NodeId]) -> Self {
        Source::Nodes(nodes.to_vec())
    }
}
