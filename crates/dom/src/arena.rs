//! Index-linked node storage for one document
//!
//! Nodes live in a single `Vec` and refer to each other by `NodeId`.
//! There is no `Rc`/`RefCell` web: parent and child links are plain
//! indices, so a handle held by a caller stays valid across mutation.
//!
//! ```text
//! nodes: [#document][html][head][body][detached p]...
//!             0        1     2     3        4
//! ```
//!
//! Detached nodes are never freed; they stay addressable until the arena
//! is cleared or dropped.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

/// Every node of a document, attached or not
#[derive(Debug, Clone)]
pub struct DomArena {
    /// Slot `i` holds the node whose id is `i`
    nodes: Vec<DomNode>,
    /// The document node, once loaded
    root_id: Option<NodeId>,
}

impl DomArena {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Empty arena with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Store `node` in the next free slot and return its id
    ///
    /// The node's `node_id` is rewritten to its slot. Links already present
    /// on the node are kept as given; use [`DomArena::append_child`] to
    /// build trees.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        let slot = node_id as usize;
        self.nodes.get(slot).ok_or(DomError::NodeNotFound(node_id))
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let slot = node_id as usize;
        self.nodes.get_mut(slot).ok_or(DomError::NodeNotFound(node_id))
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        (node_id as usize) < self.nodes.len()
    }

    /// Mark an existing node as the document node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.root_id = Some(self.get(node_id)?.node_id);
        Ok(())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    pub fn root(&self) -> Result<&DomNode> {
        match self.root_id {
            Some(root_id) => self.get(root_id),
            None => Err(DomError::HierarchyRequest("No root node set".to_string())),
        }
    }

    /// Total number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every stored node in id order
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| node.node_id)
    }

    /// Direct children in order, text and comments included
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        self.get(node_id)?
            .children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        self.get(node_id)?
            .parent_id
            .map(|parent_id| self.get(parent_id))
            .transpose()
    }

    /// Whether `ancestor` is `node_id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id;
        }
        Ok(false)
    }

    /// Append `child` as the last child of `parent`
    ///
    /// A child that already has a parent is moved. Inserting a node into
    /// its own subtree is a hierarchy error, as in the DOM.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_append(parent, child)?;

        self.detach(child)?;
        self.get_mut(parent)?.children_ids.push(child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// The checks [`DomArena::append_child`] runs, without mutating
    pub fn check_append(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let child_type = self.get(child)?.node_type;
        if child_type == NodeType::Document {
            return Err(DomError::HierarchyRequest(format!(
                "document node {} cannot be a child",
                child
            )));
        }
        if self.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::HierarchyRequest(format!(
                "node {} cannot be appended to its own descendant {}",
                child, parent
            )));
        }

        self.check_parent(parent)
    }

    /// Whether `parent` is a node type that can hold children at all
    pub fn check_parent(&self, parent: NodeId) -> Result<()> {
        let node_type = self.get(parent)?.node_type;
        if !matches!(
            node_type,
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment
        ) {
            return Err(DomError::InvalidNodeType {
                expected: "Element, Document or DocumentFragment".to_string(),
                actual: format!("{:?}", node_type),
            });
        }
        Ok(())
    }

    /// Unlink a node from its parent, keeping its own subtree intact
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let Some(parent_id) = self.get(node_id)?.parent_id else {
            return Ok(());
        };

        self.get_mut(parent_id)?
            .children_ids
            .retain(|child| *child != node_id);
        self.get_mut(node_id)?.parent_id = None;
        Ok(())
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child in children {
            self.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Copy a node into a fresh detached slot, optionally with its subtree
    pub fn clone_subtree(&mut self, node_id: NodeId, deep: bool) -> Result<NodeId> {
        let source = self.get(node_id)?;
        let children: Vec<NodeId> = if deep {
            source.children_ids.to_vec()
        } else {
            Vec::new()
        };

        let mut copy = source.clone();
        copy.parent_id = None;
        copy.children_ids.clear();
        let copy_id = self.add_node(copy);

        for child in children {
            let child_copy = self.clone_subtree(child, true)?;
            self.append_child(copy_id, child_copy)?;
        }

        Ok(copy_id)
    }

    /// Pre-order walk of the subtree at `start_id`, start included
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Reversed so the first child is popped first.
            stack.extend(node.children_ids.iter().rev().copied());
        }

        Ok(())
    }

    /// Descendants of `start_id` in document order, `start_id` excluded
    pub fn descendants(&self, start_id: NodeId) -> Result<Vec<NodeId>> {
        let mut ids = Vec::new();
        self.traverse_df(start_id, |node| {
            if node.node_id != start_id {
                ids.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(ids)
    }

    /// Find nodes reachable from the root matching predicate, in document order
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.root_id.into_iter().collect();

        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(node_id as usize) else {
                continue;
            };
            if predicate(node) {
                found.push(node_id);
            }
            stack.extend(node.children_ids.iter().rev().copied());
        }
        found
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.find(predicate).into_iter().next()
    }

    /// Find all elements by tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_one(|node| node.is_element() && node.attr("id") == Some(id))
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
