//! Chainable collection of document nodes
//!
//! A [`Dommer`] is an ordered list of [`NodeId`]s plus the matcher used to
//! narrow it. It never borrows the document: every operation takes the
//! document it should read (`&Document`) or mutate (`&mut Document`), so a
//! collection stays usable across mutations and several collections can
//! point into the same tree.
//!
//! Traversal returns a new collection; mutation applies to every held node
//! and hands back `&Self` for chaining.
//!
//! ```no_run
//! # use dom::Document;
//! # use dommer::Dommer;
//! # fn main() -> dommer::Result<()> {
//! let mut doc = Document::parse_html("<ul><li><a class=tag>1</a></li></ul>")?;
//! let tags = Dommer::select(&doc, "ul")?.find(&doc, "a")?.filter(&doc, ".tag");
//! tags.add_class(&mut doc, "seen")?.set_attr(&mut doc, "data-seen", "1")?;
//! # Ok(())
//! # }
//! ```

use ahash::AHashSet;
use dom::{utils as dom_utils, Document, DomNode, NodeId};

use crate::error::{DommerError, Result};
use crate::matcher::Matcher;
use crate::query::{Query, Source};
use crate::utils;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dommer {
    nodes: Vec<NodeId>,
    matcher: Matcher,
}

impl Dommer {
    /// Wrap nodes as given, duplicates and order included
    pub fn new(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            matcher: Matcher::default(),
        }
    }

    pub fn from_node(node_id: NodeId) -> Self {
        Self::new([node_id])
    }

    /// Native query from the document node
    pub fn select(doc: &Document, selector: &str) -> Result<Self> {
        Self::select_within(doc, selector, doc.root_id()?)
    }

    /// Native query from an explicit context node
    pub fn select_within(doc: &Document, selector: &str, context: NodeId) -> Result<Self> {
        Self::from_node(context).find(doc, selector)
    }

    /// Build from a selector, a single node or a list of nodes
    pub fn from_source<'s>(doc: &Document, source: impl Into<Source<'s>>) -> Result<Self> {
        match source.into() {
            Source::Selector(selector) => Self::select(doc, selector),
            Source::Node(node_id) => {
                doc.get(node_id)?;
                Ok(Self::from_node(node_id))
            }
            Source::Nodes(nodes) => {
                for &node_id in &nodes {
                    doc.get(node_id)?;
                }
                Ok(Self::new(nodes))
            }
        }
    }

    /// Create a detached element and wrap it
    pub fn create(doc: &mut Document, tag: &str) -> Self {
        Self::from_node(doc.create_element(tag))
    }

    /// Use `matcher` for fragment queries on this and every derived collection
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// New collection sharing this one's matcher
    fn derive(&self, nodes: Vec<NodeId>) -> Self {
        Self {
            nodes,
            matcher: self.matcher,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    // ---- traversal ----

    /// Descendants of every held node matching a native selector
    ///
    /// Results are grouped by context in collection order, each group in
    /// document order; a node reached from two contexts appears once.
    pub fn find(&self, doc: &Document, selector: &str) -> Result<Self> {
        if selector.trim().is_empty() {
            return Err(DommerError::EmptySelector);
        }

        let mut seen = AHashSet::new();
        let mut found = Vec::new();
        for &context in &self.nodes {
            for node_id in doc.query_selector_all(context, selector)? {
                if seen.insert(node_id) {
                    found.push(node_id);
                }
            }
        }

        tracing::debug!(
            "[Dommer] find '{}' from {} contexts: {} nodes",
            selector,
            self.nodes.len(),
            found.len()
        );
        Ok(self.derive(found))
    }

    /// The element at `index`; negative values count from the end
    pub fn eq(&self, index: isize) -> Result<Self> {
        let len = self.nodes.len();
        let normalized = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };

        match normalized.and_then(|i| self.nodes.get(i)) {
            Some(&node_id) => Ok(self.derive(vec![node_id])),
            None => Err(DommerError::IndexOutOfRange { index, len }),
        }
    }

    /// First element (empty collection stays empty)
    pub fn first(&self) -> Self {
        self.derive(self.nodes.first().copied().into_iter().collect())
    }

    /// Last element (empty collection stays empty)
    pub fn last(&self) -> Self {
        self.derive(self.nodes.last().copied().into_iter().collect())
    }

    /// Whether the node at `position` satisfies `query`
    ///
    /// Ids that are not in the document never satisfy anything.
    fn satisfies(
        &self,
        doc: &Document,
        query: Query<'_>,
        position: usize,
        node_id: NodeId,
    ) -> bool {
        match query {
            Query::Node(target) => node_id == target,
            Query::Selector(selector) => doc
                .get(node_id)
                .is_ok_and(|node| self.matcher.matches(node, selector)),
            Query::Predicate(predicate) => doc
                .get(node_id)
                .is_ok_and(|node| predicate(position, node)),
        }
    }

    /// Elements satisfying `query`, relative order kept
    pub fn filter<'q>(&self, doc: &Document, query: impl Into<Query<'q>>) -> Self {
        let query = query.into();
        let kept = utils::filter(self.iter(), |position, &node_id| {
            self.satisfies(doc, query, position, node_id)
        });
        self.derive(kept)
    }

    /// Elements not satisfying `query`
    pub fn not<'q>(&self, doc: &Document, query: impl Into<Query<'q>>) -> Self {
        let query = query.into();
        let kept = utils::filter(self.iter(), |position, &node_id| {
            !self.satisfies(doc, query, position, node_id)
        });
        self.derive(kept)
    }

    /// Whether any element satisfies `query`
    pub fn is<'q>(&self, doc: &Document, query: impl Into<Query<'q>>) -> bool {
        self.index(doc, query).is_some()
    }

    /// Position of the first element satisfying `query`
    pub fn index<'q>(&self, doc: &Document, query: impl Into<Query<'q>>) -> Option<usize> {
        let query = query.into();
        self.iter()
            .enumerate()
            .position(|(position, node_id)| self.satisfies(doc, query, position, node_id))
    }

    /// Parent of every element, each parent once
    pub fn parent(&self, doc: &Document) -> Result<Self> {
        let mut parents = Vec::new();
        for &node_id in &self.nodes {
            parents.extend(doc.get(node_id)?.parent_id);
        }
        Ok(self.derive(dedup(parents)))
    }

    /// Element children of every element, in collection then document order
    pub fn children(&self, doc: &Document) -> Result<Self> {
        let mut children = Vec::new();
        for &node_id in &self.nodes {
            for child in doc.arena().children(node_id)? {
                if child.is_element() {
                    children.push(child.node_id);
                }
            }
        }
        Ok(self.derive(dedup(children)))
    }

    /// Element siblings of every element, excluding the held elements themselves
    pub fn siblings(&self, doc: &Document) -> Result<Self> {
        let held: AHashSet<NodeId> = self.nodes.iter().copied().collect();
        let mut siblings = Vec::new();
        for &node_id in &self.nodes {
            let Some(parent) = doc.get(node_id)?.parent_id else {
                continue;
            };
            for sibling in doc.arena().children(parent)? {
                if sibling.is_element() && !held.contains(&sibling.node_id) {
                    siblings.push(sibling.node_id);
                }
            }
        }
        Ok(self.derive(dedup(siblings)))
    }

    /// Call `callback` with each position and node
    pub fn each<F>(&self, callback: F) -> &Self
    where
        F: FnMut(usize, NodeId),
    {
        utils::each(self.iter(), callback);
        self
    }

    pub fn map<T, F>(&self, callback: F) -> Vec<T>
    where
        F: FnMut(usize, NodeId) -> T,
    {
        utils::map(self.iter(), callback)
    }

    // ---- attributes and classes ----

    /// Attribute of the first element
    pub fn attr(&self, doc: &Document, name: &str) -> Option<String> {
        let node = self.first_node(doc)?;
        node.attr(name).map(String::from)
    }

    pub fn set_attr(&self, doc: &mut Document, name: &str, value: &str) -> Result<&Self> {
        self.for_each_node(doc, |node| node.set_attr(name, value))
    }

    pub fn remove_attr(&self, doc: &mut Document, name: &str) -> Result<&Self> {
        self.for_each_node(doc, |node| {
            node.remove_attr(name);
        })
    }

    /// Add space-separated class names to every element
    pub fn add_class(&self, doc: &mut Document, classes: &str) -> Result<&Self> {
        self.for_each_node(doc, |node| node.add_class(classes))
    }

    pub fn remove_class(&self, doc: &mut Document, classes: &str) -> Result<&Self> {
        self.for_each_node(doc, |node| node.remove_class(classes))
    }

    pub fn toggle_class(&self, doc: &mut Document, classes: &str) -> Result<&Self> {
        self.for_each_node(doc, |node| {
            node.toggle_class(classes);
        })
    }

    /// Whether any element carries the class token
    pub fn has_class(&self, doc: &Document, class: &str) -> bool {
        self.nodes
            .iter()
            .filter_map(|&node_id| doc.get(node_id).ok())
            .any(|node| node.has_class(class))
    }

    /// Clear the inline `display` so stylesheet rules apply again
    pub fn show(&self, doc: &mut Document) -> Result<&Self> {
        self.set_style(doc, "display", None)
    }

    pub fn hide(&self, doc: &mut Document) -> Result<&Self> {
        self.set_style(doc, "display", Some("none"))
    }

    fn set_style(
        &self,
        doc: &mut Document,
        property: &str,
        value: Option<&str>,
    ) -> Result<&Self> {
        self.for_each_node(doc, |node| {
            let current = node.attr("style").unwrap_or("");
            let style = dom_utils::update_style(current, property, value);
            if style.is_empty() {
                node.remove_attr("style");
            } else {
                node.set_attr("style", style);
            }
        })
    }

    // ---- content ----

    /// Text content of the first element
    pub fn text(&self, doc: &Document) -> Result<Option<String>> {
        match self.nodes.first() {
            Some(&node_id) => Ok(doc.text_content(node_id)?),
            None => Ok(None),
        }
    }

    /// Replace the content of every element with `text`
    pub fn set_text(&self, doc: &mut Document, text: &str) -> Result<&Self> {
        self.check_nodes(doc)?;
        for &node_id in &self.nodes {
            doc.set_text_content(node_id, text)?;
        }
        Ok(self)
    }

    /// Inner markup of the first element
    pub fn html(&self, doc: &Document) -> Result<Option<String>> {
        match self.nodes.first() {
            Some(&node_id) => Ok(Some(doc.inner_html(node_id)?)),
            None => Ok(None),
        }
    }

    /// Replace the content of every element with parsed `markup`
    pub fn set_html(&self, doc: &mut Document, markup: &str) -> Result<&Self> {
        tracing::debug!(
            "[Dommer] set html on {} nodes: {}",
            self.nodes.len(),
            dom_utils::cap_text_length(markup, 40)
        );
        self.check_nodes(doc)?;
        for &node_id in &self.nodes {
            doc.set_inner_html(node_id, markup)?;
        }
        Ok(self)
    }

    // ---- tree mutation ----

    /// Deep, detached copies of every element
    pub fn clone_nodes(&self, doc: &mut Document) -> Result<Self> {
        let mut copies = Vec::with_capacity(self.nodes.len());
        for &node_id in &self.nodes {
            copies.push(doc.clone_node(node_id, true)?);
        }
        Ok(self.derive(copies))
    }

    /// Append `content` to every element
    ///
    /// The first element receives the content nodes themselves (moving
    /// them if attached elsewhere); every further element gets deep clones.
    /// Every target and content node is checked before the tree changes, so
    /// an error leaves the document untouched.
    pub fn append(&self, doc: &mut Document, content: &Dommer) -> Result<&Self> {
        let arena = doc.arena();
        for (position, &target) in self.nodes.iter().enumerate() {
            if position == 0 {
                for &child in &content.nodes {
                    arena.check_append(target, child)?;
                }
            } else {
                arena.check_parent(target)?;
            }
        }

        for (position, &target) in self.nodes.iter().enumerate() {
            for &child in &content.nodes {
                let child = if position == 0 {
                    child
                } else {
                    doc.clone_node(child, true)?
                };
                doc.append_child(target, child)?;
            }
        }
        Ok(self)
    }

    /// Detach every element from its parent
    pub fn remove(&self, doc: &mut Document) -> Result<&Self> {
        self.check_nodes(doc)?;
        for &node_id in &self.nodes {
            doc.remove(node_id)?;
        }
        Ok(self)
    }

    fn first_node<'d>(&self, doc: &'d Document) -> Option<&'d DomNode> {
        let node_id = *self.nodes.first()?;
        doc.get(node_id).ok()
    }

    /// Fails on the first id the document does not hold
    ///
    /// Broadcast mutations run this first so they apply to all or none.
    fn check_nodes(&self, doc: &Document) -> Result<()> {
        for &node_id in &self.nodes {
            doc.get(node_id)?;
        }
        Ok(())
    }

    fn for_each_node<F>(&self, doc: &mut Document, mut apply: F) -> Result<&Self>
    where
        F: FnMut(&mut DomNode),
    {
        self.check_nodes(doc)?;
        for &node_id in &self.nodes {
            apply(doc.get_mut(node_id)?);
        }
        Ok(self)
    }
}

/// Drop repeated ids, keeping the first occurrence
fn dedup(ids: Vec<NodeId>) -> Vec<NodeId> {
    let mut seen = AHashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl FromIterator<NodeId> for Dommer {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Dommer {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatcherConfig;
    use dom::DomError;

    const PAGE: &str = r#"
        <ul id="menu">
          <li><a class="tag" href="/1" data-label="link1">one</a></li>
          <li><a class="tagline" href="/2">two</a>
            <ul><li><a id="deep" data-label="link3.2.3">three</a></li></ul>
          </li>
          <li class="last"><span>four</span></li>
        </ul>
        <p class="note">Notes</p>
    "#;

    fn page() -> Document {
        Document::parse_html(PAGE).unwrap()
    }

    fn texts(doc: &Document, collection: &Dommer) -> Vec<String> {
        collection.map(|_, id| doc.text_content(id).unwrap().unwrap_or_default())
    }

    #[test]
    fn select_from_document_root() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();
        assert_eq!(texts(&doc, &anchors), vec!["one", "two", "three"]);
    }

    #[test]
    fn find_flattens_contexts_without_duplicates() {
        let doc = page();
        // Both the outer and the nested list reach `#deep`.
        let lists = Dommer::select(&doc, "ul").unwrap();
        assert_eq!(lists.len(), 2);

        let anchors = lists.find(&doc, "a").unwrap();
        assert_eq!(texts(&doc, &anchors), vec!["one", "two", "three"]);

        let reversed = Dommer::new(lists.iter().rev()).find(&doc, "a").unwrap();
        assert_eq!(texts(&doc, &reversed), vec!["three", "one", "two"]);
    }

    #[test]
    fn find_rejects_empty_selector() {
        let doc = page();
        let root = Dommer::select(&doc, "ul").unwrap();
        assert!(matches!(root.find(&doc, ""), Err(DommerError::EmptySelector)));
        assert!(matches!(root.find(&doc, "  "), Err(DommerError::EmptySelector)));
        assert_eq!(
            DommerError::EmptySelector.to_string(),
            crate::messages::EMPTY_SELECTOR
        );
    }

    #[test]
    fn find_surfaces_native_selector_errors() {
        let doc = page();
        assert!(matches!(
            Dommer::select(&doc, "a:hover"),
            Err(DommerError::Dom(DomError::InvalidSelector { .. }))
        ));
    }

    #[test]
    fn find_without_matches_is_empty() {
        let doc = page();
        assert!(Dommer::select(&doc, "table").unwrap().is_empty());
    }

    #[test]
    fn eq_normalizes_negative_indices() {
        let doc = page();
        let items = Dommer::select(&doc, "#menu > li").unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items.eq(-1).unwrap().nodes(), &[items.nodes()[2]]);
        assert_eq!(items.eq(-3).unwrap().nodes(), &[items.nodes()[0]]);
        assert_eq!(items.eq(1).unwrap().nodes(), &[items.nodes()[1]]);

        assert!(matches!(
            items.eq(-4),
            Err(DommerError::IndexOutOfRange { index: -4, len: 3 })
        ));
        assert!(matches!(items.eq(3), Err(DommerError::IndexOutOfRange { .. })));
        assert!(Dommer::default().eq(0).is_err());
    }

    #[test]
    fn first_and_last() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        assert_eq!(texts(&doc, &anchors.first()), vec!["one"]);
        assert_eq!(texts(&doc, &anchors.last()), vec!["three"]);
        assert!(Dommer::default().first().is_empty());
    }

    #[test]
    fn filter_by_fragment_query() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        // Substring class matching: `.tag` also catches `tagline`.
        let tags = anchors.filter(&doc, ".tag");
        assert_eq!(texts(&doc, &tags), vec!["one", "two"]);

        let labelled = anchors.filter(&doc, "[data-label=\"link3.2.3\"]");
        assert_eq!(texts(&doc, &labelled), vec!["three"]);
    }

    #[test]
    fn strict_matcher_is_inherited() {
        let doc = page();
        let anchors = Dommer::select(&doc, "#menu")
            .unwrap()
            .with_matcher(Matcher::new(MatcherConfig::strict()))
            .find(&doc, "a")
            .unwrap();

        assert_eq!(texts(&doc, &anchors.filter(&doc, ".tag")), vec!["one"]);
        assert_eq!(anchors.parent(&doc).unwrap().matcher().config(), &MatcherConfig::strict());
        assert_eq!(Dommer::default().matcher(), &Matcher::default());
    }

    #[test]
    fn filter_by_predicate_keeps_order() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        let has_href = |_: usize, node: &DomNode| node.has_attr("href");
        let kept = anchors.filter(&doc, Query::Predicate(&has_href));

        let expected = anchors
            .iter()
            .filter(|&id| doc.get(id).unwrap().has_attr("href"))
            .count();
        assert_eq!(kept.len(), expected);
        assert_eq!(texts(&doc, &kept), vec!["one", "two"]);

        let is_odd = |position: usize, _: &DomNode| position % 2 == 1;
        let odd = anchors.filter(&doc, Query::Predicate(&is_odd));
        assert_eq!(texts(&doc, &odd), vec!["two"]);
    }

    #[test]
    fn filter_not_and_is_by_identity() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();
        let second = anchors.get(1).unwrap();

        assert_eq!(anchors.filter(&doc, second).nodes(), &[second]);
        assert_eq!(anchors.not(&doc, second).len(), 2);
        assert!(anchors.is(&doc, second));
        assert!(!anchors.is(&doc, doc.root_id().unwrap()));
    }

    #[test]
    fn index_finds_first_match() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        assert_eq!(anchors.index(&doc, "#deep"), Some(2));
        assert_eq!(anchors.index(&doc, "[href]"), Some(0));
        assert_eq!(anchors.index(&doc, "#nope"), None);
    }

    #[test]
    fn traversal() {
        let doc = page();
        let anchors = Dommer::select(&doc, "#menu > li > a").unwrap();
        let items = anchors.parent(&doc).unwrap();
        assert_eq!(items.len(), 2);

        let menu = items.parent(&doc).unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.attr(&doc, "id").as_deref(), Some("menu"));
        assert_eq!(menu.children(&doc).unwrap().len(), 3);

        let last = Dommer::select(&doc, "li.last").unwrap();
        assert_eq!(last.siblings(&doc).unwrap(), items);
    }

    #[test]
    fn attribute_mutation_chains() {
        let mut doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        anchors
            .set_attr(&mut doc, "target", "_blank")
            .unwrap()
            .remove_attr(&mut doc, "href")
            .unwrap();

        assert!(anchors.is(&doc, "[target=\"_blank\"]"));
        assert_eq!(anchors.filter(&doc, "[href]").len(), 0);
        assert_eq!(anchors.attr(&doc, "target").as_deref(), Some("_blank"));
        assert_eq!(Dommer::default().attr(&doc, "target"), None);
    }

    #[test]
    fn class_mutation() {
        let mut doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        anchors.add_class(&mut doc, "seen big").unwrap();
        assert_eq!(anchors.filter(&doc, ".seen.big").len(), 3);

        anchors.remove_class(&mut doc, "big").unwrap();
        assert!(!anchors.has_class(&doc, "big"));

        anchors.first().toggle_class(&mut doc, "seen").unwrap();
        assert_eq!(Dommer::select(&doc, "a.seen").unwrap().len(), 2);

        // Token semantics here, unlike fragment queries
        assert!(!anchors.has_class(&doc, "tagl"));
    }

    #[test]
    fn show_and_hide() {
        let mut doc = page();
        let note = Dommer::select(&doc, "p.note").unwrap();

        note.set_attr(&mut doc, "style", "color: red").unwrap();
        note.hide(&mut doc).unwrap();
        assert_eq!(
            note.attr(&doc, "style").as_deref(),
            Some("color: red; display: none;")
        );

        note.show(&mut doc).unwrap();
        assert_eq!(note.attr(&doc, "style").as_deref(), Some("color: red;"));

        let items = Dommer::select(&doc, "li").unwrap();
        items.hide(&mut doc).unwrap().show(&mut doc).unwrap();
        assert!(!items.is(&doc, "[style]"));
    }

    #[test]
    fn text_reads_first_and_broadcasts_writes() {
        let mut doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        let first = anchors.text(&doc).unwrap();
        assert_eq!(first.as_deref(), Some("one"));
        assert_eq!(anchors.text(&doc).unwrap(), first);

        anchors.set_text(&mut doc, "x & y").unwrap();
        assert_eq!(texts(&doc, &anchors), vec!["x & y"; 3]);
        assert_eq!(anchors.html(&doc).unwrap().as_deref(), Some("x &amp; y"));
        assert_eq!(Dommer::default().text(&doc).unwrap(), None);
    }

    #[test]
    fn html_reads_first_and_broadcasts_writes() {
        let mut doc = page();
        let items = Dommer::select(&doc, "#menu > li").unwrap();

        let first = items.html(&doc).unwrap();
        assert_eq!(items.html(&doc).unwrap(), first);

        items.set_html(&mut doc, "<b class=\"x\">new</b>").unwrap();
        assert_eq!(Dommer::select(&doc, "li > b.x").unwrap().len(), 3);
        assert_eq!(
            items.html(&doc).unwrap().as_deref(),
            Some("<b class=\"x\">new</b>")
        );
        assert!(Dommer::select(&doc, "#deep").unwrap().is_empty());
    }

    #[test]
    fn hide_keeps_declarations_with_inner_semicolons() {
        let mut doc = Document::parse_html(
            r#"<p style="background: url(data:image/png;base64,AAAA); color: red">x</p>"#,
        )
        .unwrap();
        let p = Dommer::select(&doc, "p").unwrap();

        p.hide(&mut doc).unwrap();
        assert_eq!(
            p.attr(&doc, "style").as_deref(),
            Some("background: url(data:image/png;base64,AAAA); color: red; display: none;")
        );

        p.show(&mut doc).unwrap();
        assert_eq!(
            p.attr(&doc, "style").as_deref(),
            Some("background: url(data:image/png;base64,AAAA); color: red;")
        );
    }

    #[test]
    fn set_html_on_table_body_keeps_rows() {
        let mut doc =
            Document::parse_html("<table><tbody><tr><td>a</td></tr></tbody></table>").unwrap();
        let body = Dommer::select(&doc, "tbody").unwrap();

        body.set_html(&mut doc, "<tr><td>b</td></tr>").unwrap();
        assert_eq!(body.html(&doc).unwrap().as_deref(), Some("<tr><td>b</td></tr>"));
        assert_eq!(Dommer::select(&doc, "td").unwrap().len(), 1);
    }

    #[test]
    fn failed_mutation_leaves_document_untouched() {
        let mut doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();
        let with_stale = Dommer::new(anchors.iter().chain([9999]));
        let before = doc.outer_html(doc.root_id().unwrap()).unwrap();

        assert!(with_stale.add_class(&mut doc, "x").is_err());
        assert!(with_stale.set_text(&mut doc, "gone").is_err());
        assert!(with_stale.remove(&mut doc).is_err());
        assert_eq!(doc.outer_html(doc.root_id().unwrap()).unwrap(), before);
    }

    #[test]
    fn failed_append_leaves_document_untouched() {
        let mut doc = page();
        let menu = Dommer::select(&doc, "#menu").unwrap();
        let items = Dommer::select(&doc, "#menu > li").unwrap();
        let before = doc.outer_html(doc.root_id().unwrap()).unwrap();

        // The menu cannot go inside its own items.
        assert!(matches!(
            items.append(&mut doc, &menu),
            Err(DommerError::Dom(DomError::HierarchyRequest(_)))
        ));

        // A text node target further down is rejected before the first one changes.
        let text = doc.create_text("t");
        let badge = Dommer::create(&mut doc, "em");
        let targets = Dommer::new([items.nodes()[0], text]);
        assert!(matches!(
            targets.append(&mut doc, &badge),
            Err(DommerError::Dom(DomError::InvalidNodeType { .. }))
        ));

        assert_eq!(doc.outer_html(doc.root_id().unwrap()).unwrap(), before);
        assert!(badge.parent(&doc).unwrap().is_empty());
    }

    #[test]
    fn create_append_clone_and_remove() {
        let mut doc = page();
        let items = Dommer::select(&doc, "#menu > li").unwrap();

        let badge = Dommer::create(&mut doc, "em");
        badge.set_text(&mut doc, "new").unwrap();
        items.append(&mut doc, &badge).unwrap();

        let badges = Dommer::select(&doc, "li > em").unwrap();
        assert_eq!(badges.len(), 3);
        assert_eq!(badges.get(0), badge.get(0));

        let copies = badges.clone_nodes(&mut doc).unwrap();
        assert_eq!(copies.len(), 3);
        assert!(copies.parent(&doc).unwrap().is_empty());

        badges.remove(&mut doc).unwrap();
        assert!(Dommer::select(&doc, "em").unwrap().is_empty());
        assert_eq!(texts(&doc, &copies), vec!["new"; 3]);
    }

    #[test]
    fn from_source_dispatches_on_shape() {
        let doc = page();
        let by_selector = Dommer::from_source(&doc, "li").unwrap();
        assert_eq!(by_selector.len(), 4);

        let first = by_selector.get(0).unwrap();
        assert_eq!(Dommer::from_source(&doc, first).unwrap().nodes(), &[first]);

        let many = Dommer::from_source(&doc, by_selector.nodes()).unwrap();
        assert_eq!(many, by_selector);

        assert!(matches!(
            Dommer::from_source(&doc, 9999u32),
            Err(DommerError::Dom(DomError::NodeNotFound(9999)))
        ));
    }

    #[test]
    fn select_within_explicit_context() {
        let doc = page();
        let deep_list = Dommer::select(&doc, "li ul").unwrap().get(0).unwrap();
        let inner = Dommer::select_within(&doc, "a", deep_list).unwrap();
        assert_eq!(texts(&doc, &inner), vec!["three"]);
    }

    #[test]
    fn each_visits_in_order() {
        let doc = page();
        let anchors = Dommer::select(&doc, "a").unwrap();

        let mut visited = Vec::new();
        anchors
            .each(|position, id| visited.push((position, id)))
            .each(|_, _| {});
        assert_eq!(visited.len(), 3);
        assert_eq!(visited[2], (2, anchors.get(2).unwrap()));

        let collected: Dommer = anchors.iter().collect();
        assert_eq!(collected, anchors);
        assert_eq!((&anchors).into_iter().count(), 3);
    }
}
