//! Native selector engine behind `Document::query_selector_all`
//!
//! Covers the selector subset real pages use for descendant lookup:
//! selector lists, type and universal selectors, `.class`, `#id`,
//! attribute selectors with the `=`, `~=`, `|=`, `^=`, `$=` and `*=`
//! operators, and the descendant, child, next-sibling and
//! subsequent-sibling combinators. Pseudo-classes are rejected.
//!
//! Matching runs right-to-left: the rightmost compound is tested against
//! the candidate, then combinators walk up (or back) through the tree.

use std::iter::Peekable;
use std::str::Chars;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Combinator {
    /// ` `
    #[default]
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[a=v]`
    Equals,
    /// `[a~=v]`, whitespace-separated token
    Includes,
    /// `[a|=v]`, exact or followed by `-`
    DashMatch,
    /// `[a^=v]`
    Prefix,
    /// `[a$=v]`
    Suffix,
    /// `[a*=v]`
    Substring,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<(AttributeOperator, String)>,
}

impl AttributeSelector {
    fn matches(&self, node: &DomNode) -> bool {
        let Some(actual) = node.attr(&self.name) else {
            return false;
        };

        let Some((operator, expected)) = &self.matcher else {
            return true;
        };

        match operator {
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Includes => actual
                .split_ascii_whitespace()
                .any(|token| token == expected),
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            // Empty operands never match for the substring operators.
            AttributeOperator::Prefix => {
                !expected.is_empty() && actual.starts_with(expected.as_str())
            }
            AttributeOperator::Suffix => {
                !expected.is_empty() && actual.ends_with(expected.as_str())
            }
            AttributeOperator::Substring => {
                !expected.is_empty() && actual.contains(expected.as_str())
            }
        }
    }
}

/// A run of simple selectors with no combinator in between
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Lower-case tag name; `None` for `*` or when omitted
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }

    pub fn matches(&self, node: &DomNode) -> bool {
        if !node.is_element() {
            return false;
        }

        if let Some(tag) = &self.tag {
            if !node.node_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        self.ids.iter().all(|id| node.attr("id") == Some(id.as_str()))
            && self.classes.iter().all(|class| node.has_class(class))
            && self.attributes.iter().all(|attr| attr.matches(node))
    }
}

/// One complex selector: compounds joined by combinators, left to right
///
/// `parts[0].0` is unused; `parts[i].0` links `parts[i - 1]` to `parts[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> Result<bool> {
        match self.parts.len() {
            0 => Ok(false),
            len => self.matches_at(arena, len - 1, node_id),
        }
    }

    fn matches_at(&self, arena: &DomArena, index: usize, node_id: NodeId) -> Result<bool> {
        let node = arena.get(node_id)?;
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(node) {
            return Ok(false);
        }
        if index == 0 {
            return Ok(true);
        }

        match combinator {
            Combinator::Descendant => {
                let mut current = node.parent_id;
                while let Some(ancestor) = current {
                    if self.matches_at(arena, index - 1, ancestor)? {
                        return Ok(true);
                    }
                    current = arena.get(ancestor)?.parent_id;
                }
                Ok(false)
            }
            Combinator::Child => match node.parent_id {
                Some(parent) => self.matches_at(arena, index - 1, parent),
                None => Ok(false),
            }
            Combinator::NextSibling => match previous_element_siblings(arena, node)?.first() {
                Some(&sibling) => self.matches_at(arena, index - 1, sibling),
                None => Ok(false),
            }
            Combinator::SubsequentSibling => {
                for sibling in previous_element_siblings(arena, node)? {
                    if self.matches_at(arena, index - 1, sibling)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

/// Element siblings before `node`, nearest first
fn previous_element_siblings(arena: &DomArena, node: &DomNode) -> Result<Vec<NodeId>> {
    let Some(parent_id) = node.parent_id else {
        return Ok(Vec::new());
    };

    let parent = arena.get(parent_id)?;
    let mut siblings = Vec::new();
    for &sibling in parent.children_ids.iter() {
        if sibling == node.node_id {
            break;
        }
        if arena.get(sibling)?.is_element() {
            siblings.push(sibling);
        }
    }
    siblings.reverse();
    Ok(siblings)
}

/// A parsed, comma-separated selector list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self> {
        SelectorParser::new(source).parse_list()
    }

    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> Result<bool> {
        for selector in &self.selectors {
            if selector.matches(arena, node_id)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Matching descendants of `context` in document order
    pub fn query_all(&self, arena: &DomArena, context: NodeId) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        for node_id in arena.descendants(context)? {
            if self.matches(arena, node_id)? {
                found.push(node_id);
            }
        }
        Ok(found)
    }
}

struct SelectorParser<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> SelectorParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {
            skipped = true;
        }
        skipped
    }

    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut selectors = vec![self.parse_complex()?];
        while self.chars.next_if_eq(&',').is_some() {
            selectors.push(self.parse_complex()?);
        }

        if let Some(&c) = self.chars.peek() {
            return Err(self.error(format!("unexpected character '{}'", c)));
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        self.skip_whitespace();
        let mut parts = vec![(Combinator::Descendant, self.parse_compound()?)];

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.chars.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_whitespace => {
                    parts.push((Combinator::Descendant, self.parse_compound()?));
                    continue;
                }
                Some(&c) => return Err(self.error(format!("unexpected character '{}'", c))),
            };
            self.chars.next();
            self.skip_whitespace();
            parts.push((combinator, self.parse_compound()?));
        }

        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector> {
        let mut compound = CompoundSelector::default();
        let mut universal = false;

        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                universal = true;
            }
            Some(&c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.chars.peek() {
                Some('.') => {
                    self.chars.next();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('#') => {
                    self.chars.next();
                    compound.ids.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attributes.push(self.parse_attribute()?);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.chars.next_if(|&c| is_ident_char(c)) {
            ident.push(c);
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let operator = match self.chars.next() {
            Some(']') => return Ok(AttributeSelector { name, matcher: None }),
            Some('=') => AttributeOperator::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.chars.next() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{}'", c)));
                }
                match c {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    _ => AttributeOperator::Substring,
                }
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.chars.peek() {
            Some(&quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
                value
            }
            _ => self.parse_ident()?,
        };

        self.skip_whitespace();
        if self.chars.next() != Some(']') {
            return Err(self.error("expected ']'"));
        }

        Ok(AttributeSelector {
            name,
            matcher: Some((operator, value)),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
