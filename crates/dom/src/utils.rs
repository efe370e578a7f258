//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType};

/// Cap text length to keep log lines short
pub fn cap_text_length(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((end, _)) => format!("{}...", &text[..end]),
    }
}

/// All text content from node and its descendants, as `textContent`
///
/// Text of a text or comment node is its own data; documents have none.
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<Option<String>> {
    let node = arena.get(node_id)?;
    match node.node_type {
        NodeType::Document | NodeType::DocumentType => return Ok(None),
        NodeType::Text | NodeType::CdataSection | NodeType::Comment => {
            return Ok(Some(node.node_value.clone()))
        }
        _ => {}
    }

    let mut text = String::new();
    arena.traverse_df(node_id, |node| {
        if matches!(node.node_type, NodeType::Text | NodeType::CdataSection) {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(Some(text))
}

/// Split a declaration list on top-level `;`
///
/// Semicolons inside strings (`content: "a;b"`), escapes and parenthesized
/// blocks (`url(data:image/png;base64,...)`) do not end a declaration.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut declarations = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = style.char_indices();

    while let Some((index, c)) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                chars.next();
            }
            (Some(end), c) if c == end => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                declarations.push(&style[start..index]);
                start = index + 1;
            }
            (None, _) => {}
        }
    }

    declarations.push(&style[start..]);
    declarations
}

/// Split an inline `style` attribute into `(property, value)` pairs
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    split_declarations(style)
        .into_iter()
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some((property.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Serialize declarations back into a `style` attribute value
pub fn format_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{}: {};", property, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Set (or with `None`, remove) one property in an inline style string
pub fn update_style(style: &str, property: &str, value: Option<&str>) -> String {
    let property = property.to_ascii_lowercase();
    let mut declarations = parse_style(style);
    let position = declarations.iter().position(|(name, _)| *name == property);

    match (position, value) {
        (Some(index), Some(value)) => declarations[index].1 = value.to_string(),
        (None, Some(value)) => declarations.push((property, value.to_string())),
        (Some(index), None) => {
            declarations.remove(index);
        }
        (None, None) => {}
    }

    format_style(&declarations)
}
