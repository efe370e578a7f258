//! DOM Serializer - Convert the arena tree back to HTML markup
//!
//! This module handles:
//! - `innerHTML` / `outerHTML` style serialization
//! - Text and attribute escaping
//! - Void and raw-text elements

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerConfig {
    pub include_comments: bool,
    pub include_doctype: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_comments: true,
            include_doctype: true,
        }
    }
}

/// DOM Tree Serializer
#[derive(Debug, Clone, Default)]
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Markup of the node itself and its subtree
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(arena, node_id, false, &mut output)?;
        Ok(output)
    }

    /// Markup of the node's children
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let node = arena.get(node_id)?;
        let raw = node.tag_name().is_some_and(is_raw_text_element);

        let mut output = String::with_capacity(256);
        for &child_id in &node.children_ids {
            self.serialize_node(arena, child_id, raw, &mut output)?;
        }
        Ok(output)
    }

    /// Serialize a single node recursively
    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        raw_text: bool,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;

        match node.node_type {
            NodeType::Element => {
                // Format: <tag id="123" class="foo">
                output.push('<');
                output.push_str(&node.node_name);
                for attr in &node.attributes {
                    output.push(' ');
                    output.push_str(&attr.name);
                    output.push_str("=\"");
                    escape_into(&attr.value, true, output);
                    output.push('"');
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&node.node_name.as_str()) {
                    return Ok(());
                }

                let raw = is_raw_text_element(&node.node_name);
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, raw, output)?;
                }

                output.push_str("</");
                output.push_str(&node.node_name);
                output.push('>');
            }
            NodeType::Text | NodeType::CdataSection => {
                if raw_text {
                    output.push_str(&node.node_value);
                } else {
                    escape_into(&node.node_value, false, output);
                }
            }
            NodeType::Comment => {
                if self.config.include_comments {
                    output.push_str("<!--");
                    output.push_str(&node.node_value);
                    output.push_str("-->");
                }
            }
            NodeType::DocumentType => {
                if self.config.include_doctype {
                    output.push_str("<!DOCTYPE ");
                    output.push_str(&node.node_name);
                    output.push('>');
                }
            }
            NodeType::Document | NodeType::DocumentFragment => {
                // For document nodes, just serialize children
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, false, output)?;
                }
            }
            _ => {
                // Nothing else has an HTML serialization
            }
        }

        Ok(())
    }
}

fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// HTML escaping as the fragment serialization algorithm does it
fn escape_into(text: &str, attribute_mode: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if attribute_mode => output.push_str("&quot;"),
            '<' if !attribute_mode => output.push_str("&lt;"),
            '>' if !attribute_mode => output.push_str("&gt;"),
            c => output.push(c),
        }
    }
}
