//! In-memory DOM for dommer
//!
//! An owned stand-in for the browser document: an arena tree that can be
//! loaded from HTML markup or a CDP snapshot, searched with a native
//! selector engine, serialized back to markup and mutated in place.
//!
//! ## Core Design
//!
//! ```text
//! HTML / CDP JSON → DomArena (owned) → NodeId (u32) handles
//!                        ↓
//!        query_selector_all / text / html / mutation
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod parser;
pub mod select;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::Document;
pub use error::{DomError, Result};
pub use select::SelectorList;
pub use serializer::{DomSerializer, SerializerConfig};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_document_roundtrip() {
        let markup = "<html><head></head><body><p class=\"a\">x</p></body></html>";
        let doc = Document::parse_html(markup).unwrap();
        assert_eq!(doc.outer_html(doc.root_id().unwrap()).unwrap(), markup);
    }
}
