//! Error types for collection operations
//!
//! Invalid arguments surface immediately; a query that matches nothing is
//! not an error and yields an empty collection instead.

use dom::DomError;
use thiserror::Error;

use crate::messages;

pub type Result<T> = std::result::Result<T, DommerError>;

#[derive(Debug, Error)]
pub enum DommerError {
    #[error("{}", messages::EMPTY_SELECTOR)]
    EmptySelector,

    #[error("{} (index {index}, length {len})", messages::INDEX_OUT_OF_RANGE)]
    IndexOutOfRange { index: isize, len: usize },

    #[error(transparent)]
    Dom(#[from] DomError),
}
