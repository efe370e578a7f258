//! User-facing messages for invalid arguments

pub const EMPTY_SELECTOR: &str = "The find method needs to receive a non-empty selector!";

pub const INDEX_OUT_OF_RANGE: &str = "The eq method needs to receive an index inside the collection!";
