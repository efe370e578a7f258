//! dommer - chainable element collections
//!
//! A small jQuery-style layer over the [`dom`] crate: wrap nodes in a
//! [`Dommer`], narrow them with native selectors ([`Dommer::find`]) or
//! fragment queries ([`Dommer::filter`]), then read or mutate them in bulk.
//!
//! ## Fragment queries
//!
//! `filter`, `not`, `is` and `index` do not run a full selector engine.
//! They pull `.class`, `#id` and `[attr=value]` fragments out of the query
//! text and test each element against them, see [`matcher`].

pub mod collection;
pub mod error;
pub mod matcher;
pub mod messages;
pub mod query;
pub mod utils;

pub use collection::Dommer;
pub use error::{DommerError, Result};
pub use matcher::{Combination, Matchable, Matcher, MatcherConfig, TextMatch};
pub use query::{Query, Source};
