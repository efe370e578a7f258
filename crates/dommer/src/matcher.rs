//! Selector predicate matcher
//!
//! Decides whether one element satisfies the id, class and attribute
//! fragments embedded in a query string such as `.tag#main[data-x="1"]`.
//! There is no selector grammar here: three fixed regular expressions pull
//! fragments out of the query and each fragment is checked on its own.
//! Combinators are the native engine's business (`Document::query_selector_all`).
//!
//! Evaluation:
//!
//! ```text
//! query ──▶ [attr] scan ──▶ mask brackets ──▶ .class scan, #id scan
//!                                                   │
//!            per category: every fragment must hold (absent if none)
//!                                                   │
//!            across categories: Any (default) or All
//! ```
//!
//! A query with no recognizable fragment matches every element. Nothing
//! here ever fails; unrecognized syntax is simply not extracted.

use std::sync::LazyLock;

use dom::DomNode;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CLASS_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([A-Za-z0-9_$-]+)").expect("class pattern is valid"));

static ID_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_$-]+)").expect("id pattern is valid"));

static ATTRIBUTE_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("attribute pattern is valid"));

/// What the matcher needs from an element
///
/// Anything with a class value, an id value and attribute lookup can be
/// matched; [`DomNode`] is the implementation the collection uses.
pub trait Matchable {
    /// Raw value of the `class` attribute, empty when absent
    fn class_name(&self) -> &str;

    /// Raw value of the `id` attribute, empty when absent
    fn id(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

impl Matchable for DomNode {
    fn class_name(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    fn id(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attr(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.has_attr(name)
    }
}

/// How category results combine into the final answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    /// Satisfying any one category with fragments is enough
    #[default]
    Any,
    /// Every category with fragments must be satisfied
    All,
}

/// How a class or id fragment is compared with the element's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatch {
    /// Containment anywhere in the raw value: `.tag` matches `tagline`
    #[default]
    Substring,
    /// Membership in the whitespace-separated token set
    Token,
}

impl TextMatch {
    fn test(self, value: &str, fragment: &str) -> bool {
        match self {
            TextMatch::Substring => value.contains(fragment),
            TextMatch::Token => value.split_ascii_whitespace().any(|token| token == fragment),
        }
    }
}

/// Matcher configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub combination: Combination,
    pub class_match: TextMatch,
    pub id_match: TextMatch,
}

impl MatcherConfig {
    /// What most selector engines do: every category, whole tokens
    pub fn strict() -> Self {
        Self {
            combination: Combination::All,
            class_match: TextMatch::Token,
            id_match: TextMatch::Token,
        }
    }
}

/// `[name]` or `[name=value]` with brackets and quotes stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFragment {
    pub name: String,
    /// `None` means presence is enough
    pub value: Option<String>,
}

impl AttributeFragment {
    /// Build from the text between the brackets; `None` for an empty name
    fn parse(inner: &str) -> Option<Self> {
        let stripped = inner.replace(|c: char| c == '"' || c == '\'', "");
        let (name, value) = match stripped.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (stripped.trim(), None),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            value: value.filter(|v| !v.is_empty()).map(String::from),
        })
    }

    fn holds<M: Matchable + ?Sized>(&self, element: &M) -> bool {
        match &self.value {
            Some(expected) => element.attribute(&self.name) == Some(expected.as_str()),
            None => element.has_attribute(&self.name),
        }
    }
}

/// Fragments extracted from one query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    /// Class names, leading `.` stripped
    pub classes: Vec<String>,
    /// Ids, leading `#` stripped
    pub ids: Vec<String>,
    pub attributes: Vec<AttributeFragment>,
}

impl Fragments {
    pub fn extract(query: &str) -> Self {
        let mut attributes = Vec::new();
        let mut masked = query.to_string();

        for captures in ATTRIBUTE_FRAGMENT.captures_iter(query) {
            let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if let Some(fragment) = AttributeFragment::parse(inner.as_str()) {
                attributes.push(fragment);
            }
            // Dots and hashes inside attribute values are not fragments.
            masked.replace_range(whole.range(), &" ".repeat(whole.len()));
        }

        Self {
            classes: capture_names(&CLASS_FRAGMENT, &masked),
            ids: capture_names(&ID_FRAGMENT, &masked),
            attributes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.ids.is_empty() && self.attributes.is_empty()
    }
}

fn capture_names(pattern: &Regex, haystack: &str) -> Vec<String> {
    pattern
        .captures_iter(haystack)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}

/// Configured fragment matcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Whether `element` satisfies the fragments of `query`
    pub fn matches<M: Matchable + ?Sized>(&self, element: &M, query: &str) -> bool {
        let fragments = Fragments::extract(query);
        let matched = self.matches_fragments(element, &fragments);
        tracing::trace!("[Matcher] '{}' -> {}", query, matched);
        matched
    }

    /// Same as [`Matcher::matches`] with fragments extracted up front
    pub fn matches_fragments<M: Matchable + ?Sized>(
        &self,
        element: &M,
        fragments: &Fragments,
    ) -> bool {
        let categories = [
            self.id_category(element, &fragments.ids),
            self.class_category(element, &fragments.classes),
            attribute_category(element, &fragments.attributes),
        ];

        let mut evaluated = categories.into_iter().flatten().peekable();
        if evaluated.peek().is_none() {
            return true;
        }

        match self.config.combination {
            Combination::Any => evaluated.any(|satisfied| satisfied),
            Combination::All => evaluated.all(|satisfied| satisfied),
        }
    }

    fn class_category<M: Matchable + ?Sized>(
        &self,
        element: &M,
        classes: &[String],
    ) -> Option<bool> {
        if classes.is_empty() {
            return None;
        }
        let value = element.class_name();
        Some(classes.iter().all(|class| self.config.class_match.test(value, class)))
    }

    fn id_category<M: Matchable + ?Sized>(&self, element: &M, ids: &[String]) -> Option<bool> {
        if ids.is_empty() {
            return None;
        }
        let value = element.id();
        Some(ids.iter().all(|id| self.config.id_match.test(value, id)))
    }
}

fn attribute_category<M: Matchable + ?Sized>(
    element: &M,
    attributes: &[AttributeFragment],
) -> Option<bool> {
    if attributes.is_empty() {
        return None;
    }
    Some(attributes.iter().all(|fragment| fragment.holds(element)))
}

/// Class category alone under default settings; `None` when the query has no class fragment
pub fn has_class<M: Matchable + ?Sized>(element: &M, query: &str) -> Option<bool> {
    Matcher::default().class_category(element, &Fragments::extract(query).classes)
}

/// Id category alone under default settings; `None` when the query has no id fragment
pub fn has_id<M: Matchable + ?Sized>(element: &M, query: &str) -> Option<bool> {
    Matcher::default().id_category(element, &Fragments::extract(query).ids)
}

/// Attribute category alone; `None` when the query has no attribute fragment
pub fn has_attribute<M: Matchable + ?Sized>(element: &M, query: &str) -> Option<bool> {
    attribute_category(element, &Fragments::extract(query).attributes)
}

/// Default-configured match: id, class or attribute category satisfied
pub fn has_match<M: Matchable + ?Sized>(element: &M, query: &str) -> bool {
    Matcher::default().matches(element, query)
}
