//! Read-only query surface over a parsed page.
//!
//! Extraction code is written against [`QueryDocument`] / [`QueryNode`] only,
//! so the same field logic runs whether the HTML came from the headless
//! renderer or from a plain HTTP fetch.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// One element of a parsed document.
pub trait QueryNode: Sized {
    /// All descendants matching `selector`, in document order.
    fn find_all(&self, selector: &str) -> Vec<Self>;

    fn find_first(&self, selector: &str) -> Option<Self> {
        self.find_all(selector).into_iter().next()
    }

    /// Concatenated descendant text, trimmed.
    fn text_content(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    /// True when any ancestor (not the node itself) matches `selector`.
    fn has_ancestor(&self, selector: &str) -> bool;
}

/// A whole parsed page.
pub trait QueryDocument {
    type Node<'a>: QueryNode
    where
        Self: 'a;

    fn find_all<'a>(&'a self, selector: &str) -> Vec<Self::Node<'a>>;

    fn find_first<'a>(&'a self, selector: &str) -> Option<Self::Node<'a>> {
        self.find_all(selector).into_iter().next()
    }
}

/// Invalid selectors match nothing instead of failing the extraction.
fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!("invalid selector {selector:?}: {e}");
            None
        }
    }
}

impl<'a> QueryNode for ElementRef<'a> {
    fn find_all(&self, selector: &str) -> Vec<Self> {
        match parse_selector(selector) {
            Some(parsed) => self.select(&parsed).collect(),
            None => Vec::new(),
        }
    }

    fn text_content(&self) -> String {
        ElementRef::text(self).collect::<String>().trim().to_string()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn has_ancestor(&self, selector: &str) -> bool {
        let Some(parsed) = parse_selector(selector) else {
            return false;
        };
        self.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| parsed.matches(&ancestor))
    }
}

impl QueryDocument for Html {
    type Node<'a> = ElementRef<'a>;

    fn find_all<'a>(&'a self, selector: &str) -> Vec<ElementRef<'a>> {
        match parse_selector(selector) {
            Some(parsed) => self.select(&parsed).collect(),
            None => Vec::new(),
        }
    }
}

/// Returns `Some` only for text that is non-empty after trimming.
pub fn non_empty(text: impl AsRef<str>) -> Option<String> {
    let trimmed = text.as_ref().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
