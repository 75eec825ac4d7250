use scraper::Html;
use tracing::debug;

use crate::classify::classify;
use crate::document::{QueryDocument, QueryNode};
use crate::extract::selectors::MATCH;
use crate::model::ScrapeResult;

/// Walks the top-level match containers in page order and partitions the
/// classified records into live and upcoming. Containers nested inside
/// another container are wrapper duplicates and are ignored.
pub fn normalize_page<D: QueryDocument>(doc: &D, base_url: &str) -> ScrapeResult {
    let mut result = ScrapeResult::default();
    let mut skipped = 0usize;

    for node in doc.find_all(MATCH) {
        if node.has_ancestor(MATCH) {
            continue;
        }
        match classify(&node, base_url) {
            Some(record) if record.is_live => result.live_matches.push(record),
            Some(record) => result.upcoming_matches.push(record),
            None => skipped += 1,
        }
    }

    debug!(
        live = result.live_matches.len(),
        upcoming = result.upcoming_matches.len(),
        skipped,
        "normalized match listing"
    );
    result
}

pub fn normalize_html(html: &str, base_url: &str) -> ScrapeResult {
    let doc = Html::parse_document(html);
    normalize_page(&doc, base_url)
}
