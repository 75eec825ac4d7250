//! Second pass over live matches: fetch each incomplete match's own page and
//! fill the stream, time and event gaps left by the listing.

use scraper::Html;
use tracing::debug;

use crate::classify::derive_stream_url;
use crate::config::ScraperConfig;
use crate::document::{non_empty, QueryDocument, QueryNode};
use crate::extract::format_unix_millis;
use crate::extract::normalize_stream_link;
use crate::extract::selectors::*;
use crate::model::{MatchRecord, ScrapeResult, UNKNOWN_EVENT};
use crate::provider::{DocumentProvider, PageRequest};

/// Values found on a match detail page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub stream: Option<String>,
    pub time: Option<String>,
    pub event: Option<String>,
}

pub fn extract_detail_fields<D: QueryDocument>(doc: &D, base_url: &str) -> DetailFields {
    DetailFields {
        stream: detail_stream(doc, base_url),
        time: detail_time(doc),
        event: detail_event(doc),
    }
}

fn detail_stream<D: QueryDocument>(doc: &D, base_url: &str) -> Option<String> {
    doc.find_first(DETAIL_STREAM_BUTTON)
        .and_then(|btn| btn.attr("href"))
        .and_then(|href| normalize_stream_link(&href, base_url))
}

fn detail_time<D: QueryDocument>(doc: &D) -> Option<String> {
    let date = doc
        .find_first(DETAIL_DATE)
        .or_else(|| doc.find_first(UNIX_TIME))?;

    date.attr("data-unix")
        .and_then(|raw| format_unix_millis(&raw))
        .or_else(|| non_empty(date.text_content()))
}

fn detail_event<D: QueryDocument>(doc: &D) -> Option<String> {
    let from_logo = doc.find_first(DETAIL_EVENT_LOGO).and_then(|logo| {
        logo.attr("title").and_then(non_empty).or_else(|| {
            logo.find_first(DETAIL_EVENT_LOGO_IMG)
                .and_then(|img| img.attr("alt"))
                .and_then(non_empty)
        })
    });

    from_logo.or_else(|| {
        doc.find_first(DETAIL_EVENT_TEXT)
            .and_then(|el| non_empty(el.text_content()))
    })
}

/// Returns a copy of `record` with only its gap fields replaced by what the
/// detail page offered. `stream_url` is re-derived afterwards.
pub fn fill_gaps(record: &MatchRecord, details: DetailFields, base_url: &str) -> MatchRecord {
    let mut patched = record.clone();

    if patched.stream.is_none() {
        patched.stream = details.stream;
    }
    if patched.time.is_none() {
        patched.time = details.time;
    }
    if patched.event == UNKNOWN_EVENT {
        if let Some(event) = details.event {
            patched.event = event;
        }
    }

    patched.stream_url = derive_stream_url(
        patched.is_live,
        patched.match_id.as_deref(),
        patched.stream.as_deref(),
        base_url,
    );
    patched
}

pub fn enrich_from_html(record: &MatchRecord, html: &str, base_url: &str) -> MatchRecord {
    let doc = Html::parse_document(html);
    let details = extract_detail_fields(&doc, base_url);
    fill_gaps(record, details, base_url)
}

/// Fetches detail pages one at a time for live matches that still have
/// gaps. A failed fetch leaves that record untouched; upcoming matches are
/// passed through as-is.
pub async fn enrich_live_matches<P>(
    result: ScrapeResult,
    provider: &P,
    config: &ScraperConfig,
) -> ScrapeResult
where
    P: DocumentProvider + ?Sized,
{
    let ScrapeResult {
        live_matches,
        upcoming_matches,
    } = result;

    let mut enriched = Vec::with_capacity(live_matches.len());
    for record in live_matches {
        if !record.needs_enrichment() {
            enriched.push(record);
            continue;
        }
        let Some(link) = record.link.clone() else {
            enriched.push(record);
            continue;
        };

        let request = PageRequest::new(link, config.render_timeout);
        match provider.load(&request).await {
            Ok(html) => enriched.push(enrich_from_html(&record, &html, &config.hltv_base_url)),
            Err(e) => {
                debug!(url = %request.url, "detail enrichment skipped: {e}");
                enriched.push(record);
            }
        }
    }

    ScrapeResult {
        live_matches: enriched,
        upcoming_matches,
    }
}
