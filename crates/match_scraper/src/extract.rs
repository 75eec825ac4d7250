//! Field extractors for one HLTV match node.
//!
//! Every extractor tolerates missing markup: absence comes back as `None`
//! (or `BestOf::Unknown` / the "Unknown" event), never as an error.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::document::{non_empty, QueryNode};
use crate::model::{BestOf, MapScore, UNKNOWN_EVENT};

/// CSS selectors used on the HLTV listing and detail pages.
pub mod selectors {
    pub const MATCH: &str = ".match";
    pub const LIVE_MARKER: &str = ".match-meta-live";
    pub const META: &str = ".match-meta";
    pub const TEAM_NAME: &str = ".match-teamname";
    pub const TEAM_LOGO: &str = ".match-team-logo";
    pub const EVENT: &str = ".match-event .text-ellipsis";
    pub const LINK: &str = "a";
    pub const MAP_SCORE: &str = ".map-score span";
    pub const MATCH_TIME: &str = ".matchTime";
    pub const INFO_ROW_TIME: &str = ".match-info-row .time";
    pub const UNIX_TIME: &str = "[data-unix]";
    pub const STREAM_LINK: &str = ".stream-box a";

    pub const DETAIL_STREAM_BUTTON: &str = ".match-streams-btn-external";
    pub const DETAIL_DATE: &str = ".date";
    pub const DETAIL_EVENT_LOGO: &str = ".event-logo";
    pub const DETAIL_EVENT_LOGO_IMG: &str = "img";
    pub const DETAIL_EVENT_TEXT: &str = ".event .text-ellipsis";
}

use selectors::*;

const EXTERNAL_REDIRECT_PREFIX: &str = "/external?url=";
const DEFAULT_SERIES_LENGTH: u32 = 3;

static BEST_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bo(\d+)").expect("best-of pattern is valid"));
static MATCH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/matches/(\d+)").expect("match id pattern is valid"));

/// First `.match-meta` whose lowercased text mentions "bo" decides the format.
pub fn extract_best_of<N: QueryNode>(node: &N) -> BestOf {
    node.find_all(META)
        .iter()
        .map(|meta| meta.text_content().to_lowercase())
        .find(|text| text.contains("bo"))
        .map(|text| parse_best_of(&text))
        .unwrap_or(BestOf::Unknown)
}

/// `"bobo3"` → bo3, `"bo"` without digits → bo3.
pub fn parse_best_of(text: &str) -> BestOf {
    BEST_OF_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(BestOf::Bo)
        .unwrap_or(BestOf::Bo(DEFAULT_SERIES_LENGTH))
}

pub fn extract_teams<N: QueryNode>(node: &N) -> (Option<String>, Option<String>) {
    positional_pair(
        node.find_all(TEAM_NAME)
            .iter()
            .map(|el| non_empty(el.text_content())),
    )
}

pub fn extract_logos<N: QueryNode>(node: &N) -> (Option<String>, Option<String>) {
    positional_pair(
        node.find_all(TEAM_LOGO)
            .iter()
            .map(|img| img.attr("src").and_then(non_empty)),
    )
}

pub fn extract_map_score<N: QueryNode>(node: &N) -> MapScore {
    let (team1, team2) = positional_pair(
        node.find_all(MAP_SCORE)
            .iter()
            .map(|span| non_empty(span.text_content())),
    );
    MapScore { team1, team2 }
}

fn positional_pair(mut values: impl Iterator<Item = Option<String>>) -> (Option<String>, Option<String>) {
    let first = values.next().flatten();
    let second = values.next().flatten();
    (first, second)
}

pub fn extract_event<N: QueryNode>(node: &N) -> String {
    node.find_first(EVENT)
        .and_then(|el| non_empty(el.text_content()))
        .unwrap_or_else(|| UNKNOWN_EVENT.to_string())
}

pub fn is_live<N: QueryNode>(node: &N) -> bool {
    node.find_first(LIVE_MARKER).is_some()
}

/// Displayed time, then the info-row time, then the epoch attribute.
pub fn extract_time<N: QueryNode>(node: &N) -> Option<String> {
    node.find_first(MATCH_TIME)
        .and_then(|el| non_empty(el.text_content()))
        .or_else(|| {
            node.find_first(INFO_ROW_TIME)
                .and_then(|el| non_empty(el.text_content()))
        })
        .or_else(|| {
            node.find_first(UNIX_TIME)
                .and_then(|el| el.attr("data-unix"))
                .and_then(|raw| format_unix_millis(&raw))
        })
}

/// Formats an epoch-milliseconds string the way the listing displays it,
/// e.g. `"14 Jul, 18:00"` (UTC).
pub fn format_unix_millis(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let millis = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
    })?;
    let at = DateTime::from_timestamp_millis(millis)?;
    Some(at.format("%d %b, %H:%M").to_string())
}

pub fn extract_stream<N: QueryNode>(node: &N, base_url: &str) -> Option<String> {
    node.find_first(STREAM_LINK)
        .and_then(|a| a.attr("href"))
        .and_then(|href| normalize_stream_link(&href, base_url))
}

/// Resolves a stream href: unwraps the site's `/external?url=` redirect,
/// keeps absolute URLs, and anchors anything else on `base_url`.
pub fn normalize_stream_link(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with(EXTERNAL_REDIRECT_PREFIX) {
        let (_, query) = href.split_once('?')?;
        return url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "url")
            .and_then(|(_, value)| non_empty(value));
    }

    if href.starts_with("http") {
        return Some(href.to_string());
    }

    Some(absolute_url(base_url, href))
}

pub fn absolute_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Raw href of the node's first anchor.
pub fn extract_link_path<N: QueryNode>(node: &N) -> Option<String> {
    node.find_first(LINK)
        .and_then(|a| a.attr("href"))
        .and_then(non_empty)
}

pub fn extract_link<N: QueryNode>(node: &N, base_url: &str) -> Option<String> {
    extract_link_path(node).map(|path| {
        if path.starts_with("http") {
            path
        } else {
            absolute_url(base_url, &path)
        }
    })
}

pub fn extract_match_id<N: QueryNode>(node: &N) -> Option<String> {
    extract_link_path(node).and_then(|path| match_id_from_path(&path))
}

pub fn match_id_from_path(path: &str) -> Option<String> {
    MATCH_ID_RE
        .captures(path)
        .map(|caps| caps[1].to_string())
}

pub fn live_viewer_url(base_url: &str, match_id: &str) -> String {
    format!("{}/live?matchId={match_id}", base_url.trim_end_matches('/'))
}
