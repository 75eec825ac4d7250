//! Live Valorant matches from the vlr.gg home page.

use std::sync::LazyLock;
use std::time::Instant;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::document::{non_empty, QueryDocument, QueryNode};
use crate::error::Result;
use crate::extract::{absolute_url, normalize_stream_link};
use crate::model::{BestOf, VlrFeed, VlrMatch};
use crate::provider::{DocumentProvider, HttpFetcher, PageRequest};

pub mod selectors {
    pub const MATCH_ITEM: &str = ".js-home-matches-upcoming a.wf-module-item";
    pub const LIVE_ETA: &str = ".h-match-eta.mod-live";
    pub const TEAM: &str = ".h-match-team";
    pub const TEAM_NAME: &str = ".h-match-team-name";
    pub const TEAM_FLAG: &str = ".flag";
    pub const TEAM_SCORE: &str = ".h-match-team-score";
    pub const EVENT: &str = ".h-match-preview-event";
    pub const SERIES: &str = ".h-match-preview-series";
    pub const TIMESTAMP: &str = ".moment-tz-convert";

    pub const DETAIL_MAP: &str = ".map > div > span";
    pub const DETAIL_STREAM: &str = ".match-streams-btn-external";
}

use selectors::*;

const LIVE_LABEL: &str = "LIVE";
const DEFAULT_SERIES_LENGTH: u32 = 3;

static SERIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:bo|best of )(\d+)").expect("series pattern is valid"));

pub struct VlrScraper {
    config: ScraperConfig,
    fetcher: HttpFetcher,
}

impl VlrScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    pub async fn scrape_live(&self) -> Result<VlrFeed> {
        let started = Instant::now();
        let result = scrape_live_with(&self.fetcher, &self.config).await;
        match &result {
            Ok(feed) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                live = feed.count,
                "VLR scrape completed"
            ),
            Err(e) => warn!("VLR scrape failed: {e}"),
        }
        result
    }
}

pub async fn scrape_live_with<P>(provider: &P, config: &ScraperConfig) -> Result<VlrFeed>
where
    P: DocumentProvider + ?Sized,
{
    let home = format!("{}/", config.vlr_base_url.trim_end_matches('/'));
    let html = provider
        .load(&PageRequest::new(home, config.http_timeout))
        .await?;
    let listed = parse_live_matches(&html, &config.vlr_base_url);

    let mut data = Vec::with_capacity(listed.len());
    for mut item in listed {
        if let Some(page) = item.match_page.clone() {
            match provider
                .load(&PageRequest::new(page, config.http_timeout))
                .await
            {
                Ok(detail) => {
                    let (current_map, stream_url) = parse_detail(&detail, &config.vlr_base_url);
                    item.current_map = current_map;
                    item.stream_url = stream_url;
                }
                Err(e) => debug!("VLR detail skipped: {e}"),
            }
        }
        data.push(item);
    }

    Ok(VlrFeed::new(data))
}

/// Live entries of the home page match list, in page order.
pub fn parse_live_matches(html: &str, base_url: &str) -> Vec<VlrMatch> {
    let doc = Html::parse_document(html);
    doc.find_all(MATCH_ITEM)
        .iter()
        .filter(|node| node.find_first(LIVE_ETA).is_some())
        .filter_map(|node| parse_live_node(node, base_url))
        .collect()
}

fn parse_live_node<N: QueryNode>(node: &N, base_url: &str) -> Option<VlrMatch> {
    let teams = node.find_all(TEAM);
    let mut names = teams
        .iter()
        .map(|team| team.find_first(TEAM_NAME).and_then(|n| non_empty(n.text_content())));
    let (Some(team1), Some(team2)) = (names.next().flatten(), names.next().flatten()) else {
        debug!("skipping VLR node without two team names");
        return None;
    };

    let flag = |i: usize| {
        teams
            .get(i)
            .and_then(|t| t.find_first(TEAM_FLAG))
            .and_then(|f| f.attr("class"))
            .and_then(|class| flag_code(&class))
    };
    let score = |i: usize| {
        teams
            .get(i)
            .and_then(|t| t.find_first(TEAM_SCORE))
            .and_then(|s| non_empty(s.text_content()))
    };

    let match_series = node
        .find_first(SERIES)
        .map(|s| s.text_content())
        .unwrap_or_default();

    Some(VlrMatch {
        team1,
        team2,
        flag1: flag(0),
        flag2: flag(1),
        score1: score(0),
        score2: score(1),
        time_until_match: LIVE_LABEL.to_string(),
        best_of: parse_series_best_of(&match_series),
        match_series,
        match_event: node
            .find_first(EVENT)
            .map(|e| e.text_content())
            .unwrap_or_default(),
        unix_timestamp: node
            .find_first(TIMESTAMP)
            .and_then(|t| t.attr("data-utc-ts"))
            .and_then(|raw| parse_utc_timestamp(&raw)),
        match_page: node
            .attr("href")
            .and_then(non_empty)
            .map(|href| absolute_url(base_url, &href)),
        current_map: None,
        stream_url: None,
    })
}

/// `"flag mod-br"` → `"br"`.
pub fn flag_code(class_attr: &str) -> Option<String> {
    class_attr
        .split_whitespace()
        .find_map(|class| class.strip_prefix("mod-"))
        .and_then(non_empty)
}

/// Reads `bo3` / `best of 5` out of the series label; plain labels count as bo3.
pub fn parse_series_best_of(series: &str) -> BestOf {
    SERIES_RE
        .captures(&series.to_lowercase())
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(BestOf::Bo)
        .unwrap_or(BestOf::Bo(DEFAULT_SERIES_LENGTH))
}

/// Accepts epoch seconds or `YYYY-MM-DD HH:MM:SS` (UTC); returns RFC 3339.
pub fn parse_utc_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let at: DateTime<Utc> = match raw.parse::<i64>() {
        Ok(secs) => DateTime::from_timestamp(secs, 0)?,
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()?
            .and_utc(),
    };
    Some(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Current map name and stream link from a match page.
pub fn parse_detail(html: &str, base_url: &str) -> (Option<String>, Option<String>) {
    let doc = Html::parse_document(html);
    let current_map = doc
        .find_first(DETAIL_MAP)
        .and_then(|span| non_empty(span.text_content()));
    let stream_url = doc
        .find_first(DETAIL_STREAM)
        .and_then(|a| a.attr("href"))
        .and_then(|href| normalize_stream_link(&href, base_url));
    (current_map, stream_url)
}
