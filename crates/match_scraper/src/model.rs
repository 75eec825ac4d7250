use std::fmt;

use serde::{Serialize, Serializer};

/// Event name used when a listing gives no tournament.
pub const UNKNOWN_EVENT: &str = "Unknown";

/// Series format. Serialized as `"bo3"` / `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestOf {
    Bo(u32),
    Unknown,
}

impl fmt::Display for BestOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestOf::Bo(n) => write!(f, "bo{n}"),
            BestOf::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for BestOf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps won by each side of a live series; `"1 - ?"` when a side is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapScore {
    pub team1: Option<String>,
    pub team2: Option<String>,
}

impl fmt::Display for MapScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.team1.as_deref().unwrap_or("?"),
            self.team2.as_deref().unwrap_or("?")
        )
    }
}

impl Serialize for MapScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One normalized HLTV match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub team1: String,
    pub team2: String,
    pub logo1: Option<String>,
    pub logo2: Option<String>,
    pub event: String,
    pub best_of: BestOf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_score: Option<MapScore>,
    pub time: Option<String>,
    pub link: Option<String>,
    pub match_id: Option<String>,
    pub stream_url: Option<String>,
    pub stream: Option<String>,
    pub is_live: bool,
}

impl MatchRecord {
    /// Live records with a missing stream, time or event are worth a detail
    /// page fetch.
    pub fn needs_enrichment(&self) -> bool {
        self.is_live && (self.stream.is_none() || self.time.is_none() || self.event == UNKNOWN_EVENT)
    }
}

/// Listing page split into live and upcoming matches, each in page order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub live_matches: Vec<MatchRecord>,
    pub upcoming_matches: Vec<MatchRecord>,
}

impl ScrapeResult {
    pub fn find_by_match_id(&self, match_id: &str) -> Option<&MatchRecord> {
        self.live_matches
            .iter()
            .chain(self.upcoming_matches.iter())
            .find(|m| m.match_id.as_deref() == Some(match_id))
    }

    pub fn total(&self) -> usize {
        self.live_matches.len() + self.upcoming_matches.len()
    }
}

/// One live Valorant match from vlr.gg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VlrMatch {
    pub team1: String,
    pub team2: String,
    pub flag1: Option<String>,
    pub flag2: Option<String>,
    pub score1: Option<String>,
    pub score2: Option<String>,
    pub time_until_match: String,
    pub match_series: String,
    pub match_event: String,
    pub unix_timestamp: Option<String>,
    pub match_page: Option<String>,
    pub current_map: Option<String>,
    pub stream_url: Option<String>,
    pub best_of: BestOf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VlrFeed {
    pub success: bool,
    pub data: Vec<VlrMatch>,
    pub count: usize,
}

impl VlrFeed {
    pub fn new(data: Vec<VlrMatch>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}
