use tracing::trace;

use crate::document::QueryNode;
use crate::extract::{
    extract_best_of, extract_event, extract_link, extract_logos, extract_map_score,
    extract_match_id, extract_stream, extract_teams, extract_time, is_live, live_viewer_url,
};
use crate::model::MatchRecord;

/// Builds a record from one match node, or `None` when the node lacks two
/// team names. Rejected nodes are dropped silently.
pub fn classify<N: QueryNode>(node: &N, base_url: &str) -> Option<MatchRecord> {
    let (team1, team2) = extract_teams(node);
    let (Some(team1), Some(team2)) = (team1, team2) else {
        trace!("skipping match node without two team names");
        return None;
    };

    let is_live = is_live(node);
    let match_id = extract_match_id(node);
    let stream = extract_stream(node, base_url);
    let stream_url = derive_stream_url(is_live, match_id.as_deref(), stream.as_deref(), base_url);
    let (logo1, logo2) = extract_logos(node);

    Some(MatchRecord {
        team1,
        team2,
        logo1,
        logo2,
        event: extract_event(node),
        best_of: extract_best_of(node),
        map_score: is_live.then(|| extract_map_score(node)),
        time: extract_time(node),
        link: extract_link(node, base_url),
        match_id,
        stream_url,
        stream,
        is_live,
    })
}

/// Live matches with a known id point at the site's live viewer; everything
/// else uses the scraped stream link.
pub fn derive_stream_url(
    is_live: bool,
    match_id: Option<&str>,
    stream: Option<&str>,
    base_url: &str,
) -> Option<String> {
    match (is_live, match_id) {
        (true, Some(id)) => Some(live_viewer_url(base_url, id)),
        _ => stream.map(str::to_string),
    }
}
