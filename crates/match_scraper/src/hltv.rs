use std::time::Instant;

use tracing::{info, warn};

use crate::config::ScraperConfig;
use crate::enrich::enrich_live_matches;
use crate::error::Result;
use crate::extract::selectors::MATCH;
use crate::model::ScrapeResult;
use crate::normalize::normalize_html;
use crate::provider::{ChromeSession, DocumentProvider, PageRequest};

/// HLTV match listing scraper. Each [`scrape`](Self::scrape) call owns one
/// headless browser session for its whole duration.
pub struct HltvScraper {
    config: ScraperConfig,
}

impl HltvScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub async fn scrape(&self) -> Result<ScrapeResult> {
        let started = Instant::now();
        info!("Starting HLTV scrape");

        let session = ChromeSession::launch(&self.config).await?;
        let result = scrape_with(&session, &self.config).await;
        drop(session);

        match &result {
            Ok(data) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                live = data.live_matches.len(),
                upcoming = data.upcoming_matches.len(),
                "HLTV scrape completed"
            ),
            Err(e) => warn!("HLTV scrape failed: {e}"),
        }
        result
    }
}

pub fn matches_url(config: &ScraperConfig) -> String {
    format!("{}/matches", config.hltv_base_url.trim_end_matches('/'))
}

/// Listing → normalize → (optional) detail enrichment over any provider.
pub async fn scrape_with<P>(provider: &P, config: &ScraperConfig) -> Result<ScrapeResult>
where
    P: DocumentProvider + ?Sized,
{
    let request = PageRequest::new(matches_url(config), config.render_timeout).wait_for(MATCH);
    let html = provider.load(&request).await?;
    let result = normalize_html(&html, &config.hltv_base_url);

    if !config.enrich_live_details {
        return Ok(result);
    }
    Ok(enrich_live_matches(result, provider, config).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::testing::FakeProvider;

    const LISTING: &str = r#"
        <html><body>
          <div class="match">
            <a href="/matches/900/live-one">
              <div class="match-meta-live">LIVE</div>
              <div class="match-meta">bo3</div>
              <div class="match-teamname">Spirit</div>
              <div class="match-teamname">MOUZ</div>
            </a>
          </div>
          <div class="match">
            <a href="/matches/901/later">
              <div class="match-meta">bo1</div>
              <div class="match-teamname">Liquid</div>
              <div class="match-teamname">Complexity</div>
              <div class="matchTime">21:00</div>
            </a>
          </div>
        </body></html>
    "#;

    const DETAIL: &str = r#"
        <html><body>
          <div class="event-logo" title="BLAST Premier"></div>
          <div class="date" data-unix="1720980000000"></div>
          <a class="match-streams-btn-external" href="https://twitch.tv/blastpremier">Twitch</a>
        </body></html>
    "#;

    fn provider() -> FakeProvider {
        FakeProvider::new()
            .with_page("https://www.hltv.org/matches", LISTING)
            .with_page("https://www.hltv.org/matches/900/live-one", DETAIL)
    }

    #[tokio::test]
    async fn listing_waits_for_match_nodes() {
        let provider = provider();
        scrape_with(&provider, &ScraperConfig::default()).await.unwrap();
        let first = &provider.requests()[0];
        assert_eq!(first.url, "https://www.hltv.org/matches");
        assert_eq!(first.wait_for.as_deref(), Some(".match"));
    }

    #[tokio::test]
    async fn scrape_normalizes_and_enriches_live_matches() {
        let provider = provider();
        let result = scrape_with(&provider, &ScraperConfig::default()).await.unwrap();

        assert_eq!(provider.load_count(), 2);
        let live = &result.live_matches[0];
        assert_eq!(live.event, "BLAST Premier");
        assert_eq!(live.time.as_deref(), Some("14 Jul, 18:00"));
        assert_eq!(live.stream.as_deref(), Some("https://twitch.tv/blastpremier"));
        assert_eq!(live.stream_url.as_deref(), Some("https://www.hltv.org/live?matchId=900"));

        let upcoming = &result.upcoming_matches[0];
        assert_eq!(upcoming.team1, "Liquid");
        assert_eq!(upcoming.event, "Unknown");
    }

    #[tokio::test]
    async fn enrichment_can_be_disabled() {
        let provider = provider();
        let config = ScraperConfig {
            enrich_live_details: false,
            ..ScraperConfig::default()
        };
        let result = scrape_with(&provider, &config).await.unwrap();
        assert_eq!(provider.load_count(), 1);
        assert_eq!(result.live_matches[0].event, "Unknown");
    }

    #[tokio::test]
    async fn selector_timeout_is_returned_as_is() {
        let provider = FakeProvider::new().with_stalled_page("https://www.hltv.org/matches");
        let err = scrape_with(&provider, &ScraperConfig::default())
            .await
            .unwrap_err();

        match err {
            ScrapeError::SelectorTimeout { url, selector, .. } => {
                assert_eq!(url, "https://www.hltv.org/matches");
                assert_eq!(selector, ".match");
            }
            other => panic!("expected selector timeout, got {other:?}"),
        }
        assert_eq!(provider.load_count(), 1);
    }

    #[tokio::test]
    async fn listing_failure_fails_the_scrape() {
        let provider = FakeProvider::new();
        let err = scrape_with(&provider, &ScraperConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}
