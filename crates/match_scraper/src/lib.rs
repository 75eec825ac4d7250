//! Esports match listings scraped into a normalized feed.
//!
//! - HLTV (CS2): client-rendered listing, loaded through headless Chrome,
//!   normalized into live/upcoming [`MatchRecord`]s, then live matches with
//!   gaps are patched from their own detail pages.
//! - vlr.gg (Valorant): server-rendered home page over plain HTTP, live
//!   matches only.
//!
//! Field extraction never fails; only reaching the source page can.

pub mod classify;
pub mod config;
pub mod document;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod hltv;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod vlr;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ScraperConfig;
pub use error::{Result, ScrapeError};
pub use extract::live_viewer_url;
pub use hltv::HltvScraper;
pub use model::{BestOf, MapScore, MatchRecord, ScrapeResult, VlrFeed, VlrMatch, UNKNOWN_EVENT};
pub use provider::{ChromeSession, DocumentProvider, HttpFetcher, PageRequest};
pub use vlr::VlrScraper;
