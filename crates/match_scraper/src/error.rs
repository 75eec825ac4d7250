use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Failures that abort a whole scrape. Missing fields and rejected match
/// nodes are not errors and never show up here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("selector `{selector}` did not appear on {url} within {waited:?}")]
    SelectorTimeout {
        url: String,
        selector: String,
        waited: Duration,
    },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("invalid scraper configuration: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn fetch(url: &str, err: impl Display) -> Self {
        ScrapeError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
