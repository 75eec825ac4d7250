//! Where page HTML comes from.
//!
//! HLTV builds its match list client side, so it goes through a headless
//! Chrome session. vlr.gg is server rendered and a plain HTTP fetch is
//! enough. Both hand back raw HTML for the `scraper` backend.

use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use tokio::task;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

const CHROME_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
];

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    /// Selector that must be present before the HTML is read. Only the
    /// renderer honours it.
    pub wait_for: Option<String>,
    pub timeout: Duration,
}

impl PageRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            wait_for: None,
            timeout,
        }
    }

    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }
}

#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn load(&self, request: &PageRequest) -> Result<String>;
}

/// Plain HTTP fetches with browser-like headers.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.http_timeout)
            .gzip(true);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| ScrapeError::Config(format!("bad proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentProvider for HttpFetcher {
    async fn load(&self, request: &PageRequest) -> Result<String> {
        let resp = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(&request.url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::fetch(&request.url, format!("HTTP {status}")));
        }

        resp.text()
            .await
            .map_err(|e| ScrapeError::fetch(&request.url, e))
    }
}

/// One headless Chrome process, shared by every page load of a single
/// scrape. The process is torn down when the session is dropped.
pub struct ChromeSession {
    browser: Browser,
    user_agent: String,
    wait_timeout: Duration,
}

impl ChromeSession {
    pub async fn launch(config: &ScraperConfig) -> Result<Self> {
        let config = config.clone();
        task::spawn_blocking(move || Self::launch_blocking(&config))
            .await
            .map_err(|e| ScrapeError::Browser(format!("launch task failed: {e}")))?
    }

    fn launch_blocking(config: &ScraperConfig) -> Result<Self> {
        let proxy_arg = config.proxy.as_ref().map(|p| format!("--proxy-server={p}"));
        let mut args: Vec<&OsStr> = CHROME_ARGS.iter().map(OsStr::new).collect();
        if let Some(arg) = &proxy_arg {
            args.push(OsStr::new(arg));
        }

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .path(config.chrome_path.clone())
            .idle_browser_timeout(config.render_timeout + config.wait_timeout)
            .args(args)
            .build()
            .map_err(|e| ScrapeError::Browser(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| ScrapeError::Browser(format!("failed to launch Chrome: {e}")))?;
        info!("headless Chrome session started");

        Ok(Self {
            browser,
            user_agent: config.user_agent.clone(),
            wait_timeout: config.wait_timeout,
        })
    }
}

#[async_trait]
impl DocumentProvider for ChromeSession {
    async fn load(&self, request: &PageRequest) -> Result<String> {
        let browser = self.browser.clone();
        let user_agent = self.user_agent.clone();
        let wait_timeout = self.wait_timeout;
        let request = request.clone();

        task::spawn_blocking(move || {
            let tab = browser
                .new_tab()
                .map_err(|e| ScrapeError::Browser(format!("failed to open tab: {e}")))?;
            let html = render_in_tab(&tab, &user_agent, wait_timeout, &request);
            if let Err(e) = tab.close(true) {
                debug!("closing tab for {} failed: {e}", request.url);
            }
            html
        })
        .await
        .map_err(|e| ScrapeError::Browser(format!("render task failed: {e}")))?
    }
}

fn render_in_tab(
    tab: &Tab,
    user_agent: &str,
    wait_timeout: Duration,
    request: &PageRequest,
) -> Result<String> {
    let url = request.url.as_str();
    tab.set_default_timeout(request.timeout);
    tab.set_user_agent(user_agent, Some(ACCEPT_LANGUAGE_EN), None)
        .map_err(|e| ScrapeError::fetch(url, e))?;
    tab.navigate_to(url)
        .map_err(|e| ScrapeError::fetch(url, e))?
        .wait_until_navigated()
        .map_err(|e| ScrapeError::fetch(url, e))?;

    if let Some(selector) = &request.wait_for {
        tab.wait_for_element_with_custom_timeout(selector, wait_timeout)
            .map_err(|_| ScrapeError::SelectorTimeout {
                url: url.to_string(),
                selector: selector.clone(),
                waited: wait_timeout,
            })?;
    }

    tab.get_content().map_err(|e| ScrapeError::fetch(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_builder_sets_wait_selector() {
        let request = PageRequest::new("https://www.hltv.org/matches", Duration::from_secs(5))
            .wait_for(".match");
        assert_eq!(request.wait_for.as_deref(), Some(".match"));
        assert_eq!(request.timeout, Duration::from_secs(5));
    }

    #[test]
    fn http_fetcher_builds_with_proxy() {
        let config = ScraperConfig {
            proxy: Some("http://127.0.0.1:8080".to_string()),
            ..ScraperConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }
}
