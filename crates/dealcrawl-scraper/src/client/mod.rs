//! HTTP client for store product pages.

mod origin;

use std::time::Duration;

use dealcrawl_core::{extract_domain, AppConfig};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};

use crate::cache::HttpCache;
use crate::error::ScraperError;
use crate::rate_limit::{politeness_delay, retry_with_backoff};

use origin::referer_for;

/// Retry-After fallback when a 429 carries no usable header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Connection, retry and politeness settings for [`PageClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    /// Base of the exponential backoff: `backoff_base_secs * 2^attempt`.
    pub backoff_base_secs: u64,
    /// Randomized pause before every request, in milliseconds.
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl ClientOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
            delay_min_ms: config.delay_min_ms,
            delay_max_ms: config.delay_max_ms,
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: dealcrawl_core::config::DEFAULT_USER_AGENT.to_string(),
            max_retries: 2,
            backoff_base_secs: 5,
            delay_min_ms: 1000,
            delay_max_ms: 2000,
        }
    }
}

/// Fetches product pages with browser-like headers, polite pacing and an
/// optional on-disk cache.
///
/// 429, 403 and network failures are retried with exponential backoff; 404
/// and other non-2xx statuses fail immediately as typed errors.
pub struct PageClient {
    client: Client,
    options: ClientOptions,
    cache: Option<HttpCache>,
}

impl PageClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(options: ClientOptions, cache: Option<HttpCache>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            client,
            options,
            cache,
        })
    }

    /// Returns the page body for `url`.
    ///
    /// A fresh cache entry is returned without any network traffic or delay.
    /// Otherwise the page is requested after a randomized pause, and a 200
    /// response is written to the cache.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` does not parse.
    /// - [`ScraperError::RateLimited`] / [`ScraperError::Forbidden`] /
    ///   [`ScraperError::Http`] once all retries are exhausted.
    /// - [`ScraperError::NotFound`] for 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        if let Some(html) = self.cache.as_ref().and_then(|cache| cache.get(url)) {
            tracing::debug!(url, "page served from cache");
            return Ok(html);
        }

        let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let (body, cacheable) =
            retry_with_backoff(self.options.max_retries, self.options.backoff_base_secs, || {
                self.request(&parsed)
            })
            .await?;

        if cacheable {
            if let Some(cache) = &self.cache {
                cache.set(url, &body);
            }
        }
        Ok(body)
    }

    /// Drops any cached copy of `url`, so that a page that turned out to be
    /// useless is fetched again next run.
    pub fn forget(&self, url: &str) {
        if let Some(cache) = &self.cache {
            cache.remove(url);
        }
    }

    async fn request(&self, url: &Url) -> Result<(String, bool), ScraperError> {
        let delay = politeness_delay(self.options.delay_min_ms, self.options.delay_max_ms);
        tokio::time::sleep(delay).await;

        let mut request = self.client.get(url.clone());
        if let Some(referer) = referer_for(url) {
            request = request.header(header::REFERER, referer);
        }

        let response = request.send().await?;
        let status = response.status();
        let domain = extract_domain(url.as_str());

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ScraperError::RateLimited {
                domain,
                retry_after_secs,
            });
        }

        if status == StatusCode::FORBIDDEN {
            return Err(ScraperError::Forbidden {
                domain,
                url: url.to_string(),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(url = %url, status = status.as_u16(), bytes = body.len(), "fetched page");
        Ok((body, status == StatusCode::OK))
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-PT,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
