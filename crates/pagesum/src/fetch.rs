//! Page fetching
//!
//! A [`Page`] only exists once both the GET and the extraction succeeded.

use crate::config::Config;
use crate::error::{Error, ExtractionError, FetchError};
use crate::extract::extract_with_content_type;
use crate::DEFAULT_USER_AGENT;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// A fetched and extracted web page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    url: String,
    title: String,
    body_text: String,
}

impl Page {
    /// Build a page from already-downloaded HTML
    pub fn from_html(url: impl Into<String>, raw: &[u8]) -> Result<Self, ExtractionError> {
        Self::from_response(url, raw, None)
    }

    /// Build a page from a response body and its `Content-Type` header
    pub fn from_response(
        url: impl Into<String>,
        raw: &[u8],
        content_type: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        let extracted = extract_with_content_type(raw, content_type)?;
        Ok(Self {
            url: url.into(),
            title: extracted.title,
            body_text: extracted.body_text,
        })
    }

    /// Source address
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page title, or [`NO_TITLE`](crate::NO_TITLE)
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Visible body text
    pub fn body_text(&self) -> &str {
        &self.body_text
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page(url={}, title=\"{}\")", self.url, self.title)
    }
}

/// Options for the page fetcher
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Total request timeout; `None` keeps the client default
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Read `PAGESUM_USER_AGENT` and `PAGESUM_TIMEOUT_SECS`
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            user_agent: config.user_agent().map(str::to_string),
            timeout: config.timeout()?,
        })
    }
}

/// Performs one GET per page and hands the body to the extractor
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Build the underlying HTTP client
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, application/xhtml+xml, */*;q=0.8"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::ClientBuild)?;

        Ok(Self { client })
    }

    /// Fetch `url` and extract it into a [`Page`]
    ///
    /// Anything but HTTP 200 is a [`FetchError::Status`]. No retries.
    pub async fn fetch(&self, url: &str) -> Result<Page, Error> {
        tracing::debug!(url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "Page response");

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(Page::from_response(url, &body, content_type.as_deref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_html() {
        let page = Page::from_html(
            "https://example.com",
            b"<html><head><title>Example</title></head><body><p>Hi</p></body></html>",
        )
        .unwrap();
        assert_eq!(page.url(), "https://example.com");
        assert_eq!(page.title(), "Example");
        assert_eq!(page.body_text(), "Hi");
        assert_eq!(
            page.to_string(),
            "Page(url=https://example.com, title=\"Example\")"
        );
    }

    #[test]
    fn test_page_from_html_without_body() {
        let result = Page::from_html(
            "https://example.com",
            b"<html><frameset><frame src=\"a.html\"></frameset></html>",
        );
        assert!(matches!(result, Err(ExtractionError::MissingBody)));
    }

    #[test]
    fn test_page_from_response_uses_header_charset() {
        let page = Page::from_response(
            "https://example.com",
            b"<html><head><title>Caf\xe9</title></head><body><p>ol\xe9</p></body></html>",
            Some("text/html; charset=windows-1252"),
        )
        .unwrap();
        assert_eq!(page.title(), "Caf\u{e9}");
        assert_eq!(page.body_text(), "ol\u{e9}");
    }

    #[test]
    fn test_fetch_options_from_config() {
        let config = Config::from_pairs([
            (crate::config::USER_AGENT, "TestAgent/1.0"),
            (crate::config::TIMEOUT_SECS, "5"),
        ]);
        let options = FetchOptions::from_config(&config).unwrap();
        assert_eq!(options.user_agent.as_deref(), Some("TestAgent/1.0"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));

        let options = FetchOptions::from_config(&Config::default()).unwrap();
        assert!(options.user_agent.is_none());
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_fetch_options_rejects_bad_timeout() {
        let config = Config::from_pairs([(crate::config::TIMEOUT_SECS, "soon")]);
        assert!(matches!(
            FetchOptions::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let fetcher = PageFetcher::new(FetchOptions::default()).unwrap();
        // Port 9 (discard) on localhost is closed on test machines
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }
}
