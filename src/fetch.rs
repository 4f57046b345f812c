// src/fetch.rs
// =============================================================================
// The fetcher: one HTTP client for the whole run.
//
// Fetch failures are never fatal to the walk; the walker logs them and moves
// on. The error variants map the failure modes an operator cares about when
// hunting bad links: an HTTP error status, a timeout, a DNS or connection
// failure, or anything else the transport reports.
//
// The body is read exactly once per page and carried in FetchedPage so the
// reporter, the mirror writer and the link extractor all work from the same
// buffer.
// =============================================================================

use std::future::Future;

use reqwest::Client;
use thiserror::Error;

use crate::cli::{CrawlConfig, Credentials};

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with an error status (404, 500, ...).
    #[error("HTTP error {0}")]
    Http(u16),
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The hostname did not resolve.
    #[error("could not resolve hostname")]
    Dns,
    /// TCP/TLS connection failure.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Anything else the transport reported.
    #[error("{0}")]
    Other(String),
}

/// A fetched page: the headers the walker cares about plus the body bytes,
/// read once.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Declared content type, when the server sent one.
    pub content_type: Option<String>,
    /// Declared content length, else the body length.
    pub size: u64,
    /// Raw response headers for the -vvv dump.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Whether the declared content type says this is an HTML page.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ctype| ctype.to_lowercase().contains("html"))
    }

    /// The body decoded as text, best-effort.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The seam between the walker and the network. The engine only needs this
/// one operation, which keeps it testable with canned pages.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>>;
}

/// The real fetcher, backed by reqwest.
pub struct HttpFetcher {
    client: Client,
    auth: Option<Credentials>,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("webwalk/", env!("CARGO_PKG_VERSION")));

        // Operator trust override for internal sites behind self-signed
        // certificates: only relaxed when credentials were configured, never
        // by default.
        if config.auth.is_some() {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(HttpFetcher {
            client: builder.build()?,
            auth: config.auth.clone(),
        })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut request = self.client.get(url);
        if let Some(creds) = &self.auth {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await.map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let declared_length = response.content_length();

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(categorize_error)?
            .to_vec();

        Ok(FetchedPage {
            content_type,
            size: declared_length.unwrap_or(body.len() as u64),
            headers,
            body,
        })
    }
}

/// Map a reqwest error onto the failure taxonomy.
fn categorize_error(error: reqwest::Error) -> FetchError {
    let text = error.to_string();
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        // reqwest folds DNS failures into connect errors; the message is the
        // only way to tell them apart.
        if text.contains("dns") {
            FetchError::Dns
        } else {
            FetchError::Connect(text)
        }
    } else {
        FetchError::Other(text)
    }
}
