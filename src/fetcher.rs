use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client, ClientBuilder};
use url::Url;

use crate::error::FetchError;
use crate::log::LogSink;

/// Retrieves one page body. Implementations do not retry.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>>;
}

/// HTTP GET over a shared `reqwest` client.
pub struct HttpFetcher<'a> {
    client: Client,
    log: &'a dyn LogSink,
}

impl<'a> HttpFetcher<'a> {
    pub fn new(user_agent: &str, timeout: Duration, log: &'a dyn LogSink) -> Result<Self, FetchError> {
        let client = client_builder(user_agent, timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self::with_client(client, log))
    }

    pub fn with_client(client: Client, log: &'a dyn LogSink) -> Self {
        HttpFetcher { client, log }
    }

    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(http_err)?;
        self.log.info(
            "page_retrieved",
            &[("url", url), ("status", &status.as_u16())],
        );
        Ok(body)
    }
}

impl PageFetcher for HttpFetcher<'_> {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.log.info("page_requested", &[("url", url)]);
        let result = self.get(url).await;
        if let Err(e) = &result {
            self.log.error("page_failed", &[("url", url), ("error", e)]);
        }
        result
    }
}

fn client_builder(user_agent: &str, timeout: Duration) -> ClientBuilder {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .default_headers(default_headers())
}

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("cs-CZ,cs;q=0.9,en;q=0.8"),
    );
    headers
}
