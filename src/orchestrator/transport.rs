//! Request/reply transport to peer services

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Carries one request body to a peer and brings the reply body back
pub trait Transport {
    fn post(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, ExchangeError>> + Send;
}

/// HTTP POST transport
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, ExchangeError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ExchangeError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(ExchangeError::Request)?;
        Ok(bytes.to_vec())
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    #[error("Peer error (status {status}): {body}")]
    Api { status: u16, body: String },
}
