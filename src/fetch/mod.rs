//! HTTP download of remote trip-data exports.

pub mod auth;
mod basic;
mod client;
#[cfg(test)]
pub(crate) mod testing;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::errors::{PipelineError, Result};

/// Downloads `url` and returns the response body.
///
/// # Errors
///
/// Returns an error for an unparseable URL, a transport failure or a non-2xx
/// status.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let url = reqwest::Url::parse(url)
        .map_err(|e| PipelineError::Configuration(format!("invalid source url '{url}': {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubClient;

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let client = StubClient::new(200, "ride_id\nR1\n");
        let body = fetch_bytes(&client, "https://example.com/trips.csv").await.unwrap();
        assert_eq!(body, b"ride_id\nR1\n");
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let client = StubClient::new(404, "not found");
        let err = fetch_bytes(&client, "https://example.com/missing.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Http(_)));
    }

    #[tokio::test]
    async fn test_fetch_bytes_invalid_url() {
        let client = StubClient::new(200, "");
        let err = fetch_bytes(&client, "not a url").await.unwrap_err();
        match err {
            PipelineError::Configuration(msg) => assert!(msg.contains("invalid source url")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
