//! Loads trip-data exports from a local path or an HTTP(S) URL.

use tracing::info;

use crate::errors::{PipelineError, Result};
use crate::fetch::{BasicClient, HttpClient, auth::BearerToken, fetch_bytes};
use crate::model::RawTrip;
use crate::parser::parse_trips;

/// True when `source` should be downloaded instead of read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Builds the client used for remote sources. `token`, when given, is sent
/// as a bearer token on every request.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or the token is not
/// a valid header value.
pub fn remote_client(token: Option<&str>) -> Result<Box<dyn HttpClient>> {
    let basic = BasicClient::new()?;
    let client: Box<dyn HttpClient> = match token {
        Some(token) => Box::new(BearerToken::new(basic, token).ok_or_else(|| {
            PipelineError::Configuration("source token is not a valid header value".into())
        })?),
        None => Box::new(basic),
    };
    Ok(client)
}

/// Downloads `url` with `client` and parses every trip row in the body.
///
/// # Errors
///
/// Propagates errors from [`fetch_bytes`] and [`parse_trips`].
pub async fn fetch_raw_trips<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<RawTrip>> {
    let bytes = fetch_bytes(client, url).await?;
    let rows = parse_trips(&bytes)?;
    info!(url, bytes = bytes.len(), rows = rows.len(), "Remote trip source loaded");
    Ok(rows)
}

/// Loads and parses every trip row in `source`, a local path or an HTTP(S)
/// URL.
///
/// # Errors
///
/// Returns an error when the file cannot be read, the download fails or the
/// CSV cannot be parsed.
#[tracing::instrument(skip(token), fields(remote = is_remote(source)))]
pub async fn load_raw_trips(source: &str, token: Option<&str>) -> Result<Vec<RawTrip>> {
    if is_remote(source) {
        let client = remote_client(token)?;
        return fetch_raw_trips(client.as_ref(), source).await;
    }

    let bytes = std::fs::read(source)?;
    let rows = parse_trips(&bytes)?;
    info!(source, bytes = bytes.len(), rows = rows.len(), "Trip source loaded");
    Ok(rows)
}
