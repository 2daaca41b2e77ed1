use super::HttpClient;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::sync::Mutex;

/// Answers every request with a fixed status and body and remembers the
/// headers of the last request it saw.
pub(crate) struct StubClient {
    status: u16,
    body: Vec<u8>,
    last_headers: Mutex<Option<HeaderMap>>,
}

impl StubClient {
    pub(crate) fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            last_headers: Mutex::new(None),
        }
    }

    pub(crate) fn last_headers(&self) -> HeaderMap {
        self.last_headers
            .lock()
            .unwrap()
            .clone()
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        *self.last_headers.lock().unwrap() = Some(req.headers().clone());
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}
