use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport used to download remote trip-data exports.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
