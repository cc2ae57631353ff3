use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Auth wrappers layer on top of this.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
