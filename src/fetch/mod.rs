mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use serde_json::Value;

/// Sends a GET to `url` with `params` and decodes the body as JSON.
///
/// Non-success statuses become errors carrying the status and body.
pub async fn fetch_json<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    params: &[(&str, &str)],
) -> Result<Value> {
    let url = reqwest::Url::parse_with_params(url, params)
        .with_context(|| format!("invalid URL '{url}'"))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("request failed with status {}: {}", status, body));
    }

    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::auth::{ApiKey, UrlParam};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every request with a canned status/body and remembers what it saw.
    struct FakeClient {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<reqwest::Request>>,
    }

    impl FakeClient {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for FakeClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.seen.lock().unwrap().push(req);
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let client = FakeClient::new(200, r#"{"status":"OK","results":[]}"#);
        let json = fetch_json(&client, "https://example.test/search", &[("q", "cafes")])
            .await
            .unwrap();
        assert_eq!(json["status"], "OK");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].url().as_str(), "https://example.test/search?q=cafes");
    }

    #[tokio::test]
    async fn test_fetch_json_fails_on_error_status() {
        let client = FakeClient::new(403, "forbidden");
        let err = fetch_json(&client, "https://example.test/x", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_url_param_appends_key() {
        let client = UrlParam::new(FakeClient::new(200, "{}"), "key", "secret".to_string());
        fetch_json(&client, "https://example.test/details", &[("place_id", "p1")])
            .await
            .unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert_eq!(
            seen[0].url().as_str(),
            "https://example.test/details?place_id=p1&key=secret"
        );
    }

    #[tokio::test]
    async fn test_bearer_sets_authorization_header() {
        let client = ApiKey::bearer(FakeClient::new(200, "{}"), "token").unwrap();
        fetch_json(&client, "https://example.test/biz", &[]).await.unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert_eq!(seen[0].headers()["authorization"], "Bearer token");
    }

    #[test]
    fn test_api_key_rejects_bad_header_value() {
        assert!(ApiKey::bearer(FakeClient::new(200, "{}"), "bad\nkey").is_err());
    }
}
