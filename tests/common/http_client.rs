//! HTTP client helpers for tests.

use std::time::Duration;

use reqwest::StatusCode;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BOUNDARY: &str = "drreconcile-integration-boundary";

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    /// Form-encoded `POST /api/reconcile`.
    pub async fn reconcile(&self, queries: &serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = self
            .client
            .post(self.url("/api/reconcile"))
            .form(&[("queries", queries.to_string())])
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    /// Multipart upload of a correction file.
    pub async fn upload(&self, type_param: &str, csv: &str) -> (StatusCode, serde_json::Value) {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"corrections.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --{BOUNDARY}--\r\n"
        );

        let response = self
            .client
            .post(self.url("/api/fetch-update-reconciled-data"))
            .query(&[("type_param", type_param)])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}
