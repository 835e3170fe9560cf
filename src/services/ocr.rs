//! HTTP OCR client
//!
//! Posts the raw image bytes to the configured endpoint and reads back
//! `{"text": "..."}`.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::config::OcrConfig;
use crate::utils::errors::{BotError, Result};
use crate::verification::TextExtractor;

#[derive(Debug, Clone, Deserialize)]
pub struct OcrResponse {
    pub text: String,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct HttpOcrClient {
    client: Client,
    endpoint: url::Url,
    api_key: Option<String>,
}

impl HttpOcrClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("SubscriptionBot/1.0")
            .build()
            .map_err(BotError::Http)?;
        let endpoint = url::Url::parse(&config.endpoint)?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl TextExtractor for HttpOcrClient {
    async fn extract_text(&self, image: &[u8]) -> Result<String> {
        let mut request = self.client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec());

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Ocr(format!("OCR service returned {}", status)));
        }

        let body: OcrResponse = response.json().await?;
        debug!(bytes = image.len(), chars = body.text.chars().count(), "OCR request completed");
        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, api_key: Option<&str>) -> OcrConfig {
        OcrConfig {
            endpoint: format!("{}/ocr", server.uri()),
            api_key: api_key.map(str::to_string),
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_extracts_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ocr"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "200 stars"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpOcrClient::new(&config_for(&server, Some("secret"))).unwrap();
        assert_eq!(client.extract_text(b"png").await.unwrap(), "200 stars");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpOcrClient::new(&config_for(&server, None)).unwrap();
        let err = client.extract_text(b"png").await.unwrap_err();
        assert!(matches!(err, BotError::Ocr(_)));
    }
}
