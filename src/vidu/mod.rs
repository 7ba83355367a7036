pub mod image_client;
pub mod poller;
pub mod task_client;

use crate::{
    config::{PollConfig, ViduConfig},
    error::{Result, ViduError},
    logger,
    models::{GenerationOutcome, GenerationRequest, ImageRef, RawBody, RawResponse},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub use image_client::ImageClient;
pub use poller::{PollHandle, TaskPoller, TaskSource};
pub use task_client::TaskClient;

/// Connection details shared by the image and task clients.
#[derive(Clone)]
pub(crate) struct Endpoint {
    pub(crate) http: Client,
    pub(crate) config: Arc<ViduConfig>,
    headers: HeaderMap,
}

impl Endpoint {
    fn new(config: ViduConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ViduError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let headers = build_headers(config.api_key.as_deref())?;

        Ok(Self {
            http,
            config: Arc::new(ViduConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            }),
            headers,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    pub(crate) fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }
}

fn build_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
        let value = HeaderValue::from_str(&format!("Token {}", key))
            .map_err(|_| ViduError::ConfigError("API key contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

pub(crate) fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.contains("application/json"))
}

#[derive(Clone)]
pub struct ViduClient {
    endpoint: Endpoint,
    image_client: ImageClient,
    task_client: TaskClient,
    poller: Arc<TaskPoller<TaskClient>>,
}

impl ViduClient {
    pub fn new(config: ViduConfig, poll_config: PollConfig) -> Result<Self> {
        if config.api_key.is_none() {
            log::warn!("No Vidu API key configured, requests will be sent unauthenticated");
        }

        let endpoint = Endpoint::new(config)?;
        let task_client = TaskClient::new(endpoint.clone());

        Ok(Self {
            image_client: ImageClient::new(endpoint.clone()),
            poller: Arc::new(TaskPoller::new(task_client.clone(), poll_config)),
            task_client,
            endpoint,
        })
    }

    pub fn config(&self) -> &ViduConfig {
        &self.endpoint.config
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn tasks(&self) -> &TaskClient {
        &self.task_client
    }

    pub fn poller(&self) -> &TaskPoller<TaskClient> {
        &self.poller
    }

    /// Generate images, polling the task when the result is not immediate.
    ///
    /// Any poll left over from an earlier submission is cancelled first.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<Vec<ImageRef>> {
        request.validate()?;
        if self.poller.cancel() {
            log::info!("Cancelled polling left over from a previous submission");
        }

        let request_id = Uuid::new_v4().to_string();
        let _timer = logger::timer(&format!("submission {}", request_id));
        log::info!("[req:{}] Submitting generation request", request_id);

        match self.image_client.generate(request).await? {
            GenerationOutcome::Completed { images, unresolved } => {
                if unresolved > 0 {
                    log::warn!(
                        "[req:{}] Parsed {} images, {} placeholders need exchanging for real URLs",
                        request_id,
                        images.len(),
                        unresolved
                    );
                }
                log::info!("[req:{}] Received {} images", request_id, images.len());
                Ok(images)
            }
            GenerationOutcome::Pending(task) => {
                log::info!("[req:{}] Task {} created, waiting for result", request_id, task);
                let images = self.poller.start(task).wait().await?;
                log::info!("[req:{}] Task produced {} images", request_id, images.len());
                Ok(images)
            }
            GenerationOutcome::Empty { raw } => {
                log::warn!(
                    "[req:{}] Request succeeded but no images were parsed: {}",
                    request_id,
                    raw.map(|v| v.to_string()).unwrap_or_else(|| "<non-JSON body>".into())
                );
                Err(ViduError::ResponseError(
                    "Request succeeded but no images were found".into(),
                ))
            }
        }
    }

    /// Send an arbitrary request and return the response as-is.
    ///
    /// Only transport failures are errors; any HTTP status is returned.
    pub async fn probe(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        let url = self.endpoint.url(path);
        log::info!("Probing {} {}", method, url);

        let mut builder = self
            .endpoint
            .http
            .request(method, &url)
            .headers(self.endpoint.headers());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ViduError::RequestError(format!("Probe of {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| ViduError::ResponseError(format!("Failed to read probe body: {}", e)))?;

        log::debug!("Probe returned HTTP {} ({} bytes)", status, text.len());

        Ok(RawResponse {
            status,
            headers,
            body: RawBody::from_text(text),
        })
    }

    pub async fn health(&self) -> Result<RawResponse> {
        self.probe(Method::GET, "/ent/v2/health", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_without_key() {
        let headers = build_headers(None).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());

        let headers = build_headers(Some("  ")).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_headers_with_key() {
        let headers = build_headers(Some("vda_123")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Token vda_123");
    }

    #[test]
    fn test_headers_reject_invalid_key() {
        assert!(matches!(
            build_headers(Some("bad\nkey")),
            Err(ViduError::ConfigError(_))
        ));
    }

    #[test]
    fn test_json_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert!(!is_json(&headers));
    }
}
