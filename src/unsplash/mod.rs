use crate::{
    config::UnsplashConfig,
    error::{Result, ViduError},
    models::{PhotoSearchRequest, PhotoSearchResponse},
};
use reqwest::{header::AUTHORIZATION, Client};
use std::time::Duration;

const SEARCH_ENDPOINT: &str = "/search/photos";

/// Unsplash photo search.
#[derive(Clone)]
pub struct PhotoClient {
    client: Client,
    config: UnsplashConfig,
}

impl PhotoClient {
    pub fn new(config: UnsplashConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ViduError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UnsplashConfig {
        &self.config
    }

    pub async fn search(&self, request: &PhotoSearchRequest) -> Result<PhotoSearchResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ViduError::ValidationError(
                "Search query must not be empty".into(),
            ));
        }
        if !self.config.has_valid_key() {
            return Err(ViduError::ConfigError(
                "Unsplash access key is not configured (set UNSPLASH_ACCESS_KEY)".into(),
            ));
        }
        let access_key = self.config.access_key.as_deref().unwrap_or_default().trim();

        let per_page = request.per_page.unwrap_or(self.config.per_page);
        let orientation = request.orientation.unwrap_or(self.config.orientation);

        log::info!(
            "Searching photos for '{}' (per_page={}, orientation={})",
            query,
            per_page,
            orientation
        );

        let response = self
            .client
            .get(&format!("{}{}", self.config.base_url, SEARCH_ENDPOINT))
            .query(&[
                ("query", query.to_string()),
                ("per_page", per_page.to_string()),
                ("orientation", orientation.to_string()),
            ])
            .header(AUTHORIZATION, format!("Client-ID {}", access_key))
            .send()
            .await
            .map_err(|e| ViduError::RequestError(format!("Unsplash request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            log::error!("Photo search failed with HTTP {}", status);
            return Err(ViduError::HttpError { status, body });
        }

        let results: PhotoSearchResponse = response.json().await.map_err(|e| {
            ViduError::ResponseError(format!("Failed to parse search response: {}", e))
        })?;

        if results.results.is_empty() {
            log::warn!("No photos found for '{}'", query);
        } else {
            log::info!(
                "Found {} photos ({} total matches)",
                results.results.len(),
                results.total
            );
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_query_rejected_before_request() {
        let client = PhotoClient::new(
            UnsplashConfig::new()
                .with_access_key("key")
                .with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();

        let err = client.search(&PhotoSearchRequest::new("  ")).await.unwrap_err();
        assert!(matches!(err, ViduError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_missing_key_rejected_before_request() {
        let client =
            PhotoClient::new(UnsplashConfig::new().with_base_url("http://127.0.0.1:9")).unwrap();

        let err = client.search(&PhotoSearchRequest::new("cats")).await.unwrap_err();
        assert!(matches!(err, ViduError::ConfigError(_)));
    }
}
