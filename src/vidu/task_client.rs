use crate::{
    models::TaskHandle,
    vidu::{is_json, poller::TaskSource, Endpoint},
};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

/// Task status lookups.
///
/// The status endpoint is undocumented, so several plausible URL shapes are
/// tried in order and the first one answering with JSON wins.
#[derive(Clone)]
pub struct TaskClient {
    endpoint: Endpoint,
}

impl TaskClient {
    pub(crate) fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn candidate_urls(&self, task_id: &str) -> Vec<Url> {
        let path_candidates = [
            format!("/ent/v2/tasks/{}", task_id),
            format!("/ent/v2/reference2image/{}", task_id),
        ];
        let query_candidates = ["/ent/v2/reference2image", "/ent/v2/task", "/ent/v2/get_task"];

        let mut urls = Vec::with_capacity(path_candidates.len() + query_candidates.len());
        for path in &path_candidates {
            match Url::parse(&self.endpoint.url(path)) {
                Ok(url) => urls.push(url),
                Err(e) => log::warn!("Skipping invalid status URL for {}: {}", path, e),
            }
        }
        for path in query_candidates {
            match Url::parse_with_params(&self.endpoint.url(path), &[("task_id", task_id)]) {
                Ok(url) => urls.push(url),
                Err(e) => log::warn!("Skipping invalid status URL for {}: {}", path, e),
            }
        }
        urls
    }

    /// Returns the first parseable JSON status body, or `None`.
    pub async fn fetch(&self, task_id: &str) -> Option<Value> {
        for url in self.candidate_urls(task_id) {
            let response = match self
                .endpoint
                .http
                .get(url.clone())
                .headers(self.endpoint.headers())
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    log::debug!("Status lookup {} failed: {}", url, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                log::debug!("Status lookup {} returned HTTP {}", url, response.status());
                continue;
            }
            if !is_json(response.headers()) {
                log::debug!("Status lookup {} did not return JSON", url);
                continue;
            }

            match response.json::<Value>().await {
                Ok(body) => {
                    log::debug!("Status lookup {} answered", url);
                    return Some(body);
                }
                Err(e) => log::debug!("Status lookup {} returned invalid JSON: {}", url, e),
            }
        }
        None
    }
}

#[async_trait]
impl TaskSource for TaskClient {
    async fn fetch_task(&self, task: &TaskHandle) -> Option<Value> {
        self.fetch(task.as_str()).await
    }
}
