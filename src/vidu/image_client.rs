use crate::{
    error::{Result, ViduError},
    models::{extract_images, GenerationOutcome, GenerationRequest, TaskHandle},
    vidu::{is_json, Endpoint},
};
use serde_json::Value;

const REFERENCE2IMAGE_PATH: &str = "/ent/v2/reference2image";

#[derive(Clone)]
pub struct ImageClient {
    endpoint: Endpoint,
}

impl ImageClient {
    pub(crate) fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// Submit a reference-to-image request.
    ///
    /// Requests failing [`GenerationRequest::validate`] are rejected before
    /// any network traffic.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        request.validate()?;

        let payload = request.to_payload(&self.endpoint.config);
        log::info!(
            "Generating image with model: {} ({} references, aspect ratio {})",
            payload.model,
            payload.images.len(),
            payload.aspect_ratio
        );

        let response = self
            .endpoint
            .http
            .post(&self.endpoint.url(REFERENCE2IMAGE_PATH))
            .headers(self.endpoint.headers())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ViduError::RequestError(format!("Vidu request failed: {}", e)))?;

        let status = response.status();
        let json_body = is_json(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| ViduError::ResponseError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let body = if json_body {
                serde_json::from_str::<Value>(&text)
                    .map(|v| v.to_string())
                    .unwrap_or(text)
            } else {
                text
            };
            log::error!("Vidu returned HTTP {}: {}", status.as_u16(), body);
            return Err(ViduError::HttpError {
                status: status.as_u16(),
                body: if body.is_empty() {
                    format!("Request failed ({})", status.as_u16())
                } else {
                    body
                },
            });
        }

        let raw = if json_body {
            serde_json::from_str::<Value>(&text).ok()
        } else {
            log::warn!("Vidu response is not JSON, treating it as opaque");
            None
        };

        Ok(interpret_response(raw))
    }
}

/// Decide what a successful generation response means.
pub fn interpret_response(raw: Option<Value>) -> GenerationOutcome {
    let Some(body) = raw else {
        return GenerationOutcome::Empty { raw: None };
    };

    let extracted = extract_images(&body);
    if !extracted.is_empty() {
        return GenerationOutcome::Completed {
            images: extracted.images,
            unresolved: extracted.unresolved,
        };
    }

    match body.get("task_id").and_then(TaskHandle::from_value) {
        Some(task) => GenerationOutcome::Pending(task),
        None => GenerationOutcome::Empty { raw: Some(body) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageRef;
    use serde_json::json;

    #[test]
    fn test_task_id_triggers_poll_mode() {
        let outcome = interpret_response(Some(json!({"task_id": "abc"})));
        assert_eq!(outcome, GenerationOutcome::Pending(TaskHandle::new("abc")));
    }

    #[test]
    fn test_placeholders_only_with_task_id_polls() {
        let outcome = interpret_response(Some(json!({
            "task_id": 123,
            "images": ["ssupload:aaa"]
        })));
        assert_eq!(outcome, GenerationOutcome::Pending(TaskHandle::new("123")));
    }

    #[test]
    fn test_immediate_images() {
        let outcome = interpret_response(Some(json!({
            "task_id": "abc",
            "images": ["https://cdn/a.png", "ssupload:bbb"]
        })));
        assert_eq!(
            outcome,
            GenerationOutcome::Completed {
                images: vec![ImageRef::Url("https://cdn/a.png".into())],
                unresolved: 1,
            }
        );
    }

    #[test]
    fn test_empty_outcomes() {
        assert_eq!(interpret_response(None), GenerationOutcome::Empty { raw: None });

        let body = json!({"message": "accepted"});
        assert_eq!(
            interpret_response(Some(body.clone())),
            GenerationOutcome::Empty { raw: Some(body) }
        );
    }
}
