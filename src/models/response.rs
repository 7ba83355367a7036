use crate::models::ImageRef;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Images pulled out of a response body, plus how many entries were
/// placeholders that had to be dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedImages {
    pub images: Vec<ImageRef>,
    pub unresolved: usize,
}

impl ExtractedImages {
    fn push_raw(&mut self, raw: &str) {
        match ImageRef::parse(raw) {
            Some(image) => self.images.push(image),
            None => self.unresolved += 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Null, `false` and blank strings count as absent, not as placeholders.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shapes accepted from the synchronous generation response:
/// `images: [..]`, `data: [..]` (strings, `{imageURL}` or `{images: [..]}`),
/// or `result.images: [..]`.
pub fn extract_images(body: &Value) -> ExtractedImages {
    let mut out = ExtractedImages::default();

    if let Some(images) = body.get("images").and_then(Value::as_array) {
        for image in images.iter().filter_map(Value::as_str) {
            out.push_raw(image);
        }
    } else if let Some(items) = body.get("data").and_then(Value::as_array) {
        for item in items {
            if let Some(s) = item.as_str() {
                out.push_raw(s);
            }
            if let Some(url) = item.get("imageURL").filter(|v| is_present(v)) {
                out.push_raw(&stringify(url));
            }
            if let Some(images) = item.get("images").and_then(Value::as_array) {
                for image in images.iter().filter_map(Value::as_str) {
                    out.push_raw(image);
                }
            }
        }
    } else if let Some(images) = body.pointer("/result/images").and_then(Value::as_array) {
        for image in images {
            out.push_raw(&stringify(image));
        }
    }

    out
}

/// Task status bodies only carry `images` or `result.images`.
pub fn extract_task_images(body: &Value) -> Vec<ImageRef> {
    let raw: Vec<String> = if let Some(images) = body.get("images").and_then(Value::as_array) {
        images.iter().map(stringify).collect()
    } else if let Some(images) = body.pointer("/result/images").and_then(Value::as_array) {
        images.iter().map(stringify).collect()
    } else {
        Vec::new()
    };

    raw.iter().filter_map(|s| ImageRef::parse(s)).collect()
}

/// The task state string, read from `state` and falling back to `status`.
pub fn task_state(body: &Value) -> Option<String> {
    ["state", "status"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

pub fn is_failed_state(state: &str) -> bool {
    state.eq_ignore_ascii_case("failed") || state.eq_ignore_ascii_case("error")
}

/// Body of a probed response. Falls back to text when it is not JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawBody {
    Json(Value),
    Text(String),
}

impl RawBody {
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => RawBody::Json(value),
            Err(_) => RawBody::Text(text),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RawResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: RawBody,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
