use crate::{
    config::ViduConfig,
    error::{Result, ViduError},
    models::ImageRef,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

pub const MAX_REFERENCES: usize = 7;

/// An input image that guides generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceImage {
    Url(String),
    /// A full `data:<mime>;base64,...` URI.
    Inline(String),
}

impl ReferenceImage {
    pub fn url(url: impl Into<String>) -> Self {
        ReferenceImage::Url(url.into())
    }

    /// Wrap raw bytes as an inline data URI.
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Self {
        ReferenceImage::Inline(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    /// Read a local image file. The media type follows the file extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime = mime_for_extension(path).ok_or_else(|| {
            ViduError::ValidationError(format!(
                "Unsupported reference image type: {}",
                path.display()
            ))
        })?;
        let bytes = tokio::fs::read(path).await?;
        log::debug!("Loaded reference image {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::from_bytes(&bytes, mime))
    }

    /// Accepts a URL, a data URI, or a path to a local file.
    pub async fn from_arg(arg: &str) -> Result<Self> {
        let value = arg.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(ReferenceImage::Url(value.to_string()))
        } else if value.starts_with("data:") {
            Ok(ReferenceImage::Inline(value.to_string()))
        } else {
            Self::from_path(value).await
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReferenceImage::Url(s) | ReferenceImage::Inline(s) => s,
        }
    }
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub images: Vec<ReferenceImage>,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
    pub seed: Option<i64>,
    pub callback_url: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ReferenceImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_images(mut self, images: impl IntoIterator<Item = ReferenceImage>) -> Self {
        self.images.extend(images);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Client-side checks; must pass before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(ViduError::ValidationError("Prompt must not be empty".into()));
        }
        if self.images.is_empty() {
            return Err(ViduError::ValidationError(
                "At least one reference image is required".into(),
            ));
        }
        if self.images.len() > MAX_REFERENCES {
            return Err(ViduError::ValidationError(format!(
                "At most {} reference images are supported, got {}",
                MAX_REFERENCES,
                self.images.len()
            )));
        }
        Ok(())
    }

    /// Build the wire body, filling unset fields from the client config.
    pub fn to_payload<'a>(&'a self, config: &'a ViduConfig) -> GenerationPayload<'a> {
        let callback_url = self
            .callback_url
            .as_deref()
            .or(config.callback_url.as_deref())
            .filter(|url| !url.trim().is_empty());

        GenerationPayload {
            model: self.model.as_deref().unwrap_or(&config.model),
            images: self.images.iter().map(ReferenceImage::as_str).collect(),
            prompt: &self.prompt,
            seed: self.seed.unwrap_or(0),
            aspect_ratio: self.aspect_ratio.as_deref().unwrap_or(&config.aspect_ratio),
            payload: "",
            callback_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationPayload<'a> {
    pub model: &'a str,
    pub images: Vec<&'a str>,
    pub prompt: &'a str,
    pub seed: i64,
    pub aspect_ratio: &'a str,
    pub payload: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
}

/// Opaque id of a generation that finishes asynchronously.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        TaskHandle(id.into())
    }

    /// The service has been seen returning task ids both as strings and numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(TaskHandle(s.trim().to_string())),
            Value::Number(n) => Some(TaskHandle(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed {
        images: Vec<ImageRef>,
        /// Placeholders dropped from the response.
        unresolved: usize,
    },
    Pending(TaskHandle),
    Empty {
        raw: Option<Value>,
    },
}
