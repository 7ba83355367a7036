use serde::Serialize;
use std::fmt;

/// Storage handles the service sometimes returns in place of a real URL.
pub const UNRESOLVED_PREFIX: &str = "ssupload:";

/// A single output image as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    DataUri(String),
    /// Bare base64 body with no media type attached.
    Base64(String),
}

impl ImageRef {
    /// Classify a raw string from a response body.
    ///
    /// Returns `None` for blanks and for unresolved storage handles, which
    /// cannot be displayed until exchanged for a real URL.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() || value.starts_with(UNRESOLVED_PREFIX) {
            return None;
        }
        if value.starts_with("http://") || value.starts_with("https://") {
            Some(ImageRef::Url(value.to_string()))
        } else if value.starts_with("data:") {
            Some(ImageRef::DataUri(value.to_string()))
        } else {
            Some(ImageRef::Base64(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Url(s) | ImageRef::DataUri(s) | ImageRef::Base64(s) => s,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageRef::Url(_))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Url(url) => write!(f, "{}", url),
            ImageRef::DataUri(uri) => write!(f, "<inline image, {} bytes>", uri.len()),
            ImageRef::Base64(body) => write!(f, "<base64 image, {} bytes>", body.len()),
        }
    }
}
