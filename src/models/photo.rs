use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Squarish,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Squarish => "squarish",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            "squarish" => Ok(Orientation::Squarish),
            other => Err(format!("unknown orientation '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhotoSearchRequest {
    pub query: String,
    pub per_page: Option<u32>,
    pub orientation: Option<Orientation>,
}

impl PhotoSearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            per_page: None,
            orientation: None,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoUrls {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub full: Option<String>,
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub urls: PhotoUrls,
    #[serde(default)]
    pub user: PhotoUser,
}

impl Photo {
    /// Best caption available: description, then alt text.
    pub fn caption(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.alt_description.as_deref())
    }

    /// Preferred display URL, largest reasonable size first.
    pub fn display_url(&self) -> Option<&str> {
        self.urls
            .regular
            .as_deref()
            .or(self.urls.small.as_deref())
            .or(self.urls.full.as_deref())
            .or(self.urls.thumb.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoSearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub results: Vec<Photo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_orientation_parse() {
        assert_eq!("Portrait".parse::<Orientation>(), Ok(Orientation::Portrait));
        assert_eq!("squarish".parse::<Orientation>(), Ok(Orientation::Squarish));
        assert!("wide".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_search_response_tolerates_missing_fields() {
        let body = json!({
            "total": 1,
            "results": [{
                "id": "Dwu85P9SOIk",
                "alt_description": "a cat",
                "urls": {"small": "https://images.unsplash.com/small.jpg"},
                "user": {"name": "Jane"}
            }]
        });
        let response: PhotoSearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.total_pages, 0);

        let photo = &response.results[0];
        assert_eq!(photo.caption(), Some("a cat"));
        assert_eq!(photo.display_url(), Some("https://images.unsplash.com/small.jpg"));
        assert_eq!(photo.user.name.as_deref(), Some("Jane"));
    }
}
