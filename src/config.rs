use crate::models::Orientation;
use std::env;
use std::time::Duration;

pub const DEFAULT_VIDU_BASE_URL: &str = "https://api.vidu.cn";
pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_MODEL: &str = "viduq1";
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

#[derive(Debug, Clone)]
pub struct ViduConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub aspect_ratio: String,
    pub callback_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct UnsplashConfig {
    pub access_key: Option<String>,
    pub base_url: String,
    pub per_page: u32,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub vidu: ViduConfig,
    pub poll: PollConfig,
    pub unsplash: UnsplashConfig,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_url_var(key: &str) -> Option<String> {
    non_empty_var(key).map(|v| v.trim_end_matches('/').to_string())
}

impl Default for ViduConfig {
    fn default() -> Self {
        ViduConfig {
            api_key: None,
            base_url: DEFAULT_VIDU_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            callback_url: None,
            timeout_secs: 30,
        }
    }
}

impl ViduConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        ViduConfig {
            api_key: non_empty_var("VIDU_API_KEY"),
            base_url: base_url_var("VIDU_BASE_URL").unwrap_or(defaults.base_url),
            model: non_empty_var("VIDU_MODEL").unwrap_or(defaults.model),
            aspect_ratio: non_empty_var("VIDU_ASPECT_RATIO").unwrap_or(defaults.aspect_ratio),
            callback_url: non_empty_var("VIDU_CALLBACK_URL"),
            timeout_secs: non_empty_var("VIDU_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        // ~2 minutes in total
        PollConfig {
            max_attempts: 40,
            interval: Duration::from_millis(3000),
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        PollConfig {
            max_attempts: non_empty_var("VIDU_POLL_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            interval: non_empty_var("VIDU_POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        UnsplashConfig {
            access_key: None,
            base_url: DEFAULT_UNSPLASH_BASE_URL.to_string(),
            per_page: 20,
            orientation: Orientation::Landscape,
        }
    }
}

impl UnsplashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        UnsplashConfig {
            access_key: non_empty_var("UNSPLASH_ACCESS_KEY"),
            base_url: base_url_var("UNSPLASH_BASE_URL").unwrap_or(defaults.base_url),
            per_page: non_empty_var("UNSPLASH_PER_PAGE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.per_page),
            orientation: non_empty_var("UNSPLASH_ORIENTATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.orientation),
        }
    }

    pub fn with_access_key(mut self, access_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// The key is usable when present and not the sample placeholder.
    pub fn has_valid_key(&self) -> bool {
        self.access_key
            .as_deref()
            .map(str::trim)
            .map_or(false, |k| !k.is_empty() && k != "YOUR_UNSPLASH_API_KEY_HERE")
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            vidu: ViduConfig::from_env(),
            poll: PollConfig::from_env(),
            unsplash: UnsplashConfig::from_env(),
        }
    }

    pub fn with_vidu(mut self, config: ViduConfig) -> Self {
        self.vidu = config;
        self
    }

    pub fn with_poll(mut self, config: PollConfig) -> Self {
        self.poll = config;
        self
    }

    pub fn with_unsplash(mut self, config: UnsplashConfig) -> Self {
        self.unsplash = config;
        self
    }
}
