//! Client for the Vidu reference-to-image API and Unsplash photo search.
//!
//! Generation requests that are not answered with images straight away come
//! back with a task id; [`TaskPoller`] then checks the task at a fixed
//! interval until it yields images, fails, or runs out of attempts.

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod unsplash;
pub mod vidu;

pub use config::{Config, PollConfig, UnsplashConfig, ViduConfig};
pub use error::{Result, ViduError};
pub use models::{
    GenerationOutcome, GenerationRequest, ImageRef, Orientation, Photo, PhotoSearchRequest,
    PhotoSearchResponse, RawBody, RawResponse, ReferenceImage, TaskHandle,
};
pub use unsplash::PhotoClient;
pub use vidu::{ImageClient, PollHandle, TaskClient, TaskPoller, TaskSource, ViduClient};
