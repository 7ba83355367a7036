pub mod common;
pub mod image;
pub mod photo;
pub mod response;

pub use common::*;
pub use image::*;
pub use photo::*;
pub use response::*;
