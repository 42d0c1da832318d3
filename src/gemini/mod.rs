pub mod image_client;

pub use image_client::GeminiImageClient;

pub const API_VERSION: &str = "v1beta";
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";
