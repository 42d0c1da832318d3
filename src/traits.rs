use crate::{
    error::Result,
    models::{GenerateContentResponse, GenerationRequest},
};
use async_trait::async_trait;

/// Remote image generation service.
///
/// Implementations transmit `request.instruction()` together with
/// `request.aspect_ratio()` unmodified and hand back the raw response;
/// extracting the image is the resolver's job.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateContentResponse>;

    fn model(&self) -> &str;
}

/// Deterministic, prompt-seeded placeholder image source.
pub trait FallbackProvider: Send + Sync {
    /// Must be a pure function of `seed`.
    fn locate(&self, seed: &str) -> String;
}
