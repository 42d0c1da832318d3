pub mod instance;
#[cfg(test)]
pub(crate) mod testing;

use crate::{
    config::Config,
    error::{GenerationError, Result},
    fallback::PicsumFallback,
    gemini::GeminiImageClient,
    logger,
    models::{AssetHandle, GenerateContentResponse, GenerationOutcome, GenerationRequest, InlineImage},
    traits::{FallbackProvider, GenerationClient},
};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

pub use instance::ResolverInstance;

pub type OutcomeStream = Pin<Box<dyn Stream<Item = GenerationOutcome> + Send>>;

/// Turns prompts into displayable assets: a generated image when the
/// service delivers one, otherwise a prompt-seeded fallback.
#[derive(Clone)]
pub struct AssetResolver {
    client: Arc<dyn GenerationClient>,
    fallback: Arc<dyn FallbackProvider>,
}

impl AssetResolver {
    pub fn new(client: Arc<dyn GenerationClient>, fallback: Arc<dyn FallbackProvider>) -> Self {
        Self { client, fallback }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiImageClient::new(config.gemini.clone())?;
        let fallback = PicsumFallback::new(config.fallback.clone());
        Ok(Self::new(Arc::new(client), Arc::new(fallback)))
    }

    /// `Loading`, then exactly one terminal outcome. Nothing is sent to the
    /// service until the stream is polled past the first item.
    pub fn resolve(&self, request: GenerationRequest) -> OutcomeStream {
        let resolver = self.clone();
        let terminal = async move { resolver.settle(&request).await };

        stream::once(async { GenerationOutcome::Loading })
            .chain(stream::once(terminal))
            .boxed()
    }

    /// Runs one generation call and collapses every failure into `Fallback`.
    pub async fn settle(&self, request: &GenerationRequest) -> GenerationOutcome {
        let request_id = short_id();
        let result = {
            let _timer = logger::timer(&format!("generation [req:{}]", request_id));
            self.client
                .generate(request)
                .await
                .and_then(|response| extract_image(&response))
        };

        match result {
            Ok(image) => {
                log::info!(
                    "[req:{}] Generated {} image ({} base64 chars)",
                    request_id,
                    image.mime_type,
                    image.data.len()
                );
                GenerationOutcome::Ready(AssetHandle::new(image.to_data_uri()))
            }
            Err(e) => {
                log::warn!(
                    "[req:{}] Image generation failed ({}): {}; using fallback",
                    request_id,
                    e.kind().as_str(),
                    e
                );
                self.fallback_for(request.prompt())
            }
        }
    }

    pub fn fallback_for(&self, prompt: &str) -> GenerationOutcome {
        GenerationOutcome::Fallback(AssetHandle::new(self.fallback.locate(prompt)))
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

/// Pulls the first inline image out of the first candidate.
pub fn extract_image(response: &GenerateContentResponse) -> Result<InlineImage> {
    let inline = response.first_inline_image().ok_or_else(|| {
        let reason = if response.candidates.is_empty() {
            "response has no candidates".to_string()
        } else {
            match response.finish_reason() {
                Some(reason) => format!("no image part in first candidate (finish reason {})", reason),
                None => "no image part in first candidate".to_string(),
            }
        };
        GenerationError::EmptyResult(reason)
    })?;

    InlineImage::new(inline.mime_type.as_deref(), &inline.data)
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
