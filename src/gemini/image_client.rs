use crate::{
    config::GeminiConfig,
    error::{GenerationError, Result},
    models::{
        Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        GenerationRequest, ImageConfig, Part,
    },
    traits::GenerationClient,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{API_VERSION, IMAGE_MODEL};

#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiImageClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, IMAGE_MODEL
        )
    }

    pub fn build_payload(request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(request.instruction())],
            }],
            generation_config: GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio: request.aspect_ratio().as_str().to_string(),
                },
            },
        }
    }
}

fn classify_send_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout(e.to_string())
    } else {
        GenerationError::TransportError(e.to_string())
    }
}

#[async_trait]
impl GenerationClient for GeminiImageClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateContentResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::AuthError("no API key configured".into()))?;

        let payload = Self::build_payload(request);
        log::info!(
            "Generating image with model: {} (aspect ratio {})",
            IMAGE_MODEL,
            request.aspect_ratio()
        );
        log::debug!("Generation prompt: {}", request.instruction());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("Gemini error body: {}", body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    GenerationError::AuthError(format!("Gemini rejected credentials ({})", status))
                }
                _ => GenerationError::TransportError(format!(
                    "Gemini request failed with status {}",
                    status
                )),
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(e.to_string())
                } else {
                    GenerationError::ResponseError(e.to_string())
                }
            })
    }

    fn model(&self) -> &str {
        IMAGE_MODEL
    }
}
