use crate::error::{GenerationError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Style directive appended to every prompt before it is sent.
pub const QUALITY_SUFFIX: &str =
    ". High resolution, professional, clean style, high quality photography.";

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Standard,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Standard => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Widescreen),
            "4:3" => Ok(AspectRatio::Standard),
            other => Err(GenerationError::ConfigError(format!(
                "Unsupported aspect ratio '{}', expected 1:1, 16:9 or 4:3",
                other
            ))),
        }
    }
}

/// One image generation request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidPrompt(
                "prompt must not be empty".into(),
            ));
        }
        Ok(Self {
            prompt,
            aspect_ratio,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Prompt text as transmitted to the generation service.
    pub fn instruction(&self) -> String {
        format!("{}{}", self.prompt, QUALITY_SUFFIX)
    }
}

/// Base64 image bytes lifted out of a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Builds an inline image, rejecting payloads that are not valid base64.
    pub fn new(mime_type: Option<&str>, data: &str) -> Result<Self> {
        let data = data.trim();
        BASE64
            .decode(data.as_bytes())
            .map_err(|e| GenerationError::ResponseError(format!("invalid image payload: {}", e)))?;

        let mime_type = mime_type
            .map(str::trim)
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME);

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
