use crate::models::GenerationOutcome;
use serde::Serialize;

pub const LOADING_LABEL: &str = "AI Generating...";
pub const FALLBACK_ALT: &str = "Fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    Loading,
    Ready,
    Fallback,
}

/// What a hosting view needs to draw the asset slot. Styling is up to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetView {
    pub mode: PresentationMode,
    pub src: Option<String>,
    pub alt: String,
}

impl AssetView {
    pub fn from_outcome(outcome: &GenerationOutcome, prompt: &str) -> Self {
        match outcome {
            GenerationOutcome::Loading => AssetView {
                mode: PresentationMode::Loading,
                src: None,
                alt: LOADING_LABEL.to_string(),
            },
            GenerationOutcome::Ready(handle) => AssetView {
                mode: PresentationMode::Ready,
                src: Some(handle.as_str().to_string()),
                alt: prompt.to_string(),
            },
            GenerationOutcome::Fallback(handle) => AssetView {
                mode: PresentationMode::Fallback,
                src: Some(handle.as_str().to_string()),
                alt: FALLBACK_ALT.to_string(),
            },
        }
    }
}
