//! Generative visual asset resolver.
//!
//! A hosting view mounts a [`ResolverInstance`] with a prompt and an
//! [`AspectRatio`]; the instance asks a [`GenerationClient`] for an image and
//! ends up `Ready` with a data URI or `Fallback` with a prompt-seeded
//! placeholder URL. Failures never reach the view as errors.

pub mod config;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod resolver;
pub mod traits;
pub mod view;

pub use config::{Config, FallbackConfig, GeminiConfig};
pub use error::{FailureKind, GenerationError, Result};
pub use fallback::PicsumFallback;
pub use gemini::GeminiImageClient;
pub use models::{AspectRatio, AssetHandle, GenerationOutcome, GenerationRequest};
pub use resolver::{AssetResolver, OutcomeStream, ResolverInstance};
pub use traits::{FallbackProvider, GenerationClient};
pub use view::{AssetView, PresentationMode};
