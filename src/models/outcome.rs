use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A displayable image reference: a data URI or a plain URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(String);

impl AssetHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// MIME type of a data-URI handle.
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, _) = rest.split_once(',')?;
        meta.split(';').next().filter(|mime| !mime.is_empty())
    }

    /// Raw bytes of a base64 data-URI handle; `None` for URL handles.
    pub fn decode_inline(&self) -> Option<Vec<u8>> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        if !meta.ends_with(";base64") {
            return None;
        }
        BASE64.decode(payload.as_bytes()).ok()
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of states a hosting view can observe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "handle", rename_all = "lowercase")]
pub enum GenerationOutcome {
    Loading,
    Ready(AssetHandle),
    Fallback(AssetHandle),
}

impl GenerationOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationOutcome::Loading)
    }

    pub fn handle(&self) -> Option<&AssetHandle> {
        match self {
            GenerationOutcome::Loading => None,
            GenerationOutcome::Ready(handle) | GenerationOutcome::Fallback(handle) => Some(handle),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Loading => "loading",
            GenerationOutcome::Ready(_) => "ready",
            GenerationOutcome::Fallback(_) => "fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inline_handle() {
        let handle = AssetHandle::new("data:image/png;base64,aGVsbG8=");
        assert!(handle.is_inline());
        assert_eq!(handle.mime_type(), Some("image/png"));
        assert_eq!(handle.decode_inline(), Some(b"hello".to_vec()));
    }

    #[test]
    fn test_url_handle_has_no_bytes() {
        let handle = AssetHandle::new("https://picsum.photos/seed/x/800/800");
        assert!(!handle.is_inline());
        assert_eq!(handle.mime_type(), None);
        assert_eq!(handle.decode_inline(), None);
    }

    #[test]
    fn test_outcome_states() {
        assert!(!GenerationOutcome::Loading.is_terminal());
        let ready = GenerationOutcome::Ready(AssetHandle::new("data:image/png;base64,AA=="));
        assert!(ready.is_terminal());
        assert_eq!(ready.label(), "ready");
        assert_eq!(GenerationOutcome::Loading.handle(), None);
        assert_eq!(
            serde_json::to_value(&GenerationOutcome::Loading).unwrap(),
            serde_json::json!({ "state": "loading" })
        );
    }
}
