use crate::{config::FallbackConfig, traits::FallbackProvider};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const FALLBACK_IMAGE_SIZE: u32 = 800;

/// Escapes everything except alphanumerics and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Seeded placeholder images addressed as `{base}/seed/{seed}/{size}/{size}`.
#[derive(Debug, Clone)]
pub struct PicsumFallback {
    base_url: String,
}

impl PicsumFallback {
    pub fn new(config: FallbackConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for PicsumFallback {
    fn default() -> Self {
        Self::new(FallbackConfig::default())
    }
}

impl FallbackProvider for PicsumFallback {
    fn locate(&self, seed: &str) -> String {
        format!(
            "{}/seed/{}/{}/{}",
            self.base_url,
            utf8_percent_encode(seed, URI_COMPONENT),
            FALLBACK_IMAGE_SIZE,
            FALLBACK_IMAGE_SIZE
        )
    }
}
