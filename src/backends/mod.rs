pub mod elevenlabs;

use async_trait::async_trait;

use crate::error::SynthesisError;

/// Trait every remote synthesis provider implements.
/// Keeps the workflow decoupled from any one vendor's HTTP surface.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Returns the unique ID of the backend (e.g., "elevenlabs")
    fn id(&self) -> &'static str;

    /// Converts `text` into one complete buffer of encoded audio.
    /// Implementations never hand back a partial response.
    async fn synthesize(&self, text: &str, api_key: &str) -> Result<Vec<u8>, SynthesisError>;
}
