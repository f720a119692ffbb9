use std::path::PathBuf;
use thiserror::Error;

/// Pre-flight problems caught before any network traffic happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no API key set")]
    EmptyApiKey,
    #[error("no text to synthesize")]
    EmptyText,
}

/// Failures of the remote synthesis call.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The provider rejected the API key (401/403). The provider's own
    /// message is carried through untouched.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("nothing to synthesize")]
    EmptyInput,
    /// Any other provider-side or transport failure.
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        SynthesisError::Provider(err.to_string())
    }
}

/// Failures of the local audio engine.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio loaded yet")]
    NoAudio,
    #[error("a generation is in progress")]
    GenerationInProgress,
    #[error("audio file not found: {0:?}")]
    MissingFile(PathBuf),
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("audio engine error: {0}")]
    Engine(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while writing the audio buffer into the save folder.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no audio to save")]
    NoAudio,
    #[error("a generation is in progress")]
    GenerationInProgress,
    #[error("save folder does not exist: {0:?}")]
    MissingFolder(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
