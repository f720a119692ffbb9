use std::path::PathBuf;

/// Where the workflow currently stands. Gates which requests are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A worker is out. Further generate requests are dropped and the
    /// buffer is left alone until the worker reports back.
    Generating,
    /// A buffer is loaded; replay and save are available.
    Ready,
}

/// Everything the app remembers between events. Only the UI thread reads or
/// writes it, so there is nothing to lock.
pub struct ApplicationState {
    pub phase: Phase,
    pub audio_buffer: Option<Vec<u8>>,
    /// The text the buffer was generated from. Also names the saved file.
    pub last_text: String,
    /// The staged file currently loaded into the player, if any.
    pub current_file: Option<PathBuf>,
    pub save_folder: PathBuf,
}

impl ApplicationState {
    pub fn new(save_folder: PathBuf) -> Self {
        Self {
            phase: Phase::Idle,
            audio_buffer: None,
            last_text: String::new(),
            current_file: None,
            save_folder,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio_buffer.is_some()
    }
}
