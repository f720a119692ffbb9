use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::backends::SynthesisBackend;
use crate::config_loader;
use crate::error::{PlaybackError, SaveError, SynthesisError, ValidationError};
use crate::events::AppEvent;
use crate::player::AudioPlayer;
use crate::prefs::Prefs;
use crate::save;
use crate::state::{ApplicationState, Phase};
use crate::temp_audio::TempAudioStore;

/// What became of a generation request.
#[derive(Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Started,
    /// The text crossed the length gate; nothing was sent yet. The shell
    /// asks the user and retries with `confirmed_long` set.
    NeedsConfirmation { chars: usize },
    Rejected(ValidationError),
    /// A generation is already running. The request is dropped whole.
    Ignored,
}

/// What the completion step did, for the shell's status output.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// Buffer stored and playing.
    Playing,
    /// Buffer stored, but the local playback step failed. Replay and save
    /// still work.
    StoredWithoutPlayback(PlaybackError),
    /// The provider call failed; nothing was stored.
    Failed(SynthesisError),
}

/// Drives the whole generate / play / save / reset workflow. Lives on the
/// UI thread; the only thing that ever runs elsewhere is the provider call,
/// and its result comes back through the event queue.
pub struct Controller {
    state: ApplicationState,
    backend: Arc<dyn SynthesisBackend>,
    player: Box<dyn AudioPlayer>,
    temp_store: TempAudioStore,
    prefs: Prefs,
    events: Sender<AppEvent>,
    long_text_threshold: usize,
    max_filename_len: usize,
}

impl Controller {
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        player: Box<dyn AudioPlayer>,
        temp_store: TempAudioStore,
        prefs: Prefs,
        events: Sender<AppEvent>,
    ) -> Self {
        let long_text_threshold = config_loader::SETTINGS
            .read()
            .map(|s| s.long_text_threshold)
            .unwrap_or(10_000);
        let max_filename_len = config_loader::SETTINGS
            .read()
            .map(|s| s.max_filename_len)
            .unwrap_or(50);
        let save_folder = prefs.load_save_folder();

        Self {
            state: ApplicationState::new(save_folder),
            backend,
            player,
            temp_store,
            prefs,
            events,
            long_text_threshold,
            max_filename_len,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn has_audio(&self) -> bool {
        self.state.has_audio()
    }

    pub fn save_folder(&self) -> &Path {
        &self.state.save_folder
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_busy()
    }

    /// Validates a request and, if everything checks out, sends exactly one
    /// worker thread out for it. The worker does nothing but the provider
    /// call; its verdict arrives as an `AppEvent::SynthesisFinished`.
    pub fn request_generation(
        &mut self,
        text: &str,
        api_key: &str,
        confirmed_long: bool,
    ) -> GenerationOutcome {
        if self.state.phase == Phase::Generating {
            tracing::debug!("generation already running, request dropped");
            return GenerationOutcome::Ignored;
        }

        let text = text.trim();
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return GenerationOutcome::Rejected(ValidationError::EmptyApiKey);
        }
        if text.is_empty() {
            return GenerationOutcome::Rejected(ValidationError::EmptyText);
        }
        let chars = text.chars().count();
        if chars > self.long_text_threshold && !confirmed_long {
            return GenerationOutcome::NeedsConfirmation { chars };
        }

        self.state.phase = Phase::Generating;

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let text = text.to_string();
        let api_key = api_key.to_string();
        thread::spawn(move || {
            // One request, one thread, one single-threaded runtime.
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(backend.synthesize(&text, &api_key)),
                Err(e) => Err(SynthesisError::Provider(format!("runtime: {}", e))),
            };
            let _ = events.send(AppEvent::SynthesisFinished {
                text,
                api_key,
                result,
            });
        });

        GenerationOutcome::Started
    }

    /// Completion handler, run on the UI thread when the worker's event is
    /// drained. On success the buffer is stored, staged to a temp file and
    /// played, and the key is persisted. `api_key` is the worker's echo of
    /// the key the provider accepted, never the entry field's current value.
    pub fn finish_generation(
        &mut self,
        text: String,
        api_key: String,
        result: Result<Vec<u8>, SynthesisError>,
    ) -> CompletionOutcome {
        let bytes = match result {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                self.state.phase = self.settled_phase();
                return CompletionOutcome::Failed(SynthesisError::Provider(
                    "no audio received".to_string(),
                ));
            }
            Err(e) => {
                self.state.phase = self.settled_phase();
                return CompletionOutcome::Failed(e);
            }
        };

        let played = self.stage_and_play(&bytes);

        self.state.audio_buffer = Some(bytes);
        self.state.last_text = text;
        self.state.phase = Phase::Ready;

        if let Err(e) = self.prefs.save_api_key(&api_key) {
            tracing::warn!("could not persist API key: {}", e);
        }

        match played {
            Ok(()) => CompletionOutcome::Playing,
            Err(e) => CompletionOutcome::StoredWithoutPlayback(e),
        }
    }

    /// Plays the stored buffer again from a freshly staged file. Refused
    /// while a generation is running, like every stale-buffer operation.
    pub fn replay(&mut self) -> Result<(), PlaybackError> {
        if self.state.phase == Phase::Generating {
            return Err(PlaybackError::GenerationInProgress);
        }
        let bytes = match self.state.audio_buffer.take() {
            Some(bytes) => bytes,
            None => return Err(PlaybackError::NoAudio),
        };
        let result = self.stage_and_play(&bytes);
        self.state.audio_buffer = Some(bytes);
        result
    }

    pub fn stop_playback(&self) {
        self.player.stop();
    }

    /// Writes the buffer under the save folder, named after the text it was
    /// generated from. Never clobbers an existing file. Refused while a
    /// generation is running.
    pub fn download(&self) -> Result<PathBuf, SaveError> {
        if self.state.phase == Phase::Generating {
            return Err(SaveError::GenerationInProgress);
        }
        let bytes = match &self.state.audio_buffer {
            Some(bytes) => bytes,
            None => return Err(SaveError::NoAudio),
        };
        // The buffered audio may still be feeding the player.
        self.player.stop();

        let base = save::sanitize_filename(&self.state.last_text, self.max_filename_len);
        save::write_unique(&self.state.save_folder, &base, bytes)
    }

    /// Back to a blank slate: no buffer, no text, no staged file. A worker
    /// already out keeps running and will repopulate the buffer when it
    /// reports back.
    pub fn reset(&mut self) {
        self.player.stop();
        self.state.audio_buffer = None;
        self.state.last_text.clear();
        if let Some(path) = self.state.current_file.take() {
            if !self.temp_store.remove_with_retry(&path) {
                tracing::warn!("temp file still locked: {:?}", path);
            }
        }
        if self.state.phase != Phase::Generating {
            self.state.phase = Phase::Idle;
        }
    }

    /// Validates and persists a new save folder.
    pub fn set_save_folder(&mut self, folder: &Path) -> Result<(), SaveError> {
        if !folder.is_dir() {
            return Err(SaveError::MissingFolder(folder.to_path_buf()));
        }
        self.state.save_folder = folder.to_path_buf();
        if let Err(e) = self.prefs.save_save_folder(folder) {
            tracing::warn!("could not persist save folder: {}", e);
        }
        Ok(())
    }

    /// Final cleanup before exit. Playback stops first so the staged file's
    /// handle has a chance to settle before the sweep.
    pub fn shutdown(&mut self) {
        self.player.stop();
        if let Some(path) = self.state.current_file.take() {
            self.temp_store.remove_with_retry(&path);
        }
        self.temp_store.purge_all();
    }

    fn settled_phase(&self) -> Phase {
        if self.state.has_audio() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// Stops whatever is playing, retires the previous staged file, writes
    /// `bytes` to a fresh one and hands it to the player.
    fn stage_and_play(&mut self, bytes: &[u8]) -> Result<(), PlaybackError> {
        self.player.stop();
        if let Some(old) = self.state.current_file.take() {
            if !self.temp_store.remove_with_retry(&old) {
                tracing::warn!("stale temp file left behind: {:?}", old);
            }
        }

        let path = self.temp_store.create_unique_path()?;
        fs::write(&path, bytes)?;
        self.state.current_file = Some(path.clone());
        self.player.play(&path)?;
        Ok(())
    }
}
