use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Mutex;

use crate::error::PlaybackError;

/// Local playback seam. The workflow only ever needs load, stop and busy.
pub trait AudioPlayer {
    fn play(&self, path: &Path) -> Result<(), PlaybackError>;
    /// Stops the current sound. The underlying file handle may be released
    /// an audio callback later, so deletion goes through retry, never sleep.
    fn stop(&self);
    fn is_busy(&self) -> bool;
}

/// rodio-backed player. The output stream is bound to the thread that
/// created it, so the whole player lives on the UI thread.
pub struct RodioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Mutex<Option<Sink>>,
}

impl RodioPlayer {
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::NoDevice(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: Mutex::new(None),
        })
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        self.stop();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PlaybackError::MissingFile(path.to_path_buf()))
            }
            Err(e) => return Err(PlaybackError::Engine(e.to_string())),
        };
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Engine(e.to_string()))?;
        let sink =
            Sink::try_new(&self.handle).map_err(|e| PlaybackError::Engine(e.to_string()))?;
        sink.append(source);

        if let Ok(mut slot) = self.sink.lock() {
            *slot = Some(sink);
        }
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.sink.lock() {
            if let Some(sink) = slot.take() {
                sink.stop();
            }
        }
    }

    fn is_busy(&self) -> bool {
        match self.sink.lock() {
            Ok(slot) => slot.as_ref().map(|sink| !sink.empty()).unwrap_or(false),
            Err(_) => false,
        }
    }
}
