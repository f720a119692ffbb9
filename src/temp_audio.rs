use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

const FILE_PREFIX: &str = "speech_";
const RETRY_ATTEMPTS: u32 = 6;
const RETRY_BASE: Duration = Duration::from_millis(10);

/// Owns the scratch directory that playback files are staged into. The
/// directory is shared across runs, so the startup purge also sweeps
/// leftovers a crashed run never got to delete.
pub struct TempAudioStore {
    dir: PathBuf,
}

impl TempAudioStore {
    pub fn open_default() -> Self {
        Self::at(std::env::temp_dir().join("voicepad"))
    }

    /// Store rooted at an explicit directory. Used by tests.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if needed and hands out a fresh, unused path.
    pub fn create_unique_path(&self) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let tag = Uuid::new_v4().simple().to_string();
        Ok(self.dir.join(format!("{}{}.mp3", FILE_PREFIX, &tag[..8])))
    }

    /// Deletes one file, retrying with backoff while the player lets go of
    /// its handle. Returns true once the file is gone.
    pub fn remove_with_retry(&self, path: &Path) -> bool {
        let mut delay = RETRY_BASE;
        for attempt in 0..RETRY_ATTEMPTS {
            match fs::remove_file(path) {
                Ok(()) => return true,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
                Err(e) => {
                    tracing::debug!(
                        "unlink attempt {} for {:?} failed: {}",
                        attempt + 1,
                        path,
                        e
                    );
                    thread::sleep(delay);
                    delay *= 2;
                }
            }
        }
        false
    }

    /// Best-effort sweep of every staged file. Locked files and files that
    /// are not ours stay behind; the directory itself goes once empty.
    pub fn purge_all(&self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(FILE_PREFIX) && name.ends_with(".mp3") {
                if let Err(e) = fs::remove_file(entry.path()) {
                    tracing::debug!("leaving temp file {:?}: {}", entry.path(), e);
                }
            }
        }
        let _ = fs::remove_dir(&self.dir);
    }
}

impl Drop for TempAudioStore {
    fn drop(&mut self) {
        self.purge_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unique_paths_have_prefix_and_differ() {
        let dir = tempdir().unwrap();
        let store = TempAudioStore::at(dir.path().join("audio"));

        let first = store.create_unique_path().unwrap();
        let second = store.create_unique_path().unwrap();

        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("speech_"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(name.len(), "speech_".len() + 8 + ".mp3".len());
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_with_retry_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let store = TempAudioStore::at(dir.path().join("audio"));
        assert!(store.remove_with_retry(&dir.path().join("audio").join("speech_gone.mp3")));
    }

    #[test]
    fn test_remove_with_retry_deletes_existing_file() {
        let dir = tempdir().unwrap();
        let store = TempAudioStore::at(dir.path().join("audio"));
        let path = store.create_unique_path().unwrap();
        fs::write(&path, b"bytes").unwrap();

        assert!(store.remove_with_retry(&path));
        assert!(!path.exists());
    }

    #[test]
    fn test_purge_only_touches_staged_files() {
        let dir = tempdir().unwrap();
        let store = TempAudioStore::at(dir.path().join("audio"));
        let staged = store.create_unique_path().unwrap();
        fs::write(&staged, b"bytes").unwrap();
        let foreign = store.dir().join("keep.txt");
        fs::write(&foreign, b"not ours").unwrap();

        store.purge_all();

        assert!(!staged.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn test_drop_sweeps_the_directory() {
        let dir = tempdir().unwrap();
        let staged;
        {
            let store = TempAudioStore::at(dir.path().join("audio"));
            staged = store.create_unique_path().unwrap();
            fs::write(&staged, b"bytes").unwrap();
        }
        assert!(!staged.exists());
    }
}
