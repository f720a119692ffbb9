use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const API_KEY_FILE: &str = "apikey.txt";
const SAVE_PATH_FILE: &str = "savepath.txt";

/// The two mutable user preferences, each in its own plaintext file under
/// the per-user config directory. A missing or unreadable file reads as
/// "not set"; writes replace the file wholesale.
pub struct Prefs {
    dir: PathBuf,
}

impl Prefs {
    pub fn open_default() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voicepad");
        Self { dir }
    }

    /// Store rooted at an explicit directory. Used by tests.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load_api_key(&self) -> String {
        match fs::read_to_string(self.dir.join(API_KEY_FILE)) {
            Ok(contents) => contents.trim().to_string(),
            Err(e) => {
                tracing::debug!("no stored API key: {}", e);
                String::new()
            }
        }
    }

    pub fn load_save_folder(&self) -> PathBuf {
        match fs::read_to_string(self.dir.join(SAVE_PATH_FILE)) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    default_save_folder()
                } else {
                    PathBuf::from(trimmed)
                }
            }
            Err(e) => {
                tracing::debug!("no stored save folder: {}", e);
                default_save_folder()
            }
        }
    }

    pub fn save_api_key(&self, key: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(API_KEY_FILE);
        fs::write(&path, key.trim())?;
        restrict_to_owner(&path)
    }

    pub fn save_save_folder(&self, folder: &Path) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(
            self.dir.join(SAVE_PATH_FILE),
            folder.to_string_lossy().as_bytes(),
        )
    }
}

pub fn default_save_folder() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

// The key sits on disk in plain text; owner-only mode is the one guarantee
// the store makes about it.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> io::Result<()> {
    Ok(())
}
