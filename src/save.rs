use lazy_static::lazy_static;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SaveError;

lazy_static! {
    // Characters no common filesystem accepts in a file name
    static ref FORBIDDEN: Regex = Regex::new(r#"[\\/*?:"<>|]"#).expect("forbidden-char pattern");
}

/// Turns arbitrary text into a usable file stem: forbidden characters become
/// underscores, the result is trimmed and capped at `max_len` characters,
/// and an empty result falls back to "audio".
pub fn sanitize_filename(text: &str, max_len: usize) -> String {
    let cleaned = FORBIDDEN.replace_all(text, "_");
    let capped: String = cleaned.trim().chars().take(max_len).collect();
    if capped.is_empty() {
        "audio".to_string()
    } else {
        capped
    }
}

/// Writes `data` under `folder` as `<base>.mp3`, appending `_1`, `_2`, ...
/// until an unused name is found. An existing file is never replaced, even
/// if another process is writing the same names concurrently.
pub fn write_unique(folder: &Path, base: &str, data: &[u8]) -> Result<PathBuf, SaveError> {
    if !folder.is_dir() {
        return Err(SaveError::MissingFolder(folder.to_path_buf()));
    }

    let mut candidate = folder.join(format!("{}.mp3", base));
    let mut counter = 1u32;
    loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut file) => {
                file.write_all(data)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                candidate = folder.join(format!("{}_{}.mp3", base, counter));
                counter += 1;
            }
            Err(e) => return Err(SaveError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("a/b:c", 50), "a_b_c");
    }

    #[test]
    fn test_sanitize_replaces_every_forbidden_char() {
        assert_eq!(
            sanitize_filename(r#"a\b/c*d?e:f"g<h>i|j"#, 50),
            "a_b_c_d_e_f_g_h_i_j"
        );
    }

    #[test]
    fn test_sanitize_blank_text_falls_back() {
        assert_eq!(sanitize_filename("", 50), "audio");
        assert_eq!(sanitize_filename("   ", 50), "audio");
    }

    #[test]
    fn test_sanitize_caps_length_in_characters() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_filename(&long, 50).chars().count(), 50);

        // multi-byte characters count once each
        let accents = "é".repeat(60);
        assert_eq!(sanitize_filename(&accents, 50).chars().count(), 50);
    }

    #[test]
    fn test_sanitize_keeps_non_ascii() {
        assert_eq!(sanitize_filename("héllo wörld", 50), "héllo wörld");
    }

    proptest! {
        #[test]
        fn prop_sanitized_names_are_safe(input in ".*") {
            let name = sanitize_filename(&input, 50);
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().count() <= 50);
            prop_assert!(!FORBIDDEN.is_match(&name));
        }
    }

    #[test]
    fn test_write_unique_appends_counter_on_collision() {
        let dir = tempdir().unwrap();
        let first = write_unique(dir.path(), "hello", b"one").unwrap();
        let second = write_unique(dir.path(), "hello", b"two").unwrap();
        let third = write_unique(dir.path(), "hello", b"three").unwrap();

        assert_eq!(first.file_name().unwrap(), "hello.mp3");
        assert_eq!(second.file_name().unwrap(), "hello_1.mp3");
        assert_eq!(third.file_name().unwrap(), "hello_2.mp3");

        // nothing got clobbered along the way
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(std::fs::read(&third).unwrap(), b"three");
    }

    #[test]
    fn test_write_unique_rejects_missing_folder() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            write_unique(&missing, "hello", b"data"),
            Err(SaveError::MissingFolder(_))
        ));
    }
}
