use std::time::Instant;

use tempfile::tempdir;
use voicepad::save;
use voicepad::temp_audio::TempAudioStore;

#[test]
fn test_save_collision_flooding() {
    let dir = tempdir().unwrap();

    println!("Starting save collision flooding test (500 files)...");

    let start = Instant::now();
    for i in 0..500 {
        let path = save::write_unique(dir.path(), "stress", b"payload")
            .expect("Failed to save during flood");

        let expected = if i == 0 {
            "stress.mp3".to_string()
        } else {
            format!("stress_{}.mp3", i)
        };
        assert_eq!(path.file_name().unwrap().to_string_lossy(), expected);

        if i % 100 == 0 {
            println!("Saved {} files...", i);
        }
    }
    let duration = start.elapsed();

    println!("Flood complete in {:?}. Checking the directory...", duration);
    let count = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(count, 500);

    // The collision scan is linear per save, so this is the worst case.
    assert!(
        duration.as_millis() < 30_000,
        "Collision scan took too long (>30s for 500 files)"
    );
}

#[test]
fn test_temp_store_flooding() {
    let dir = tempdir().unwrap();
    let store = TempAudioStore::at(dir.path().join("audio"));

    println!("Starting temp store flooding test (500 staged files)...");
    for i in 0..500 {
        let path = store
            .create_unique_path()
            .expect("Failed to allocate during flood");
        std::fs::write(&path, b"staged").expect("Failed to stage during flood");
        if i % 100 == 0 {
            println!("Staged {} files...", i);
        }
    }

    let start = Instant::now();
    store.purge_all();
    let duration = start.elapsed();
    println!("Purge complete in {:?}", duration);

    // Every staged file matched the prefix, so the directory itself goes too.
    assert!(!dir.path().join("audio").exists());
    assert!(
        duration.as_millis() < 5_000,
        "Purge took too long (>5000ms for 500 files)"
    );
}
