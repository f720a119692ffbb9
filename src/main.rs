use std::error::Error;
use std::sync::mpsc::channel;
use std::sync::Arc;

use tracing_subscriber::prelude::*;

use voicepad::backends::elevenlabs::ElevenLabsBackend;
use voicepad::backends::SynthesisBackend;
use voicepad::config_loader;
use voicepad::controller::Controller;
use voicepad::events::AppEvent;
use voicepad::player::RodioPlayer;
use voicepad::prefs::Prefs;
use voicepad::shell::{self, Shell};
use voicepad::temp_audio::TempAudioStore;

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    // Surface a broken config file before anything else starts.
    let settings = config_loader::Settings::new()?;
    tracing::debug!(
        "voice {} / model {} / format {}",
        settings.voice_id,
        settings.model_id,
        settings.output_format
    );

    let prefs = Prefs::open_default();
    let stored_key = prefs.load_api_key();

    let temp_store = TempAudioStore::open_default();
    // Sweep whatever an earlier run left behind.
    temp_store.purge_all();

    let player = RodioPlayer::new()?;
    let backend = Arc::new(ElevenLabsBackend::new());
    tracing::debug!("synthesis backend: {}", backend.id());

    let (tx, rx) = channel::<AppEvent>();
    let controller = Controller::new(backend, Box::new(player), temp_store, prefs, tx.clone());

    shell::spawn_input_reader(tx);
    Shell::new(controller, rx, stored_key).run();

    Ok(())
}

fn init_logging() {
    // Diagnostics go to stderr so they never tangle with the prompt.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
