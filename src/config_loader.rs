use config::{Config, File};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::sync::RwLock;

#[derive(Debug, Deserialize)]
pub struct Settings {
    // Synthesis parameters (fixed per install, not user-facing)
    pub api_base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    // Text length handling
    pub long_text_threshold: usize, // confirmation gate, in characters
    pub char_count_notice: usize,   // "long" hint level
    pub char_count_warning: usize,  // "very long" hint level
    // Saved file naming
    pub max_filename_len: usize, // characters kept from the text
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.elevenlabs.io".to_string(),
            voice_id: "pNInz6obpgDQGcFmaJgB".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            long_text_threshold: 10_000,
            char_count_notice: 2_500,
            char_count_warning: 5_000,
            max_filename_len: 50,
        }
    }
}

lazy_static! {
    pub static ref SETTINGS: RwLock<Settings> =
        RwLock::new(Settings::new().expect("Failed to load settings"));
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = Config::builder()
            // Connect to defaults
            .set_default("api_base_url", "https://api.elevenlabs.io")?
            .set_default("voice_id", "pNInz6obpgDQGcFmaJgB")?
            .set_default("model_id", "eleven_multilingual_v2")?
            .set_default("output_format", "mp3_44100_128")?
            .set_default("long_text_threshold", 10_000)?
            .set_default("char_count_notice", 2_500)?
            .set_default("char_count_warning", 5_000)?
            .set_default("max_filename_len", 50)?
            // Merge with local config file (if exists)
            .add_source(File::with_name("Voicepad").required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.config/voicepad/Voicepad",
                    std::env::var("HOME").unwrap_or_default()
                ))
                .required(false),
            )
            // Merge with environment variables (e.g. VOICEPAD_VOICE_ID)
            .add_source(config::Environment::with_prefix("VOICEPAD"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(config::ConfigError::Message(
                "api_base_url must not be empty".to_string(),
            ));
        }
        if self.voice_id.is_empty() {
            return Err(config::ConfigError::Message(
                "voice_id must not be empty".to_string(),
            ));
        }
        if self.long_text_threshold == 0 {
            return Err(config::ConfigError::Message(
                "long_text_threshold must be greater than 0".to_string(),
            ));
        }
        if self.max_filename_len == 0 {
            return Err(config::ConfigError::Message(
                "max_filename_len must be greater than 0".to_string(),
            ));
        }
        if self.char_count_notice > self.char_count_warning {
            return Err(config::ConfigError::Message(format!(
                "char_count_notice ({}) must not exceed char_count_warning ({})",
                self.char_count_notice, self.char_count_warning
            )));
        }
        Ok(())
    }
}
