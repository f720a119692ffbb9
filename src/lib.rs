//! Library side of voicepad: the generation workflow, the storage and
//! playback adapters, and the event queue the interactive shell drains.

pub mod backends;
pub mod config_loader;
pub mod controller;
pub mod error;
pub mod events;
pub mod player;
pub mod prefs;
pub mod save;
pub mod shell;
pub mod state;
pub mod temp_audio;
