use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config_loader;
use crate::controller::{CompletionOutcome, Controller, GenerationOutcome};
use crate::error::SynthesisError;
use crate::events::AppEvent;
use crate::state::Phase;

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Generate,
    Text(String),
    ShowText,
    Add(String),
    Key(String),
    ShowKey,
    Replay,
    Stop,
    Save,
    Folder(PathBuf),
    ShowFolder,
    Reset,
    Status,
    Help,
    Quit,
    Nop,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Nop;
        }
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };
        match word.to_lowercase().as_str() {
            "gen" | "generate" => Command::Generate,
            "text" => {
                if rest.is_empty() {
                    Command::ShowText
                } else {
                    Command::Text(rest.to_string())
                }
            }
            "add" => Command::Add(rest.to_string()),
            "key" => {
                if rest.is_empty() {
                    Command::ShowKey
                } else {
                    Command::Key(rest.to_string())
                }
            }
            "replay" | "play" => Command::Replay,
            "stop" => Command::Stop,
            "save" | "download" => Command::Save,
            "folder" => {
                if rest.is_empty() {
                    Command::ShowFolder
                } else {
                    Command::Folder(PathBuf::from(rest))
                }
            }
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Reads stdin line by line and posts each one onto the queue. The shell
/// never blocks on input itself, so worker verdicts interleave cleanly.
pub fn spawn_input_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

/// The interactive surface: one loop draining the event queue on the UI
/// thread. Owns the draft text and the API key the way a text box and an
/// entry field would.
pub struct Shell {
    controller: Controller,
    events: Receiver<AppEvent>,
    draft: String,
    api_key: String,
    awaiting_confirm: bool,
    char_count_notice: usize,
    char_count_warning: usize,
}

impl Shell {
    pub fn new(controller: Controller, events: Receiver<AppEvent>, api_key: String) -> Self {
        let char_count_notice = config_loader::SETTINGS
            .read()
            .map(|s| s.char_count_notice)
            .unwrap_or(2_500);
        let char_count_warning = config_loader::SETTINGS
            .read()
            .map(|s| s.char_count_warning)
            .unwrap_or(5_000);
        Self {
            controller,
            events,
            draft: String::new(),
            api_key,
            awaiting_confirm: false,
            char_count_notice,
            char_count_warning,
        }
    }

    pub fn run(mut self) {
        println!("voicepad ready. Type 'help' for commands.");
        if !self.api_key.is_empty() {
            println!("Loaded stored API key.");
        }

        loop {
            self.prompt();
            let event = match self.events.recv() {
                Ok(event) => event,
                Err(_) => break,
            };
            match event {
                AppEvent::Input(line) => {
                    if self.awaiting_confirm {
                        self.answer_confirm(&line);
                        continue;
                    }
                    if !self.dispatch(Command::parse(&line)) {
                        break;
                    }
                }
                AppEvent::InputClosed => break,
                AppEvent::SynthesisFinished {
                    text,
                    api_key,
                    result,
                } => self.on_finished(text, api_key, result),
            }
        }

        self.controller.shutdown();
        println!("Bye.");
    }

    fn prompt(&self) {
        let marker = if self.awaiting_confirm { "(y/n)" } else { ">" };
        print!("{} ", marker);
        let _ = io::stdout().flush();
    }

    /// Returns false when the loop should end.
    fn dispatch(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Quit => return false,
            Command::Nop => {}
            Command::Help => self.print_help(),
            Command::Status => self.print_status(),
            Command::Text(text) => {
                self.draft = text;
                self.report_draft();
            }
            Command::Add(line) => {
                if !self.draft.is_empty() {
                    self.draft.push('\n');
                }
                self.draft.push_str(&line);
                self.report_draft();
            }
            Command::ShowText => self.report_draft(),
            Command::Key(key) => {
                self.api_key = key;
                println!("API key set ({} chars).", self.api_key.chars().count());
            }
            Command::ShowKey => {
                if self.api_key.is_empty() {
                    println!("API key: not set");
                } else {
                    println!("API key: set ({} chars)", self.api_key.chars().count());
                }
            }
            Command::Generate => self.start_generation(false),
            Command::Replay => match self.controller.replay() {
                Ok(()) => println!("Replaying."),
                Err(e) => println!("Cannot replay: {}", e),
            },
            Command::Stop => {
                self.controller.stop_playback();
                println!("Playback stopped.");
            }
            Command::Save => match self.controller.download() {
                Ok(path) => println!("Saved to {}", path.display()),
                Err(e) => println!("Save failed: {}", e),
            },
            Command::Folder(path) => match self.controller.set_save_folder(&path) {
                Ok(()) => println!("Save folder: {}", path.display()),
                Err(e) => println!("Cannot use that folder: {}", e),
            },
            Command::ShowFolder => {
                println!("Save folder: {}", self.controller.save_folder().display())
            }
            Command::Reset => {
                self.controller.reset();
                self.draft.clear();
                println!("Reset.");
            }
            Command::Unknown(word) => println!("Unknown command '{}'. Try 'help'.", word),
        }
        true
    }

    fn start_generation(&mut self, confirmed: bool) {
        match self
            .controller
            .request_generation(&self.draft, &self.api_key, confirmed)
        {
            GenerationOutcome::Started => println!("Generating..."),
            GenerationOutcome::NeedsConfirmation { chars } => {
                println!(
                    "The text is {} characters long. Generation may be slow and expensive. Continue?",
                    chars
                );
                self.awaiting_confirm = true;
            }
            GenerationOutcome::Rejected(e) => println!("Cannot generate: {}", e),
            // A request during a running generation is dropped without fuss.
            GenerationOutcome::Ignored => {}
        }
    }

    fn answer_confirm(&mut self, line: &str) {
        self.awaiting_confirm = false;
        let answer = line.trim().to_lowercase();
        if answer == "y" || answer == "yes" {
            self.start_generation(true);
        } else {
            println!("Cancelled.");
        }
    }

    /// `api_key` comes from the worker's event, not from `self.api_key`,
    /// which may have been edited while the request was out.
    fn on_finished(
        &mut self,
        text: String,
        api_key: String,
        result: Result<Vec<u8>, SynthesisError>,
    ) {
        match self.controller.finish_generation(text, api_key, result) {
            CompletionOutcome::Playing => println!("Done. Playing audio."),
            CompletionOutcome::StoredWithoutPlayback(e) => {
                println!("Audio ready, but playback failed: {}", e)
            }
            CompletionOutcome::Failed(e) => println!("Generation failed: {}", e),
        }
    }

    fn report_draft(&self) {
        let chars = self.draft.chars().count();
        let hint = length_hint(chars, self.char_count_notice, self.char_count_warning);
        println!("Draft: {} characters{}", chars, hint);
    }

    fn print_status(&self) {
        let phase = match self.controller.phase() {
            Phase::Idle => "idle",
            Phase::Generating => "generating",
            Phase::Ready => "ready",
        };
        println!("Phase: {}", phase);
        println!(
            "Audio buffered: {}",
            if self.controller.has_audio() { "yes" } else { "no" }
        );
        println!(
            "Playing: {}",
            if self.controller.is_playing() { "yes" } else { "no" }
        );
        println!("Save folder: {}", self.controller.save_folder().display());
        self.report_draft();
        if self.api_key.is_empty() {
            println!("API key: not set");
        } else {
            println!("API key: set");
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  text <words>    set the draft text");
        println!("  add <words>     append a line to the draft");
        println!("  text            show the draft length");
        println!("  key <api-key>   set the API key for this session");
        println!("  gen             synthesize the draft and play it");
        println!("  replay          play the last audio again");
        println!("  stop            stop playback");
        println!("  save            write the last audio into the save folder");
        println!("  folder <path>   change the save folder");
        println!("  reset           drop the audio and the draft");
        println!("  status          show where things stand");
        println!("  quit            clean up and exit");
    }
}

/// Suffix for the draft report. Both thresholds are strict: a draft of
/// exactly the notice length carries no hint.
fn length_hint(chars: usize, notice: usize, warning: usize) -> &'static str {
    if chars > warning {
        " (very long)"
    } else if chars > notice {
        " (long)"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_words() {
        assert_eq!(Command::parse("gen"), Command::Generate);
        assert_eq!(Command::parse("  replay  "), Command::Replay);
        assert_eq!(Command::parse("QUIT"), Command::Quit);
        assert_eq!(Command::parse("?"), Command::Help);
    }

    #[test]
    fn test_parse_keeps_argument_spacing() {
        assert_eq!(
            Command::parse("text hello   world"),
            Command::Text("hello   world".to_string())
        );
    }

    #[test]
    fn test_parse_text_without_argument_shows_draft() {
        assert_eq!(Command::parse("text"), Command::ShowText);
        assert_eq!(Command::parse("key"), Command::ShowKey);
        assert_eq!(Command::parse("folder"), Command::ShowFolder);
    }

    #[test]
    fn test_parse_folder_takes_a_path() {
        assert_eq!(
            Command::parse("folder /tmp/out dir"),
            Command::Folder(PathBuf::from("/tmp/out dir"))
        );
    }

    #[test]
    fn test_parse_blank_and_unknown_lines() {
        assert_eq!(Command::parse(""), Command::Nop);
        assert_eq!(Command::parse("   "), Command::Nop);
        assert_eq!(
            Command::parse("frobnicate now"),
            Command::Unknown("frobnicate".to_string())
        );
    }

    #[test]
    fn test_length_hints_switch_above_the_thresholds() {
        assert_eq!(length_hint(0, 2_500, 5_000), "");
        assert_eq!(length_hint(2_500, 2_500, 5_000), "");
        assert_eq!(length_hint(2_501, 2_500, 5_000), " (long)");
        assert_eq!(length_hint(5_000, 2_500, 5_000), " (long)");
        assert_eq!(length_hint(5_001, 2_500, 5_000), " (very long)");
    }
}
