use crate::error::SynthesisError;

/// Everything that can land on the UI queue. Events are handled strictly in
/// arrival order, on the one thread that owns application state.
#[derive(Debug)]
pub enum AppEvent {
    /// One line of user input, posted by the stdin reader thread.
    Input(String),
    /// The input stream ended (EOF).
    InputClosed,
    /// The worker's verdict for the text it was handed. Posting this is the
    /// only thing a worker ever does with shared machinery.
    SynthesisFinished {
        text: String,
        /// The key the call was actually made with. Persistence uses this
        /// echo, not whatever the entry field holds by completion time.
        api_key: String,
        result: Result<Vec<u8>, SynthesisError>,
    },
}
