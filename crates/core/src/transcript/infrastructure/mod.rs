pub mod command_diarizer;
pub mod command_recognizer;
mod json_source;
pub mod sidecar_diarizer;
pub mod sidecar_recognizer;
