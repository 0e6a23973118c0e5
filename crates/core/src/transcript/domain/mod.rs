pub mod audio_source;
pub mod mode;
pub mod speaker_diarizer;
pub mod speech_recognizer;
pub mod transcript;
