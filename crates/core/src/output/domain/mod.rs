pub mod artifact_store;
pub mod transcript_formatter;
