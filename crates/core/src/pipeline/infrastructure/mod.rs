pub mod audio_scanner;
pub mod threaded_batch_executor;
