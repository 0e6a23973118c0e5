pub mod config_error;
pub mod constants;
pub mod settings;
pub mod timestamp;
