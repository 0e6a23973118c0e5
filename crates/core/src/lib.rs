pub mod alignment;
pub mod output;
pub mod pipeline;
pub mod shared;
pub mod transcript;
