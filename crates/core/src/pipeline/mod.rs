pub mod batch_executor;
pub mod infrastructure;
pub mod phase_plan;
pub mod progress_sink;
pub mod transcribe_batch_use_case;
