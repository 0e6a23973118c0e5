pub mod speaker_aligner;
pub mod tie_break;
