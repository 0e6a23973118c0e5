/// Speaker label for segments no diarization turn overlaps.
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac"];

/// Credential for the diarization model, checked in this order.
pub const HF_TOKEN_VARS: &[&str] = &["HUGGINGFACE_TOKEN", "HF_TOKEN"];

pub const PHASE_TRANSCRIBE: &str = "transcribe";
pub const PHASE_DIARIZE: &str = "diarize";
pub const PHASE_ALIGN: &str = "align";

pub const DEFAULT_TRANSCRIBE_WEIGHT: f64 = 0.5;
pub const DEFAULT_DIARIZE_WEIGHT: f64 = 0.35;
pub const DEFAULT_ALIGN_WEIGHT: f64 = 0.15;
pub const DEFAULT_SIMPLE_TRANSCRIBE_WEIGHT: f64 = 0.85;

/// Allowed drift when checking that phase weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub const SEGMENTS_SIDECAR_SUFFIX: &str = "segments.json";
pub const TURNS_SIDECAR_SUFFIX: &str = "turns.json";

/// Placeholder replaced by the audio path in external command arguments.
pub const AUDIO_PLACEHOLDER: &str = "{audio}";
