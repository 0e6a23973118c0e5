use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::UNKNOWN_SPEAKER;
use crate::shared::timestamp::{format_timestamp, parse_timestamp};
use crate::transcript::domain::mode::Mode;
use crate::transcript::domain::transcript::AttributedSegment;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid transcript JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record {index} has unparseable timestamp '{value}'")]
    Timestamp { index: usize, value: String },
}

/// One entry of the persisted transcript artifact.
///
/// `speaker` is omitted entirely in [`Mode::Simple`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub text: String,
}

pub struct TranscriptFormatter;

impl TranscriptFormatter {
    pub fn to_records(segments: &[AttributedSegment], mode: Mode) -> Vec<TranscriptRecord> {
        segments
            .iter()
            .map(|s| TranscriptRecord {
                start: format_timestamp(s.start),
                end: format_timestamp(s.end),
                speaker: mode.requires_diarization().then(|| s.speaker.clone()),
                text: s.text.clone(),
            })
            .collect()
    }

    /// Structured form: a pretty-printed JSON array of records.
    pub fn to_json(segments: &[AttributedSegment], mode: Mode) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(&Self::to_records(
            segments, mode,
        ))?)
    }

    /// Line-oriented form: `[start - end] Speaker <label>: <text>` per segment.
    ///
    /// Simple mode drops the speaker part: `[start - end] <text>`.
    pub fn to_lines(segments: &[AttributedSegment], mode: Mode) -> String {
        let mut out = String::new();
        for record in Self::to_records(segments, mode) {
            let stamp = format!("[{} - {}]", record.start, record.end);
            let line = match record.speaker {
                Some(speaker) => format!("{stamp} Speaker {speaker}: {}\n", record.text),
                None => format!("{stamp} {}\n", record.text),
            };
            out.push_str(&line);
        }
        out
    }

    pub fn read_records(json: &str) -> Result<Vec<TranscriptRecord>, FormatError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads records back into segments. A missing speaker becomes `UNKNOWN`.
    pub fn records_to_segments(
        records: &[TranscriptRecord],
    ) -> Result<Vec<AttributedSegment>, FormatError> {
        records
            .iter()
            .enumerate()
            .map(|(index, r)| {
                let parse = |value: &str| {
                    parse_timestamp(value).ok_or_else(|| FormatError::Timestamp {
                        index,
                        value: value.to_string(),
                    })
                };
                Ok(AttributedSegment {
                    start: parse(&r.start)?,
                    end: parse(&r.end)?,
                    speaker: r
                        .speaker
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
                    text: r.text.clone(),
                })
            })
            .collect()
    }
}
