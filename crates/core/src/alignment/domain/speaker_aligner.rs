use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tie_break::{FirstEncountered, TieBreak};
use crate::shared::constants::UNKNOWN_SPEAKER;
use crate::shared::timestamp::overlap;
use crate::transcript::domain::transcript::{AttributedSegment, Segment, Turn};

/// Granularity at which recognized text is matched to speaker turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// One output per segment, attributed to the turn with maximum overlap.
    #[default]
    Segment,
    /// One output per turn, holding the words that start inside it.
    Word,
}

#[derive(Error, Debug, PartialEq)]
pub enum AlignmentError {
    #[error("{stream} {index} has invalid interval [{start}, {end}]")]
    InvalidInterval {
        stream: &'static str,
        index: usize,
        start: f64,
        end: f64,
    },
}

/// Fuses an ASR segment stream with a diarization turn stream.
///
/// Stateless apart from its configuration, so one aligner can serve many
/// threads at once.
pub struct SpeakerAligner {
    mode: MatchMode,
    tie_break: Box<dyn TieBreak>,
}

impl SpeakerAligner {
    pub fn new(mode: MatchMode, tie_break: Box<dyn TieBreak>) -> Self {
        Self { mode, tie_break }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Attributes every segment to a speaker.
    ///
    /// In segment mode the output has the length and order of `segments`.
    /// In word mode it has one entry per turn, in turn order. An empty
    /// `turns` yields `UNKNOWN` for every segment in either mode.
    pub fn align(
        &self,
        segments: &[Segment],
        turns: &[Turn],
    ) -> Result<Vec<AttributedSegment>, AlignmentError> {
        validate_segments(segments, self.mode)?;
        validate_intervals("turn", turns.iter().map(|t| (t.start, t.end)))?;

        if turns.is_empty() || self.mode == MatchMode::Segment {
            return Ok(segments
                .iter()
                .map(|s| AttributedSegment {
                    start: s.start,
                    end: s.end,
                    speaker: self
                        .best_turn(s.start, s.end, turns)
                        .map_or_else(|| UNKNOWN_SPEAKER.to_string(), |t| t.speaker.clone()),
                    text: s.text.trim().to_string(),
                })
                .collect());
        }

        Ok(assign_words(segments, turns))
    }

    /// The turn overlapping `[start, end]` the most, or `None` when no turn
    /// overlaps it by a positive amount.
    ///
    /// Equal overlaps are settled by the configured [`TieBreak`], visiting
    /// turns in input order.
    pub fn best_turn<'t>(&self, start: f64, end: f64, turns: &'t [Turn]) -> Option<&'t Turn> {
        let mut best: Option<(&Turn, f64)> = None;
        for turn in turns {
            let amount = overlap(start, end, turn.start, turn.end);
            if amount <= 0.0 {
                continue;
            }
            best = match best {
                None => Some((turn, amount)),
                Some((incumbent, top)) => {
                    if amount > top || (amount == top && self.tie_break.prefer(turn, incumbent)) {
                        Some((turn, amount))
                    } else {
                        Some((incumbent, top))
                    }
                }
            };
        }
        best.map(|(turn, _)| turn)
    }
}

impl Default for SpeakerAligner {
    fn default() -> Self {
        Self::new(MatchMode::Segment, Box::new(FirstEncountered))
    }
}

/// Point-containment matching: a word belongs to every turn whose closed
/// interval contains the word's start. Segments without word timing act as
/// a single word.
fn assign_words(segments: &[Segment], turns: &[Turn]) -> Vec<AttributedSegment> {
    let words: Vec<(f64, &str)> = segments
        .iter()
        .flat_map(|s| {
            if s.words.is_empty() {
                vec![(s.start, s.text.as_str())]
            } else {
                s.words.iter().map(|w| (w.start, w.text.as_str())).collect()
            }
        })
        .collect();

    turns
        .iter()
        .map(|turn| {
            let text = words
                .iter()
                .filter(|(start, _)| turn.start <= *start && *start <= turn.end)
                .map(|(_, text)| text.trim())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            AttributedSegment {
                start: turn.start,
                end: turn.end,
                speaker: turn.speaker.clone(),
                text,
            }
        })
        .collect()
}

fn validate_segments(segments: &[Segment], mode: MatchMode) -> Result<(), AlignmentError> {
    validate_intervals("segment", segments.iter().map(|s| (s.start, s.end)))?;
    if mode == MatchMode::Word {
        validate_intervals(
            "word",
            segments.iter().flat_map(|s| s.words.iter().map(|w| (w.start, w.end))),
        )?;
    }
    Ok(())
}

fn validate_intervals(
    stream: &'static str,
    intervals: impl Iterator<Item = (f64, f64)>,
) -> Result<(), AlignmentError> {
    for (index, (start, end)) in intervals.enumerate() {
        let valid = start.is_finite() && end.is_finite() && start >= 0.0 && end >= start;
        if !valid {
            return Err(AlignmentError::InvalidInterval {
                stream,
                index,
                start,
                end,
            });
        }
    }
    Ok(())
}
