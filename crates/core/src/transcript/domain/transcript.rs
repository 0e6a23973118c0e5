use serde::{Deserialize, Serialize};

/// A word with its own timing, nested inside a [`Segment`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A timestamped unit of recognized text from the speech recognizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<Word>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A diarizer's claim that `speaker` was talking during `[start, end]`.
///
/// Turns may overlap one another and arrive in any order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

impl Turn {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Output unit of alignment: text plus the speaker judged responsible for it.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributedSegment {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
    pub text: String,
}
