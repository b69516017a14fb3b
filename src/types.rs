use serde::{Deserialize, Serialize};

use crate::alignment::tokenization::tokenize;

/// One ordered block of narration text to be timed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationUnit {
    /// 0-based position in narration order.
    pub index: usize,
    /// Value of the `[n]` scene marker this unit came from, `None` for unmarked prose.
    pub number: Option<u32>,
    /// Text as spoken, punctuation retained for display.
    pub text: String,
    pub word_count: usize,
}

impl NarrationUnit {
    pub fn new(index: usize, number: Option<u32>, text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = tokenize(&text).len();
        Self {
            index,
            number,
            text,
            word_count,
        }
    }
}

/// One recognized word from a speech recognizer, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// Recognizer confidence in [0, 1]. Informational only; alignment never reads it.
    #[serde(default, alias = "probability", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl WordTiming {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
            confidence: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTimingSource {
    Aligned,
    ProportionalFallback,
}

impl UnitTimingSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aligned => "aligned",
            Self::ProportionalFallback => "proportional_fallback",
        }
    }
}

/// A narration unit with its computed speech span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedUnit {
    #[serde(flatten)]
    pub unit: NarrationUnit,
    pub start: f64,
    pub end: f64,
    /// Speech span plus the transition pad for every unit except the last.
    pub display_duration: f64,
    /// Fraction of the unit's words located in the recognizer output; 0 for pure fallback.
    pub match_quality: f64,
    pub source: UnitTimingSource,
}

impl TimedUnit {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// A displayable subtitle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionChunk {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl CaptionChunk {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFormat {
    /// Text carried `[n]` scene markers.
    Scenes,
    /// Unmarked text treated as a single implicit unit.
    Prose,
}

/// Segmenter output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub format: ScriptFormat,
    pub units: Vec<NarrationUnit>,
    /// Unit texts joined with single spaces, marker syntax stripped.
    /// This is the text that must be handed to narration synthesis.
    pub clean_text: String,
}

impl Script {
    pub fn word_count(&self) -> usize {
        self.units.iter().map(|u| u.word_count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeTier {
    Recognized,
    PunctuationPaced,
    UniformRate,
}

impl CascadeTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recognized => "recognized",
            Self::PunctuationPaced => "punctuation_paced",
            Self::UniformRate => "uniform_rate",
        }
    }
}

/// Caption output together with the cascade tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Captions {
    pub tier: CascadeTier,
    pub chunks: Vec<CaptionChunk>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narration_unit_counts_tokens() {
        let unit = NarrationUnit::new(0, Some(3), "Hello, world! It's fine.");
        assert_eq!(unit.word_count, 4);
        assert_eq!(unit.number, Some(3));
    }

    #[test]
    fn word_timing_accepts_probability_alias() {
        let json = r#"{"word": " Hello", "start": 0.0, "end": 0.42, "probability": 0.93}"#;
        let word: WordTiming = serde_json::from_str(json).expect("valid word json");
        assert_eq!(word.word, " Hello");
        assert_eq!(word.confidence, Some(0.93));
        assert!((word.duration() - 0.42).abs() < 1e-12);
    }

    #[test]
    fn word_timing_confidence_is_optional() {
        let json = r#"{"word": "hi", "start": 1.0, "end": 1.5}"#;
        let word: WordTiming = serde_json::from_str(json).expect("valid word json");
        assert_eq!(word.confidence, None);
    }

    #[test]
    fn timed_unit_serializes_flat() {
        let timed = TimedUnit {
            unit: NarrationUnit::new(0, None, "hello there"),
            start: 0.0,
            end: 1.0,
            display_duration: 1.0,
            match_quality: 1.0,
            source: UnitTimingSource::Aligned,
        };
        let value = serde_json::to_value(&timed).expect("serialize");
        assert_eq!(value["word_count"], 2);
        assert_eq!(value["source"], "aligned");
    }
}
