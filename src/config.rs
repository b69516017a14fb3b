use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CaptionError;

/// Pacing constants for unit alignment, estimation and repair. All values in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum gap between the end of one unit and the start of the next.
    pub epsilon: f64,
    /// Extra display time for every unit except the last, covering the crossfade.
    pub transition_pad: f64,
    pub min_unit_duration: f64,
    pub max_unit_duration: f64,
    /// Units matched below this fraction fall back to a proportional span.
    pub match_quality_threshold: f64,
    /// Timing entries added past the expected end of a unit's search window.
    pub window_slack: usize,
}

impl TimingConfig {
    pub const DEFAULT_EPSILON: f64 = 0.1;
    pub const DEFAULT_TRANSITION_PAD: f64 = 0.4;
    pub const DEFAULT_MIN_UNIT_DURATION: f64 = 2.0;
    pub const DEFAULT_MAX_UNIT_DURATION: f64 = 12.0;
    pub const DEFAULT_MATCH_QUALITY_THRESHOLD: f64 = 0.7;
    pub const DEFAULT_WINDOW_SLACK: usize = 5;
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
            transition_pad: Self::DEFAULT_TRANSITION_PAD,
            min_unit_duration: Self::DEFAULT_MIN_UNIT_DURATION,
            max_unit_duration: Self::DEFAULT_MAX_UNIT_DURATION,
            match_quality_threshold: Self::DEFAULT_MATCH_QUALITY_THRESHOLD,
            window_slack: Self::DEFAULT_WINDOW_SLACK,
        }
    }
}

/// Caption sizing. Renderer profiles differ only in these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_words_per_chunk: usize,
    pub min_words_per_chunk: usize,
    /// A chunk closes once it spans this many seconds and holds `min_words_per_chunk`.
    pub target_chunk_duration: f64,
    /// Untimed text with more sentences than this is grouped by word count instead.
    pub max_sentence_groups: usize,
}

impl ChunkingConfig {
    pub const DEFAULT_MAX_SENTENCE_GROUPS: usize = 20;

    /// Compact captions for vertical short-form video.
    pub fn vertical() -> Self {
        Self {
            max_words_per_chunk: 4,
            min_words_per_chunk: 2,
            target_chunk_duration: 1.5,
            max_sentence_groups: Self::DEFAULT_MAX_SENTENCE_GROUPS,
        }
    }

    /// Wider lines for 16:9 video.
    pub fn widescreen() -> Self {
        Self {
            max_words_per_chunk: 8,
            min_words_per_chunk: 3,
            target_chunk_duration: 3.0,
            max_sentence_groups: Self::DEFAULT_MAX_SENTENCE_GROUPS,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::vertical()
    }
}

/// Pause inserted after a word ending in the given punctuation, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationPauses {
    pub period: f64,
    pub exclamation: f64,
    pub question: f64,
    pub comma: f64,
    pub semicolon: f64,
    pub colon: f64,
}

impl PunctuationPauses {
    /// Pause following `word`, judged by its last character before closing quotes/brackets.
    pub fn pause_after(&self, word: &str) -> f64 {
        let last = word
            .trim_end_matches(|c: char| CLOSING_CHARS.contains(&c))
            .chars()
            .next_back();
        match last {
            Some('.') | Some('…') => self.period,
            Some('!') => self.exclamation,
            Some('?') => self.question,
            Some(',') => self.comma,
            Some(';') => self.semicolon,
            Some(':') => self.colon,
            _ => 0.0,
        }
    }
}

pub(crate) const CLOSING_CHARS: &[char] = &['"', '\'', '”', '’', '»', ')', ']'];

impl Default for PunctuationPauses {
    fn default() -> Self {
        Self {
            period: 0.8,
            exclamation: 0.6,
            question: 0.6,
            comma: 0.4,
            semicolon: 0.5,
            colon: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub timing: TimingConfig,
    pub chunking: ChunkingConfig,
    pub pauses: PunctuationPauses,
}

impl CaptionConfig {
    pub fn with_chunking(chunking: ChunkingConfig) -> Self {
        Self {
            chunking,
            ..Self::default()
        }
    }

    /// Load a (possibly partial) configuration from a JSON file; missing fields keep defaults.
    pub fn load(path: &Path) -> Result<Self, CaptionError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CaptionError::io("read caption config", e))?;
        serde_json::from_str(&data).map_err(|e| CaptionError::json("parse caption config", e))
    }

    pub fn validate(&self) -> Result<(), CaptionError> {
        let t = &self.timing;
        require_non_negative("timing.epsilon", t.epsilon)?;
        require_non_negative("timing.transition_pad", t.transition_pad)?;
        require_positive("timing.min_unit_duration", t.min_unit_duration)?;
        require_positive("timing.max_unit_duration", t.max_unit_duration)?;
        if t.max_unit_duration < t.min_unit_duration {
            return Err(CaptionError::invalid_config(format!(
                "timing.max_unit_duration ({}) is below timing.min_unit_duration ({})",
                t.max_unit_duration, t.min_unit_duration
            )));
        }
        if !(0.0..=1.0).contains(&t.match_quality_threshold) {
            return Err(CaptionError::invalid_config(format!(
                "timing.match_quality_threshold must be within [0, 1], got {}",
                t.match_quality_threshold
            )));
        }

        let c = &self.chunking;
        if c.max_words_per_chunk == 0 {
            return Err(CaptionError::invalid_config(
                "chunking.max_words_per_chunk must be >= 1",
            ));
        }
        if c.min_words_per_chunk == 0 || c.min_words_per_chunk > c.max_words_per_chunk {
            return Err(CaptionError::invalid_config(format!(
                "chunking.min_words_per_chunk must be within [1, {}], got {}",
                c.max_words_per_chunk, c.min_words_per_chunk
            )));
        }
        require_positive("chunking.target_chunk_duration", c.target_chunk_duration)?;
        if c.max_sentence_groups == 0 {
            return Err(CaptionError::invalid_config(
                "chunking.max_sentence_groups must be >= 1",
            ));
        }

        let p = &self.pauses;
        for (name, value) in [
            ("pauses.period", p.period),
            ("pauses.exclamation", p.exclamation),
            ("pauses.question", p.question),
            ("pauses.comma", p.comma),
            ("pauses.semicolon", p.semicolon),
            ("pauses.colon", p.colon),
        ] {
            require_non_negative(name, value)?;
        }
        Ok(())
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), CaptionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CaptionError::invalid_config(format!(
            "{name} must be a finite value >= 0, got {value}"
        )))
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), CaptionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CaptionError::invalid_config(format!(
            "{name} must be a finite value > 0, got {value}"
        )))
    }
}
