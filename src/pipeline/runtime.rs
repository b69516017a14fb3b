use crate::alignment::matching::align_units;
use crate::alignment::proportional::estimate_units;
use crate::alignment::repair::repair_timeline;
use crate::alignment::segmenter::segment;
use crate::config::CaptionConfig;
use crate::error::CaptionError;
use crate::pipeline::traits::{CaptionStrategy, StrategyInput, WordMatcher};
use crate::types::{Captions, NarrationUnit, Script, TimedUnit, WordTiming};
use crate::validation::{validate_audio_duration, validate_word_timings};

/// Narration timing engine.
///
/// Holds no per-call state; a single engine can serve any number of
/// narrations, from any number of threads.
pub struct CaptionEngine {
    config: CaptionConfig,
    matcher: Box<dyn WordMatcher>,
    strategies: Vec<Box<dyn CaptionStrategy>>,
}

pub(crate) struct CaptionEngineParts {
    pub config: CaptionConfig,
    pub matcher: Box<dyn WordMatcher>,
    pub strategies: Vec<Box<dyn CaptionStrategy>>,
}

impl CaptionEngine {
    pub(crate) fn from_parts(parts: CaptionEngineParts) -> Self {
        Self {
            config: parts.config,
            matcher: parts.matcher,
            strategies: parts.strategies,
        }
    }

    pub fn config(&self) -> &CaptionConfig {
        &self.config
    }

    /// Split narration text into units. See [`segment`].
    pub fn segment(&self, text: &str) -> Result<Script, CaptionError> {
        segment(text)
    }

    /// Time units from recognizer output, then repair the timeline.
    pub fn align(
        &self,
        units: &[NarrationUnit],
        word_timings: &[WordTiming],
        audio_duration: f64,
    ) -> Result<Vec<TimedUnit>, CaptionError> {
        validate_audio_duration(audio_duration)?;
        validate_word_timings(word_timings)?;
        let timed = align_units(
            units,
            word_timings,
            audio_duration,
            &self.config.timing,
            self.matcher.as_ref(),
        );
        Ok(repair_timeline(timed, audio_duration, &self.config.timing))
    }

    /// Word-count-weighted timeline, used when there is no recognizer output.
    pub fn estimate(
        &self,
        units: &[NarrationUnit],
        audio_duration: f64,
    ) -> Result<Vec<TimedUnit>, CaptionError> {
        validate_audio_duration(audio_duration)?;
        Ok(estimate_units(units, audio_duration, &self.config.timing))
    }

    /// Per-unit timeline for the whole narration: aligned when recognizer
    /// output is present and non-empty, estimated otherwise.
    pub fn time_units(
        &self,
        text: &str,
        audio_duration: f64,
        word_timings: Option<&[WordTiming]>,
    ) -> Result<Vec<TimedUnit>, CaptionError> {
        let script = self.segment(text)?;
        match word_timings {
            Some(timings) if !timings.is_empty() => {
                self.align(&script.units, timings, audio_duration)
            }
            _ => self.estimate(&script.units, audio_duration),
        }
    }

    /// Caption chunks from the first cascade tier that produces any.
    pub fn produce_captions(
        &self,
        text: &str,
        audio_duration: f64,
        word_timings: Option<&[WordTiming]>,
    ) -> Result<Captions, CaptionError> {
        validate_audio_duration(audio_duration)?;
        let word_timings = word_timings.unwrap_or_default();
        validate_word_timings(word_timings)?;
        let script = self.segment(text)?;

        let input = StrategyInput {
            script: &script,
            audio_duration,
            word_timings,
            config: &self.config,
            matcher: self.matcher.as_ref(),
        };

        for strategy in &self.strategies {
            let tier = strategy.tier();
            match strategy.produce(&input) {
                Some(chunks) if !chunks.is_empty() => {
                    tracing::debug!(
                        tier = tier.as_str(),
                        chunks = chunks.len(),
                        units = script.units.len(),
                        "cascade: tier produced captions"
                    );
                    return Ok(Captions { tier, chunks });
                }
                _ => {
                    tracing::debug!(tier = tier.as_str(), "cascade: tier declined");
                }
            }
        }

        Err(CaptionError::runtime(
            "produce captions",
            format!("none of {} caption strategies produced output", self.strategies.len()),
        ))
    }
}
