use crate::alignment::matching::align_units_with_anchors;
use crate::alignment::repair::repair_timeline;
use crate::captions::chunker::{chunk_timed, chunk_untimed, group_timed, sequence_chunks};
use crate::captions::pacing::punctuation_paced_timings;
use crate::captions::retime::retime_unit_words;
use crate::pipeline::traits::{CaptionStrategy, StrategyInput, WordMatcher};
use crate::types::{CaptionChunk, CascadeTier, UnitTimingSource};

/// Equal, or either word contained in the other.
pub struct SubstringWordMatcher;

impl WordMatcher for SubstringWordMatcher {
    fn matches(&self, recognized: &str, expected: &str) -> bool {
        if recognized.is_empty() || expected.is_empty() {
            return false;
        }
        recognized == expected || recognized.contains(expected) || expected.contains(recognized)
    }
}

pub struct ExactWordMatcher;

impl WordMatcher for ExactWordMatcher {
    fn matches(&self, recognized: &str, expected: &str) -> bool {
        !recognized.is_empty() && recognized == expected
    }
}

/// Tier 1: script words timed from recognizer output.
///
/// Declines when there is no recognizer output or when no unit reaches the
/// match quality threshold.
pub struct RecognizedTimingStrategy;

impl CaptionStrategy for RecognizedTimingStrategy {
    fn tier(&self) -> CascadeTier {
        CascadeTier::Recognized
    }

    fn produce(&self, input: &StrategyInput<'_>) -> Option<Vec<CaptionChunk>> {
        if input.word_timings.is_empty() {
            return None;
        }
        let timing = &input.config.timing;
        let aligned = align_units_with_anchors(
            &input.script.units,
            input.word_timings,
            input.audio_duration,
            timing,
            input.matcher,
        );
        if !aligned
            .iter()
            .any(|a| a.timed.source == UnitTimingSource::Aligned)
        {
            tracing::debug!(
                units = aligned.len(),
                "recognized tier: no unit matched the recognizer output"
            );
            return None;
        }

        let repaired = repair_timeline(
            aligned.iter().map(|a| a.timed.clone()).collect(),
            input.audio_duration,
            timing,
        );
        let grouped = aligned
            .iter()
            .zip(&repaired)
            .flat_map(|(alignment, unit)| {
                let words = retime_unit_words(alignment, unit);
                group_timed(&words, input.audio_duration, &input.config.chunking)
            })
            .collect();
        Some(sequence_chunks(grouped, input.audio_duration))
    }
}

/// Tier 2: constant speaking rate with fixed pauses after punctuation.
pub struct PunctuationPacedStrategy;

impl CaptionStrategy for PunctuationPacedStrategy {
    fn tier(&self) -> CascadeTier {
        CascadeTier::PunctuationPaced
    }

    fn produce(&self, input: &StrategyInput<'_>) -> Option<Vec<CaptionChunk>> {
        let words = punctuation_paced_timings(
            &input.script.clean_text,
            input.audio_duration,
            &input.config.pauses,
        )?;
        Some(chunk_timed(
            &words,
            input.audio_duration,
            &input.config.chunking,
        ))
    }
}

/// Tier 3: every word gets the same share of the audio.
pub struct UniformRateStrategy;

impl CaptionStrategy for UniformRateStrategy {
    fn tier(&self) -> CascadeTier {
        CascadeTier::UniformRate
    }

    fn produce(&self, input: &StrategyInput<'_>) -> Option<Vec<CaptionChunk>> {
        Some(chunk_untimed(
            &input.script.clean_text,
            input.audio_duration,
            &input.config.chunking,
        ))
    }
}

/// Recognized, then punctuation-paced, then uniform rate.
pub fn default_strategies() -> Vec<Box<dyn CaptionStrategy>> {
    vec![
        Box::new(RecognizedTimingStrategy),
        Box::new(PunctuationPacedStrategy),
        Box::new(UniformRateStrategy),
    ]
}
