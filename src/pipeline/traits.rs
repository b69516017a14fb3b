use crate::config::CaptionConfig;
use crate::types::{CaptionChunk, CascadeTier, Script, WordTiming};

/// Decides whether a normalized recognizer word stands for a script token.
pub trait WordMatcher: Send + Sync {
    fn matches(&self, recognized: &str, expected: &str) -> bool;
}

/// Everything a cascade tier may look at. Inputs are already validated.
pub struct StrategyInput<'a> {
    pub script: &'a Script,
    pub audio_duration: f64,
    /// Empty when no recognizer output is available.
    pub word_timings: &'a [WordTiming],
    pub config: &'a CaptionConfig,
    pub matcher: &'a dyn WordMatcher,
}

/// One tier of the caption cascade.
///
/// Returning `None` (or no chunks) hands the input to the next tier.
pub trait CaptionStrategy: Send + Sync {
    fn tier(&self) -> CascadeTier;

    fn produce(&self, input: &StrategyInput<'_>) -> Option<Vec<CaptionChunk>>;
}
