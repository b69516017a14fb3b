use crate::config::CaptionConfig;
use crate::error::CaptionError;
use crate::pipeline::defaults::{default_strategies, SubstringWordMatcher};
use crate::pipeline::runtime::{CaptionEngine, CaptionEngineParts};
use crate::pipeline::traits::{CaptionStrategy, WordMatcher};

pub struct CaptionEngineBuilder {
    config: CaptionConfig,
    matcher: Option<Box<dyn WordMatcher>>,
    strategies: Option<Vec<Box<dyn CaptionStrategy>>>,
}

impl CaptionEngineBuilder {
    pub fn new(config: CaptionConfig) -> Self {
        Self {
            config,
            matcher: None,
            strategies: None,
        }
    }

    pub fn with_word_matcher(mut self, matcher: Box<dyn WordMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Replace the cascade. Strategies are tried in order.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn CaptionStrategy>>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn build(self) -> Result<CaptionEngine, CaptionError> {
        self.config.validate()?;
        Ok(CaptionEngine::from_parts(CaptionEngineParts {
            config: self.config,
            matcher: self
                .matcher
                .unwrap_or_else(|| Box::new(SubstringWordMatcher)),
            strategies: self.strategies.unwrap_or_else(default_strategies),
        }))
    }
}
