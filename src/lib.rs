pub mod alignment;
pub mod captions;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod validation;

pub use alignment::report::{caption_structure, compute_timeline_report, TimelineReport};
pub use config::{CaptionConfig, ChunkingConfig, PunctuationPauses, TimingConfig};
pub use error::CaptionError;
pub use pipeline::builder::CaptionEngineBuilder;
pub use pipeline::runtime::CaptionEngine;
pub use pipeline::traits::{CaptionStrategy, StrategyInput, WordMatcher};
pub use types::{
    CaptionChunk, Captions, CascadeTier, NarrationUnit, Script, ScriptFormat, TimedUnit,
    UnitTimingSource, WordTiming,
};
