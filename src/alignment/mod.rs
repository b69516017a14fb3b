pub mod matching;
pub mod proportional;
pub mod repair;
pub mod report;
pub mod segmenter;
pub mod tokenization;
