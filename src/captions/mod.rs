pub mod chunker;
pub mod pacing;
pub(crate) mod retime;
