use crate::error::CaptionError;
use crate::types::WordTiming;

pub fn validate_audio_duration(audio_duration: f64) -> Result<(), CaptionError> {
    if !audio_duration.is_finite() || audio_duration <= 0.0 {
        return Err(CaptionError::invalid_input(format!(
            "audio duration must be a positive number of seconds, got {audio_duration}"
        )));
    }
    Ok(())
}

/// Reject malformed recognizer output.
///
/// Every entry needs finite times with `0 <= start < end`, and starts must
/// not decrease. Words that match nothing in the narration are fine.
pub fn validate_word_timings(timings: &[WordTiming]) -> Result<(), CaptionError> {
    let mut prev_start = 0.0_f64;
    for (i, w) in timings.iter().enumerate() {
        if !w.start.is_finite() || !w.end.is_finite() {
            return Err(CaptionError::invalid_input(format!(
                "word timing {i} ({:?}) has a non-finite time",
                w.word
            )));
        }
        if w.start < 0.0 {
            return Err(CaptionError::invalid_input(format!(
                "word timing {i} ({:?}) starts before zero: {}",
                w.word, w.start
            )));
        }
        if w.start >= w.end {
            return Err(CaptionError::invalid_input(format!(
                "word timing {i} ({:?}) has start {} >= end {}",
                w.word, w.start, w.end
            )));
        }
        if w.start < prev_start {
            return Err(CaptionError::invalid_input(format!(
                "word timing {i} ({:?}) starts at {} before previous start {prev_start}",
                w.word, w.start
            )));
        }
        prev_start = w.start;
    }
    Ok(())
}
