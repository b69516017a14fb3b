use crate::alignment::tokenization::display_words;
use crate::config::PunctuationPauses;
use crate::types::WordTiming;

/// Time every display word of `text` at a constant speaking rate, leaving a
/// fixed pause after punctuated words.
///
/// The pauses are subtracted from `total_duration` and the remaining speaking
/// time is shared evenly by word. No pause follows the final word, which ends
/// exactly at `total_duration`. Returns `None` when the text has no words or
/// the pauses leave no speaking time.
pub fn punctuation_paced_timings(
    text: &str,
    total_duration: f64,
    pauses: &PunctuationPauses,
) -> Option<Vec<WordTiming>> {
    let words = display_words(text);
    let (last, leading) = words.split_last()?;

    let pause_total: f64 = leading.iter().map(|w| pauses.pause_after(&w.text)).sum();
    let speaking_time = total_duration - pause_total;
    if speaking_time <= 0.0 {
        tracing::debug!(
            pause_total = format!("{pause_total:.3}"),
            total_duration = format!("{total_duration:.3}"),
            "pacing: pauses leave no speaking time"
        );
        return None;
    }
    let per_word = speaking_time / words.len() as f64;

    let mut timings = Vec::with_capacity(words.len());
    let mut cursor = 0.0_f64;
    for word in leading {
        let end = cursor + per_word;
        timings.push(WordTiming::new(word.text.clone(), cursor, end));
        cursor = end + pauses.pause_after(&word.text);
    }
    timings.push(WordTiming::new(last.text.clone(), cursor, total_duration));
    Some(timings)
}
