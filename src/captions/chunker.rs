use crate::alignment::tokenization::{display_words, split_sentences, DisplayWord};
use crate::config::ChunkingConfig;
use crate::types::{CaptionChunk, TimedUnit, WordTiming};

/// Group timed words into caption chunks.
///
/// A chunk closes when it holds `max_words_per_chunk` words, when it spans
/// `target_chunk_duration` with at least `min_words_per_chunk` words, or at
/// the end of the input. Chunks are clamped to `[0, total_duration]` and then
/// sequenced so none overlaps its predecessor.
pub fn chunk_timed(
    words: &[WordTiming],
    total_duration: f64,
    config: &ChunkingConfig,
) -> Vec<CaptionChunk> {
    sequence_chunks(group_timed(words, total_duration, config), total_duration)
}

/// Same grouping as [`chunk_timed`] without the sequencing pass.
pub(crate) fn group_timed(
    words: &[WordTiming],
    total_duration: f64,
    config: &ChunkingConfig,
) -> Vec<CaptionChunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&WordTiming> = Vec::with_capacity(config.max_words_per_chunk);
    for (i, word) in words.iter().enumerate() {
        current.push(word);
        let span = word.end - current[0].start;
        let is_last = i + 1 == words.len();
        if current.len() >= config.max_words_per_chunk
            || (span >= config.target_chunk_duration
                && current.len() >= config.min_words_per_chunk)
            || is_last
        {
            chunks.push(emit(&current, total_duration));
            current.clear();
        }
    }
    chunks
}

fn emit(words: &[&WordTiming], total_duration: f64) -> CaptionChunk {
    let text = words
        .iter()
        .map(|w| w.word.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let start = words.first().map(|w| w.start).unwrap_or(0.0);
    let end = words.last().map(|w| w.end).unwrap_or(0.0);
    CaptionChunk {
        text,
        start: start.clamp(0.0, total_duration),
        end: end.clamp(0.0, total_duration),
    }
}

/// Enforce strict ordering on a chunk track.
///
/// A chunk starting inside its predecessor is started at the predecessor's
/// end. A chunk left without duration is merged into its predecessor (or,
/// for the first chunk, into its successor) so no text is lost.
pub(crate) fn sequence_chunks(chunks: Vec<CaptionChunk>, total_duration: f64) -> Vec<CaptionChunk> {
    let mut out: Vec<CaptionChunk> = Vec::with_capacity(chunks.len());
    let mut carried: Option<CaptionChunk> = None;

    for mut chunk in chunks {
        if let Some(head) = carried.take() {
            chunk.text = format!("{} {}", head.text, chunk.text);
            chunk.start = chunk.start.min(head.start);
        }
        if let Some(prev) = out.last_mut() {
            if chunk.start < prev.end {
                chunk.start = prev.end;
            }
            if chunk.end <= chunk.start {
                tracing::debug!(
                    text = chunk.text.as_str(),
                    "chunker: merging zero-length chunk into predecessor"
                );
                prev.text.push(' ');
                prev.text.push_str(&chunk.text);
                prev.end = prev.end.max(chunk.end);
                continue;
            }
        } else if chunk.end <= chunk.start {
            carried = Some(chunk);
            continue;
        }
        out.push(chunk);
    }

    if let Some(rest) = carried {
        // Every chunk collapsed: show the whole text for the whole audio.
        out.push(CaptionChunk {
            text: rest.text,
            start: 0.0,
            end: total_duration,
        });
    }
    out
}

/// Split untimed text into chunks and spread `total_duration` over them by word count.
///
/// Text with 1..=`max_sentence_groups` sentences is split per sentence (long
/// sentences in `max_words_per_chunk` pieces); otherwise words are grouped in
/// fixed `max_words_per_chunk` pieces. Chunks are contiguous and the last one
/// ends exactly at `total_duration`.
pub fn chunk_untimed(text: &str, total_duration: f64, config: &ChunkingConfig) -> Vec<CaptionChunk> {
    let words = display_words(text);
    let total_words = words.len();
    if total_words == 0 {
        return Vec::new();
    }

    let sentences = split_sentences(words);
    let groups: Vec<Vec<DisplayWord>> = if sentences.len() <= config.max_sentence_groups {
        sentences
            .into_iter()
            .flat_map(|s| split_fixed(s, config.max_words_per_chunk))
            .collect()
    } else {
        split_fixed(
            sentences.into_iter().flatten().collect(),
            config.max_words_per_chunk,
        )
    };

    spread_groups(groups, 0.0, total_duration, total_words)
}

/// Regroup timed units into chunks of at most `max_words_per_chunk` display
/// words, each spread over its unit's span by word count.
pub fn chunk_units(units: &[TimedUnit], config: &ChunkingConfig) -> Vec<CaptionChunk> {
    units
        .iter()
        .flat_map(|unit| {
            let words = display_words(&unit.unit.text);
            let count = words.len();
            spread_groups(
                split_fixed(words, config.max_words_per_chunk),
                unit.start,
                unit.end,
                count,
            )
        })
        .collect()
}

fn split_fixed(words: Vec<DisplayWord>, size: usize) -> Vec<Vec<DisplayWord>> {
    let size = size.max(1);
    let mut groups = Vec::with_capacity(words.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);
    for word in words {
        current.push(word);
        if current.len() == size {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn spread_groups(
    groups: Vec<Vec<DisplayWord>>,
    start: f64,
    end: f64,
    total_words: usize,
) -> Vec<CaptionChunk> {
    if total_words == 0 || end <= start {
        return Vec::new();
    }
    let per_word = (end - start) / total_words as f64;
    let last_idx = groups.len().saturating_sub(1);
    let mut cursor = start;
    let mut words_done = 0usize;
    let mut chunks = Vec::with_capacity(groups.len());
    for (i, group) in groups.into_iter().enumerate() {
        words_done += group.len();
        let chunk_end = if i == last_idx {
            end
        } else {
            start + per_word * words_done as f64
        };
        chunks.push(CaptionChunk {
            text: group
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            start: cursor,
            end: chunk_end,
        });
        cursor = chunk_end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::tokenization::tokenize;
    use crate::types::{NarrationUnit, UnitTimingSource};

    fn evenly_timed(text: &str, total: f64) -> Vec<WordTiming> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = total / words.len() as f64;
        words
            .iter()
            .enumerate()
            .map(|(i, w)| WordTiming::new(*w, i as f64 * step, (i + 1) as f64 * step))
            .collect()
    }

    fn texts(chunks: &[CaptionChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    fn config(max: usize, min: usize, target: f64) -> ChunkingConfig {
        ChunkingConfig {
            max_words_per_chunk: max,
            min_words_per_chunk: min,
            target_chunk_duration: target,
            max_sentence_groups: ChunkingConfig::DEFAULT_MAX_SENTENCE_GROUPS,
        }
    }

    #[test]
    fn ten_even_words_make_four_four_two() {
        let words = evenly_timed("w1 w2 w3 w4 w5 w6 w7 w8 w9 w10", 5.0);
        let chunks = chunk_timed(&words, 5.0, &config(4, 2, 3.0));
        let counts: Vec<usize> = chunks.iter().map(CaptionChunk::word_count).collect();
        assert_eq!(counts, [4, 4, 2]);
        assert_eq!(chunks[0].start, 0.0);
        assert_eq!(chunks[2].end, 5.0);
        for pair in chunks.windows(2) {
            assert!(pair[1].start >= pair[0].end);
        }
    }

    #[test]
    fn target_duration_closes_chunk_early() {
        let words = evenly_timed("a b c d e f", 6.0);
        let chunks = chunk_timed(&words, 6.0, &config(5, 2, 1.5));
        assert_eq!(texts(&chunks), ["a b", "c d", "e f"]);
    }

    #[test]
    fn min_words_holds_chunk_open_past_target() {
        let words = vec![
            WordTiming::new("slow", 0.0, 3.0),
            WordTiming::new("word", 3.0, 3.5),
            WordTiming::new("next", 3.5, 4.0),
        ];
        let chunks = chunk_timed(&words, 4.0, &config(4, 2, 1.0));
        assert_eq!(texts(&chunks), ["slow word", "next"]);
    }

    #[test]
    fn chunks_are_clamped_to_audio() {
        let words = vec![
            WordTiming::new("late", 4.5, 5.5),
            WordTiming::new("later", 5.5, 6.5),
        ];
        let chunks = chunk_timed(&words, 5.0, &config(1, 1, 1.0));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "late later");
        assert_eq!(chunks[0].start, 4.5);
        assert_eq!(chunks[0].end, 5.0);
    }

    #[test]
    fn overlapping_words_are_sequenced() {
        let words = vec![
            WordTiming::new("one", 0.0, 1.2),
            WordTiming::new("two", 1.0, 2.0),
        ];
        let chunks = chunk_timed(&words, 2.0, &config(1, 1, 1.0));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].start, 1.2);
        assert_eq!(chunks[1].end, 2.0);
    }

    #[test]
    fn zero_length_first_chunk_is_carried_forward() {
        let chunks = sequence_chunks(
            vec![
                CaptionChunk { text: "a".into(), start: 0.0, end: 0.0 },
                CaptionChunk { text: "b".into(), start: 0.0, end: 1.0 },
            ],
            1.0,
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a b");
        assert_eq!(chunks[0].start, 0.0);
    }

    #[test]
    fn fully_collapsed_track_spans_audio() {
        let chunks = sequence_chunks(
            vec![CaptionChunk { text: "gone".into(), start: 3.0, end: 3.0 }],
            3.0,
        );
        assert_eq!(chunks, [CaptionChunk { text: "gone".into(), start: 0.0, end: 3.0 }]);
    }

    #[test]
    fn empty_input_gives_no_chunks() {
        assert!(chunk_timed(&[], 5.0, &config(4, 2, 1.5)).is_empty());
        assert!(chunk_untimed("  ", 5.0, &config(4, 2, 1.5)).is_empty());
    }

    #[test]
    fn untimed_splits_by_sentence() {
        let chunks = chunk_untimed("Hello world. This is amazing.", 10.0, &config(4, 2, 1.5));
        assert_eq!(texts(&chunks), ["Hello world.", "This is amazing."]);
        assert_eq!(chunks[0].start, 0.0);
        assert!((chunks[0].end - 4.0).abs() < 1e-9);
        assert_eq!(chunks[1].start, chunks[0].end);
        assert_eq!(chunks[1].end, 10.0);
    }

    #[test]
    fn untimed_long_sentence_is_split_by_max_words() {
        let chunks = chunk_untimed("one two three four five six seven.", 7.0, &config(3, 1, 1.5));
        assert_eq!(texts(&chunks), ["one two three", "four five six", "seven."]);
        assert!((chunks[1].end - 6.0).abs() < 1e-9);
    }

    #[test]
    fn untimed_many_sentences_fall_back_to_word_groups() {
        let text = "A. B. C. D. E. F.";
        let mut cfg = config(4, 1, 1.5);
        cfg.max_sentence_groups = 3;
        let chunks = chunk_untimed(text, 6.0, &cfg);
        assert_eq!(texts(&chunks), ["A. B. C. D.", "E. F."]);
    }

    #[test]
    fn untimed_text_fidelity() {
        let text = "Well -- it's a long, winding road; isn't it? Yes! Quite so.";
        let chunks = chunk_untimed(text, 12.0, &config(3, 1, 1.5));
        let joined = texts(&chunks).join(" ");
        assert_eq!(tokenize(&joined), tokenize(text));
    }

    #[test]
    fn units_are_chunked_within_their_spans() {
        let units = vec![
            TimedUnit {
                unit: NarrationUnit::new(0, Some(1), "one two three four five"),
                start: 0.0,
                end: 5.0,
                display_duration: 5.4,
                match_quality: 0.0,
                source: UnitTimingSource::ProportionalFallback,
            },
            TimedUnit {
                unit: NarrationUnit::new(1, Some(2), "six seven"),
                start: 5.4,
                end: 8.0,
                display_duration: 2.6,
                match_quality: 0.0,
                source: UnitTimingSource::ProportionalFallback,
            },
        ];
        let chunks = chunk_units(&units, &config(3, 1, 1.5));
        assert_eq!(texts(&chunks), ["one two three", "four five", "six seven"]);
        assert!((chunks[0].end - 3.0).abs() < 1e-9);
        assert_eq!(chunks[1].end, 5.0);
        assert_eq!(chunks[2].start, 5.4);
        assert_eq!(chunks[2].end, 8.0);
    }
}
