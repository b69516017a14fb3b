use crate::alignment::tokenization::{normalize_recognized, tokenize};
use crate::config::TimingConfig;
use crate::pipeline::traits::WordMatcher;
use crate::types::{NarrationUnit, TimedUnit, UnitTimingSource, WordTiming};

/// Comparisons against the previous unit's end tolerate this much float noise.
pub(crate) const TIME_TOLERANCE: f64 = 1e-9;

/// Alignment result for one unit, before the repair pass.
///
/// `anchors` holds, per word token of the unit, the recognizer timing it was
/// matched to (in recognizer time), and `anchor_span` the first..last matched
/// interval. Both are only populated for units timed from the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnitAlignment {
    pub timed: TimedUnit,
    pub anchors: Vec<Option<(f64, f64)>>,
    pub anchor_span: Option<(f64, f64)>,
}

/// Half-open range of timing indices where a unit's words are expected to be.
///
/// The window follows the unit's share of the script, plus a small slack at
/// the end. Large slack lets a later unit claim timestamps belonging to an
/// earlier one.
pub(crate) fn search_window(
    words_so_far: usize,
    word_count: usize,
    total_words: usize,
    timing_len: usize,
    slack: usize,
) -> (usize, usize) {
    if total_words == 0 || timing_len == 0 {
        return (0, 0);
    }
    let start = words_so_far * timing_len / total_words;
    let expected_end = ((words_so_far + word_count) * timing_len).div_ceil(total_words);
    let end = (expected_end + slack).min(timing_len);
    (start.min(end), end)
}

/// Greedy forward match of `tokens` inside `[window_start, window_end)`.
///
/// Returns `(token_index, timing_index)` pairs. The cursor moves past every
/// match, so no timing entry is used twice; a token with no match leaves the
/// cursor in place for the next token.
pub(crate) fn match_in_window<M: WordMatcher + ?Sized>(
    tokens: &[String],
    recognized: &[String],
    window_start: usize,
    window_end: usize,
    matcher: &M,
) -> Vec<(usize, usize)> {
    let mut matched = Vec::new();
    let mut cursor = window_start;
    for (token_idx, token) in tokens.iter().enumerate() {
        if cursor >= window_end {
            break;
        }
        let found = (cursor..window_end).find(|&j| matcher.matches(&recognized[j], token));
        if let Some(j) = found {
            matched.push((token_idx, j));
            cursor = j + 1;
        }
    }
    matched
}

/// Time every unit from recognizer word timings (steps 1-7 of the alignment).
///
/// Units whose match quality reaches the threshold take the span of their
/// first..last matched word, shifted (never truncated) past the previous unit.
/// Other units get a proportional span anchored at the previous unit's end.
/// The result still needs [`repair_timeline`](crate::alignment::repair::repair_timeline).
pub fn align_units<M: WordMatcher + ?Sized>(
    units: &[NarrationUnit],
    timings: &[WordTiming],
    total_duration: f64,
    config: &TimingConfig,
    matcher: &M,
) -> Vec<TimedUnit> {
    align_units_with_anchors(units, timings, total_duration, config, matcher)
        .into_iter()
        .map(|a| a.timed)
        .collect()
}

pub(crate) fn align_units_with_anchors<M: WordMatcher + ?Sized>(
    units: &[NarrationUnit],
    timings: &[WordTiming],
    total_duration: f64,
    config: &TimingConfig,
    matcher: &M,
) -> Vec<UnitAlignment> {
    let unit_tokens: Vec<Vec<String>> = units.iter().map(|u| tokenize(&u.text)).collect();
    let total_words: usize = unit_tokens.iter().map(Vec::len).sum();
    let recognized: Vec<String> = timings
        .iter()
        .map(|w| normalize_recognized(&w.word))
        .collect();

    let mut out: Vec<UnitAlignment> = Vec::with_capacity(units.len());
    let mut words_so_far = 0usize;

    for (unit, tokens) in units.iter().zip(&unit_tokens) {
        let word_count = tokens.len();
        let (window_start, window_end) = search_window(
            words_so_far,
            word_count,
            total_words,
            timings.len(),
            config.window_slack,
        );
        let matched = match_in_window(tokens, &recognized, window_start, window_end, matcher);
        words_so_far += word_count;

        let match_quality = if word_count == 0 {
            0.0
        } else {
            matched.len() as f64 / word_count as f64
        };
        let min_start = out
            .last()
            .map(|prev| prev.timed.end + config.epsilon)
            .unwrap_or(0.0);

        tracing::debug!(
            unit = unit.index,
            window_start,
            window_end,
            matched = matched.len(),
            word_count,
            match_quality = format!("{match_quality:.2}"),
            "alignment: unit matched"
        );

        let (first, last) = match (matched.first(), matched.last()) {
            (Some(&(_, first)), Some(&(_, last)))
                if match_quality >= config.match_quality_threshold =>
            {
                (&timings[first], &timings[last])
            }
            _ => {
                if word_count > 0 {
                    tracing::warn!(
                        unit = unit.index,
                        matched = matched.len(),
                        word_count,
                        match_quality = format!("{match_quality:.2}"),
                        "alignment: low match quality, using proportional span"
                    );
                }
                let share = if total_words == 0 {
                    0.0
                } else {
                    word_count as f64 / total_words as f64
                };
                let expected = share * total_duration;
                let start = min_start;
                let end = start + expected.max(config.min_unit_duration);
                out.push(UnitAlignment {
                    timed: TimedUnit {
                        unit: unit.clone(),
                        start,
                        end,
                        display_duration: end - start,
                        match_quality,
                        source: UnitTimingSource::ProportionalFallback,
                    },
                    anchors: vec![None; word_count],
                    anchor_span: None,
                });
                continue;
            }
        };

        let anchor_span = (first.start, last.end);
        let span = last.end - first.start;
        let mut start = first.start;
        if start + TIME_TOLERANCE < min_start {
            tracing::debug!(
                unit = unit.index,
                recognized_start = format!("{start:.3}"),
                shifted_start = format!("{min_start:.3}"),
                "alignment: shifting unit past previous end"
            );
            start = min_start;
        }
        let end = start + span;

        let mut anchors = vec![None; word_count];
        for &(token_idx, timing_idx) in &matched {
            let w = &timings[timing_idx];
            anchors[token_idx] = Some((w.start, w.end));
        }

        out.push(UnitAlignment {
            timed: TimedUnit {
                unit: unit.clone(),
                start,
                end,
                display_duration: end - start,
                match_quality,
                source: UnitTimingSource::Aligned,
            },
            anchors,
            anchor_span: Some(anchor_span),
        });
    }

    let last_idx = out.len().saturating_sub(1);
    for (i, a) in out.iter_mut().enumerate() {
        let pad = if i == last_idx { 0.0 } else { config.transition_pad };
        a.timed.display_duration = a.timed.span() + pad;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::defaults::{ExactWordMatcher, SubstringWordMatcher};

    fn words(entries: &[(&str, f64, f64)]) -> Vec<WordTiming> {
        entries
            .iter()
            .map(|&(w, s, e)| WordTiming::new(w, s, e))
            .collect()
    }

    fn units(texts: &[&str]) -> Vec<NarrationUnit> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| NarrationUnit::new(i, Some(i as u32 + 1), *t))
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn window_tracks_script_share_with_slack() {
        // 10 script words, 20 timing entries; unit covers words 5..8.
        assert_eq!(search_window(5, 3, 10, 20, 5), (10, 20));
        assert_eq!(search_window(5, 3, 10, 20, 2), (10, 18));
        assert_eq!(search_window(0, 2, 10, 20, 0), (0, 4));
        assert_eq!(search_window(0, 1, 3, 10, 0), (0, 4)); // ceil(10/3)
    }

    #[test]
    fn window_is_empty_without_timings() {
        assert_eq!(search_window(0, 3, 3, 0, 5), (0, 0));
    }

    #[test]
    fn greedy_match_never_reuses_an_entry() {
        let tokens = strings(&["go", "go", "go"]);
        let recognized = strings(&["go", "go"]);
        let matched = match_in_window(&tokens, &recognized, 0, 2, &ExactWordMatcher);
        assert_eq!(matched, [(0, 0), (1, 1)]);
    }

    #[test]
    fn unmatched_token_keeps_cursor() {
        let tokens = strings(&["alpha", "zzz", "beta"]);
        let recognized = strings(&["alpha", "beta"]);
        let matched = match_in_window(&tokens, &recognized, 0, 2, &ExactWordMatcher);
        assert_eq!(matched, [(0, 0), (2, 1)]);
    }

    #[test]
    fn matches_stay_inside_window() {
        let tokens = strings(&["late"]);
        let recognized = strings(&["early", "late"]);
        assert!(match_in_window(&tokens, &recognized, 0, 1, &ExactWordMatcher).is_empty());
    }

    #[test]
    fn perfect_match_uses_recognized_spans() {
        let units = units(&["Hello world.", "This is amazing."]);
        let timings = words(&[
            ("hello", 0.0, 0.4),
            ("world", 0.4, 0.9),
            ("this", 1.0, 1.2),
            ("is", 1.2, 1.3),
            ("amazing", 1.3, 2.0),
        ]);
        let timed = align_units(
            &units,
            &timings,
            2.0,
            &TimingConfig::default(),
            &SubstringWordMatcher,
        );
        assert_eq!(timed.len(), 2);
        assert_eq!(timed[0].start, 0.0);
        assert_eq!(timed[0].end, 0.9);
        assert!((timed[0].display_duration - 1.3).abs() < 1e-9);
        assert_eq!(timed[0].source, UnitTimingSource::Aligned);
        assert_eq!(timed[0].match_quality, 1.0);
        assert!((timed[1].start - 1.0).abs() < 1e-9);
        assert!((timed[1].end - 2.0).abs() < 1e-9);
        assert!((timed[1].display_duration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn low_quality_unit_falls_back_to_proportional_span_at_zero() {
        // Unit 0 has five words; only two of them are recognized (quality 0.4).
        let units = units(&["alpha beta gamma delta epsilon", "one two three four five"]);
        let timings = words(&[
            ("alpha", 3.0, 3.4),
            ("xxx", 3.4, 3.8),
            ("yyy", 3.8, 4.2),
            ("gamma", 4.2, 4.6),
            ("zzz", 4.6, 5.0),
            ("one", 5.2, 5.6),
            ("two", 5.6, 6.0),
            ("three", 6.0, 6.4),
            ("four", 6.4, 6.8),
            ("five", 6.8, 7.2),
        ]);
        let config = TimingConfig::default();
        let timed = align_units(&units, &timings, 20.0, &config, &ExactWordMatcher);
        assert!((timed[0].match_quality - 0.4).abs() < 1e-9);
        assert_eq!(timed[0].source, UnitTimingSource::ProportionalFallback);
        assert_eq!(timed[0].start, 0.0);
        assert!((timed[0].end - 10.0).abs() < 1e-9); // 5/10 of 20s
        // Unit 1 is recognized but must start after unit 0.
        assert_eq!(timed[1].source, UnitTimingSource::Aligned);
        assert!((timed[1].start - 10.1).abs() < 1e-9);
        assert!((timed[1].span() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn fallback_span_respects_minimum_duration() {
        let units = units(&["tiny", "the rest of the narration is much longer than that"]);
        let timed = align_units(
            &units,
            &words(&[("unrelated", 0.0, 1.0)]),
            5.0,
            &TimingConfig::default(),
            &ExactWordMatcher,
        );
        assert_eq!(timed[0].span(), 2.0);
        assert_eq!(timed[0].match_quality, 0.0);
    }

    #[test]
    fn overlapping_recognized_span_is_shifted_not_truncated() {
        let units = units(&["first part here", "second part there"]);
        let timings = words(&[
            ("first", 0.0, 1.0),
            ("part", 1.0, 2.0),
            ("here", 2.0, 3.0),
            ("second", 2.7, 3.5),
            ("part", 3.5, 4.5),
            ("there", 4.5, 5.2),
        ]);
        let timed = align_units(
            &units,
            &timings,
            10.0,
            &TimingConfig::default(),
            &ExactWordMatcher,
        );
        assert!((timed[1].start - 3.1).abs() < 1e-9);
        assert!((timed[1].span() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn anchors_record_matched_tokens() {
        let units = units(&["red green blue"]);
        let timings = words(&[("red", 0.0, 0.5), ("blue", 1.0, 1.5)]);
        let mut config = TimingConfig::default();
        config.match_quality_threshold = 0.5;
        let aligned =
            align_units_with_anchors(&units, &timings, 2.0, &config, &ExactWordMatcher);
        assert_eq!(aligned[0].anchors, [Some((0.0, 0.5)), None, Some((1.0, 1.5))]);
        assert_eq!(aligned[0].anchor_span, Some((0.0, 1.5)));
    }

    #[test]
    fn align_is_deterministic() {
        let units = units(&["Hello world.", "This is amazing."]);
        let timings = words(&[("hello", 0.0, 0.4), ("amazing", 1.3, 2.0)]);
        let config = TimingConfig::default();
        let a = align_units(&units, &timings, 4.0, &config, &SubstringWordMatcher);
        let b = align_units(&units, &timings, 4.0, &config, &SubstringWordMatcher);
        assert_eq!(a, b);
    }
}
