use crate::alignment::matching::UnitAlignment;
use crate::alignment::tokenization::display_words;
use crate::types::{TimedUnit, WordTiming};

/// Time the display words of one unit inside its final (repaired) span.
///
/// Matched tokens keep their relative recognizer timing, mapped linearly from
/// the matched interval onto `[unit.start, unit.end]`. Tokens without a match
/// share the gap between their neighbouring anchors evenly. A display word
/// runs from its first token's start to its last token's end.
pub(crate) fn retime_unit_words(alignment: &UnitAlignment, unit: &TimedUnit) -> Vec<WordTiming> {
    let token_times = token_times(alignment, unit.start, unit.end);

    let mut cursor = 0usize;
    let mut words = Vec::new();
    for word in display_words(&unit.unit.text) {
        let first = token_times.get(cursor);
        cursor += word.tokens.len();
        let last = cursor.checked_sub(1).and_then(|i| token_times.get(i));
        if let (Some(&(start, _)), Some(&(_, end))) = (first, last) {
            words.push(WordTiming::new(word.text, start, end));
        }
    }
    words
}

fn token_times(alignment: &UnitAlignment, start: f64, end: f64) -> Vec<(f64, f64)> {
    let anchors = &alignment.anchors;
    let (origin, scale) = match alignment.anchor_span {
        Some((a0, a1)) if a1 > a0 => (a0, (end - start) / (a1 - a0)),
        _ => (0.0, 0.0),
    };
    let map = |t: f64| start + (t - origin) * scale;

    let mut times: Vec<(f64, f64)> = Vec::with_capacity(anchors.len());
    let mut i = 0;
    while i < anchors.len() {
        if let Some((s, e)) = anchors[i] {
            times.push((map(s), map(e)));
            i += 1;
            continue;
        }

        // Spread a run of unmatched tokens between its neighbours.
        let run_start = i;
        while i < anchors.len() && anchors[i].is_none() {
            i += 1;
        }
        let lower = times.last().map(|&(_, e)| e).unwrap_or(start);
        let upper = anchors
            .get(i)
            .and_then(|a| a.map(|(s, _)| map(s)))
            .unwrap_or(end)
            .max(lower);
        let step = (upper - lower) / (i - run_start) as f64;
        for k in 0..(i - run_start) {
            times.push((lower + step * k as f64, lower + step * (k + 1) as f64));
        }
    }

    // Recognizer ends may overlap the next word; keep token times monotone.
    let mut prev_end = start;
    for t in &mut times {
        t.0 = t.0.clamp(prev_end, end);
        t.1 = t.1.clamp(t.0, end);
        prev_end = t.1;
    }
    times
}
