use crate::alignment::repair::{fit_to_duration, refresh_display_durations};
use crate::config::TimingConfig;
use crate::types::{NarrationUnit, TimedUnit, UnitTimingSource};

/// Word-count-weighted timeline used when no recognizer timing is available.
///
/// `(n - 1)` transition pads are reserved up front, the rest is shared by
/// word count and clamped to `[min_unit_duration, max_unit_duration]`, and
/// the last unit absorbs whatever remains so the timeline ends exactly at
/// `total_duration`.
pub fn estimate_units(
    units: &[NarrationUnit],
    total_duration: f64,
    config: &TimingConfig,
) -> Vec<TimedUnit> {
    if units.is_empty() {
        return Vec::new();
    }

    let n = units.len();
    let gap = config.transition_pad.max(config.epsilon);
    let available = (total_duration - gap * (n - 1) as f64).max(0.0);
    let total_words: usize = units.iter().map(|u| u.word_count).sum();

    let mut timed = Vec::with_capacity(n);
    let mut cursor = 0.0_f64;
    for (i, unit) in units.iter().enumerate() {
        let start = cursor;
        let end = if i == n - 1 {
            (start + config.min_unit_duration).max(total_duration)
        } else {
            let share = if total_words == 0 {
                1.0 / n as f64
            } else {
                unit.word_count as f64 / total_words as f64
            };
            // Leave room for at least a minimum-length final unit.
            let room = total_duration - start - gap - config.min_unit_duration;
            let span = (share * available)
                .min(config.max_unit_duration)
                .min(room)
                .max(config.min_unit_duration);
            start + span
        };

        tracing::debug!(
            unit = unit.index,
            word_count = unit.word_count,
            start = format!("{start:.3}"),
            end = format!("{end:.3}"),
            "estimate: proportional span"
        );

        timed.push(TimedUnit {
            unit: unit.clone(),
            start,
            end,
            display_duration: end - start,
            match_quality: 0.0,
            source: UnitTimingSource::ProportionalFallback,
        });
        cursor = end + gap;
    }

    fit_to_duration(&mut timed, total_duration, config.epsilon);
    refresh_display_durations(&mut timed, config.transition_pad);
    timed
}
