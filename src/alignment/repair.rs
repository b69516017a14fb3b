use crate::alignment::matching::TIME_TOLERANCE;
use crate::config::TimingConfig;
use crate::types::TimedUnit;

/// Final sequential pass over a computed timeline.
///
/// Every unit starts at least `epsilon` after its predecessor ends; a moved
/// unit keeps its span (at least `min_unit_duration`). The timeline is then
/// fitted inside `total_duration` and display durations are recomputed.
pub fn repair_timeline(
    mut units: Vec<TimedUnit>,
    total_duration: f64,
    config: &TimingConfig,
) -> Vec<TimedUnit> {
    if let Some(first) = units.first_mut() {
        if first.start < 0.0 {
            let span = first.span();
            first.start = 0.0;
            first.end = span;
        }
    }

    for i in 1..units.len() {
        let min_start = units[i - 1].end + config.epsilon;
        if units[i].start + TIME_TOLERANCE < min_start {
            let span = units[i].span();
            tracing::debug!(
                unit = units[i].unit.index,
                start = format!("{:.3}", units[i].start),
                previous_end = format!("{:.3}", units[i - 1].end),
                "repair: moving unit after its predecessor"
            );
            units[i].start = min_start;
            units[i].end = min_start + span.max(config.min_unit_duration);
        }
    }

    fit_to_duration(&mut units, total_duration, config.epsilon);
    refresh_display_durations(&mut units, config.transition_pad);
    units
}

/// Compact an ordered timeline that runs past `total_duration`.
///
/// Leading silence and gap slack above `epsilon` are shrunk first, keeping
/// spans intact. When that is not enough, spans are scaled with `epsilon`
/// gaps; when even the gaps do not fit, everything is scaled.
pub(crate) fn fit_to_duration(units: &mut [TimedUnit], total_duration: f64, epsilon: f64) {
    let Some(last_end) = units.last().map(|u| u.end) else {
        return;
    };
    if last_end <= total_duration + TIME_TOLERANCE {
        if let Some(last) = units.last_mut() {
            last.end = last.end.min(total_duration);
        }
        return;
    }

    let n = units.len();
    let spans: Vec<f64> = units.iter().map(|u| u.span().max(0.0)).collect();
    let gaps: Vec<f64> = (1..n)
        .map(|i| (units[i].start - units[i - 1].end).max(epsilon))
        .collect();
    let lead = units[0].start.max(0.0);
    let span_total: f64 = spans.iter().sum();
    let min_gaps = epsilon * (n - 1) as f64;
    let tight_layout = span_total + min_gaps;

    tracing::debug!(
        overflow = format!("{:.3}", last_end - total_duration),
        units = n,
        "repair: timeline runs past the audio, compacting"
    );

    let (lead, gaps, span_scale) = if tight_layout <= total_duration {
        let slack: f64 = lead + gaps.iter().map(|g| g - epsilon).sum::<f64>();
        let factor = if slack > 0.0 {
            (total_duration - tight_layout) / slack
        } else {
            0.0
        };
        let gaps = gaps.iter().map(|g| epsilon + (g - epsilon) * factor).collect();
        (lead * factor, gaps, 1.0)
    } else if total_duration > min_gaps && span_total > 0.0 {
        let scale = (total_duration - min_gaps) / span_total;
        (0.0, vec![epsilon; n - 1], scale)
    } else {
        let scale = total_duration / tight_layout.max(f64::MIN_POSITIVE);
        (0.0, vec![epsilon * scale; n - 1], scale)
    };

    let mut cursor = lead;
    for (i, unit) in units.iter_mut().enumerate() {
        if i > 0 {
            cursor += gaps[i - 1];
        }
        unit.start = cursor;
        unit.end = cursor + spans[i] * span_scale;
        cursor = unit.end;
    }
    if let Some(last) = units.last_mut() {
        last.end = last.end.min(total_duration);
    }
}

pub(crate) fn refresh_display_durations(units: &mut [TimedUnit], transition_pad: f64) {
    let last_idx = units.len().saturating_sub(1);
    for (i, unit) in units.iter_mut().enumerate() {
        let pad = if i == last_idx { 0.0 } else { transition_pad };
        unit.display_duration = unit.span() + pad;
    }
}
