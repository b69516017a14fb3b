use serde::Serialize;

use crate::types::{CaptionChunk, TimedUnit, UnitTimingSource};

const EPS_DURATION_SEC: f64 = 0.001;
const FULL_QUALITY_THRESHOLD: f64 = 0.8;
const PARTIAL_QUALITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub audio_duration: f64,
    pub unit_count: usize,
    pub aligned_unit_count: usize,
    pub fallback_unit_count: usize,
    pub mean_match_quality: f64,
    /// Sum of display durations over the audio duration.
    pub display_coverage: f64,
    pub structural: StructuralMetrics,
    pub units: Vec<UnitReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    Full,
    Partial,
    Fallback,
}

impl QualityBand {
    pub fn from_match_quality(quality: f64) -> Self {
        if quality >= FULL_QUALITY_THRESHOLD {
            Self::Full
        } else if quality >= PARTIAL_QUALITY_THRESHOLD {
            Self::Partial
        } else {
            Self::Fallback
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub word_count: usize,
    pub start: f64,
    pub end: f64,
    pub display_duration: f64,
    pub match_quality: f64,
    pub band: QualityBand,
    pub source: UnitTimingSource,
}

/// Interval checks shared by unit timelines and caption tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuralMetrics {
    /// Intervals starting before their predecessor ends.
    pub overlap_count: u32,
    pub non_positive_span_count: u32,
    /// Intervals ending past the audio (1 ms tolerance) or starting before 0.
    pub out_of_bounds_count: u32,
    pub max_end: f64,
}

impl StructuralMetrics {
    pub fn is_valid(&self) -> bool {
        self.overlap_count == 0 && self.non_positive_span_count == 0 && self.out_of_bounds_count == 0
    }
}

fn structural_metrics<I>(intervals: I, audio_duration: f64) -> StructuralMetrics
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut metrics = StructuralMetrics::default();
    let mut prev_end: Option<f64> = None;
    for (start, end) in intervals {
        if end <= start {
            metrics.non_positive_span_count += 1;
        }
        if start < 0.0 || end > audio_duration + EPS_DURATION_SEC {
            metrics.out_of_bounds_count += 1;
        }
        if prev_end.is_some_and(|p| start < p) {
            metrics.overlap_count += 1;
        }
        metrics.max_end = metrics.max_end.max(end);
        prev_end = Some(end);
    }
    metrics
}

pub fn caption_structure(chunks: &[CaptionChunk], audio_duration: f64) -> StructuralMetrics {
    structural_metrics(chunks.iter().map(|c| (c.start, c.end)), audio_duration)
}

pub fn compute_timeline_report(units: &[TimedUnit], audio_duration: f64) -> TimelineReport {
    let aligned_unit_count = units
        .iter()
        .filter(|u| u.source == UnitTimingSource::Aligned)
        .count();
    let mean_match_quality = if units.is_empty() {
        0.0
    } else {
        units.iter().map(|u| u.match_quality).sum::<f64>() / units.len() as f64
    };
    let display_total: f64 = units.iter().map(|u| u.display_duration).sum();
    let display_coverage = if audio_duration > 0.0 {
        display_total / audio_duration
    } else {
        0.0
    };

    let unit_reports = units
        .iter()
        .map(|u| UnitReport {
            index: u.unit.index,
            number: u.unit.number,
            word_count: u.unit.word_count,
            start: u.start,
            end: u.end,
            display_duration: u.display_duration,
            match_quality: u.match_quality,
            band: QualityBand::from_match_quality(u.match_quality),
            source: u.source,
        })
        .collect();

    TimelineReport {
        audio_duration,
        unit_count: units.len(),
        aligned_unit_count,
        fallback_unit_count: units.len() - aligned_unit_count,
        mean_match_quality,
        display_coverage,
        structural: structural_metrics(units.iter().map(|u| (u.start, u.end)), audio_duration),
        units: unit_reports,
    }
}
