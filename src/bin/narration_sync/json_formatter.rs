use narration_sync::alignment::report::StructuralMetrics;
use narration_sync::{CaptionChunk, CascadeTier, TimelineReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CaptionDocument<'a> {
    pub audio_duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<CascadeTier>,
    pub structure: StructuralMetrics,
    pub chunks: &'a [CaptionChunk],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineReport>,
}

pub fn render_json(document: &CaptionDocument<'_>) -> Result<String, String> {
    let mut out = serde_json::to_string_pretty(document)
        .map_err(|err| format!("Failed to serialize caption JSON: {err}"))?;
    out.push('\n');
    Ok(out)
}
