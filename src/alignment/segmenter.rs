use std::sync::OnceLock;

use regex::Regex;

use crate::error::CaptionError;
use crate::types::{NarrationUnit, Script, ScriptFormat};

fn scene_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("scene marker pattern is valid"))
}

/// Split raw narration into ordered units.
///
/// `[n]` markers each open a unit that runs to the next marker (or the end of
/// the text) and keep their own number. Text without markers becomes a single
/// implicit unit. Fails when the narration contains no words at all.
pub fn segment(text: &str) -> Result<Script, CaptionError> {
    let markers: Vec<_> = scene_marker().captures_iter(text).collect();

    let script = if markers.is_empty() {
        let body = text.trim();
        Script {
            format: ScriptFormat::Prose,
            units: vec![NarrationUnit::new(0, None, body)],
            clean_text: body.to_string(),
        }
    } else {
        let first_marker_start = markers[0].get(0).map(|m| m.start()).unwrap_or(0);
        let preamble = text[..first_marker_start].trim();
        if !preamble.is_empty() {
            tracing::warn!(
                preamble_chars = preamble.chars().count(),
                "segmenter: text before the first scene marker is not narrated"
            );
        }

        let mut units = Vec::with_capacity(markers.len());
        for (i, caps) in markers.iter().enumerate() {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let number: u32 = number.as_str().parse().map_err(|_| {
                CaptionError::invalid_input(format!(
                    "scene marker [{}] is out of range",
                    number.as_str()
                ))
            })?;
            let body_end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            let body = text[whole.end()..body_end].trim();
            if body.is_empty() {
                tracing::debug!(scene = number, "segmenter: skipping empty scene");
                continue;
            }
            units.push(NarrationUnit::new(units.len(), Some(number), body));
        }

        let clean_text = units
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Script {
            format: ScriptFormat::Scenes,
            units,
            clean_text,
        }
    };

    if script.word_count() == 0 {
        return Err(CaptionError::invalid_input("narration text contains no words"));
    }

    tracing::debug!(
        format = ?script.format,
        units = script.units.len(),
        words = script.word_count(),
        "segmenter: script parsed"
    );
    Ok(script)
}
