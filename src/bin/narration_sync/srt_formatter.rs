use narration_sync::CaptionChunk;

/// SubRip document, one cue per chunk, numbered from 1.
pub fn render_srt(chunks: &[CaptionChunk]) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(chunk.start),
            format_timestamp(chunk.end),
            chunk.text
        ));
    }
    out
}

/// `HH:MM:SS,mmm`, rounded to the millisecond.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_to_milliseconds() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(1.2346), "00:00:01,235");
        assert_eq!(format_timestamp(3723.9996), "01:02:04,000");
    }

    #[test]
    fn cues_are_numbered_and_separated() {
        let chunks = vec![
            CaptionChunk {
                text: "Hello world.".to_string(),
                start: 0.0,
                end: 0.9,
            },
            CaptionChunk {
                text: "This is amazing.".to_string(),
                start: 1.0,
                end: 2.0,
            },
        ];
        assert_eq!(
            render_srt(&chunks),
            "1\n00:00:00,000 --> 00:00:00,900\nHello world.\n\n\
             2\n00:00:01,000 --> 00:00:02,000\nThis is amazing.\n\n"
        );
    }
}
