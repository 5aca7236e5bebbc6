use std::fs;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::SubtitleError;
use crate::types::caption_data::SubtitleCue;

static TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timing pattern compiles")
});
static FORMAT_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>|\{\\[^}]*\}").expect("format tag pattern compiles"));

/// Track used when no subtitle file is given.
pub const SAMPLE_TRACK: &str = "\
1
00:00:00,500 --> 00:00:04,000
Hej, hur mår du?
Jag mår bra, tack.

2
00:00:04,000 --> 00:00:08,500
Vi skulle gå till stranden,
men det började regna.

3
00:00:08,500 --> 00:00:13,000
Det är ett välkänt problem.
Ska vi ta bussen hem?

4
00:00:13,000 --> 00:00:18,000
Ja! Bussen går om tio minuter.
";

/// `None` when a field does not fit in a `u64` or the total overflows.
fn millis(caps: &regex::Captures, first: usize) -> Option<Duration> {
    let part = |i: usize| caps.get(first + i)?.as_str().parse::<u64>().ok();
    let minutes = part(0)?.checked_mul(60)?.checked_add(part(1)?)?;
    let seconds = minutes.checked_mul(60)?.checked_add(part(2)?)?;
    let total = seconds.checked_mul(1000)?.checked_add(part(3)?)?;
    Some(Duration::from_millis(total))
}

pub fn parse_srt_text(content: &str) -> Result<Vec<SubtitleCue>, SubtitleError> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues = Vec::new();

    for (block_idx, block) in content.split("\n\n").map(str::trim).filter(|b| !b.is_empty()).enumerate() {
        let mut lines = block.lines().map(str::trim);
        let mut first = lines.next().unwrap_or_default();

        let index = match first.parse::<usize>() {
            Ok(n) => {
                first = lines.next().unwrap_or_default();
                n
            }
            Err(_) => block_idx + 1,
        };

        let Some(caps) = TIMING_RE.captures(first) else {
            return Err(SubtitleError::Timing { index, line: first.to_string() });
        };
        let (Some(start), Some(end)) = (millis(&caps, 1), millis(&caps, 5)) else {
            return Err(SubtitleError::Timing { index, line: first.to_string() });
        };
        if end <= start {
            warn!("cue {} ends before it starts, skipping", index);
            continue;
        }

        let text: Vec<String> = lines
            .map(|l| FORMAT_TAG_RE.replace_all(l, "").trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        cues.push(SubtitleCue { index, start, end, lines: text });
    }

    if cues.is_empty() {
        return Err(SubtitleError::Empty);
    }
    cues.sort_by_key(|c| c.start);
    Ok(cues)
}

pub fn load_srt_file(path: &Path) -> Result<Vec<SubtitleCue>, SubtitleError> {
    let content = fs::read_to_string(path).map_err(|source| SubtitleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_srt_text(&content)
}
