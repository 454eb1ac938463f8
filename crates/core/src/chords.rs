//! Inline chord markers in task text, e.g. `Play (x32010) C then (320003) G`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static CHORD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(([x0-9]{6})\)\s*([A-G][#bA-Za-z0-9]*)?").expect("valid chord regex")
});

const UNKNOWN_FINGERING: &str = "000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChordPart {
    Text { content: String },
    Chord { fingering: String, name: String },
}

/// Splits text into plain runs and chord markers.
///
/// Fingerings are upper-cased (`x` → `X`); the chord name is empty when the
/// marker has none.
#[must_use]
pub fn parse_text_with_chords(text: &str) -> Vec<ChordPart> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in CHORD_MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            parts.push(ChordPart::Text {
                content: text[last..whole.start()].to_owned(),
            });
        }

        let fingering: String = caps
            .get(1)
            .map_or("", |m| m.as_str())
            .to_ascii_uppercase()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == 'X')
            .collect();
        let fingering = if fingering.len() == 6 {
            fingering
        } else {
            UNKNOWN_FINGERING.to_owned()
        };
        let name = caps.get(2).map_or("", |m| m.as_str()).to_owned();

        parts.push(ChordPart::Chord { fingering, name });
        last = whole.end();
    }

    if last < text.len() {
        parts.push(ChordPart::Text {
            content: text[last..].to_owned(),
        });
    }
    parts
}
