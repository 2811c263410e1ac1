//! Turns stored recommendation records into client-facing content blocks, and
//! holds the two fixed suggestions used by the sentiment endpoints.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::store::{RecommendationRecord, StoredBlock};

/// A content block reshaped by its declared type. Only the display metadata
/// of that type is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Iframe {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    Image {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Audio {
        href: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl ContentBlock {
    /// `None` for an unknown type or a block missing its link.
    pub fn from_stored(block: &StoredBlock) -> Option<Self> {
        let fields = &block.fields;
        match block.block_type.as_str() {
            "iframe" => Some(ContentBlock::Iframe {
                src: text(fields, "src")?,
                title: text(fields, "title"),
                width: dimension(fields, "width"),
                height: dimension(fields, "height"),
            }),
            "image" => Some(ContentBlock::Image {
                src: text(fields, "src")?,
                alt: text(fields, "alt"),
                caption: text(fields, "caption"),
            }),
            "audio" => Some(ContentBlock::Audio {
                href: text(fields, "href")?,
                label: text(fields, "label"),
            }),
            _ => None,
        }
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.as_str().map(str::to_string)
}

/// Accepts `560` as well as `"560"`, since authored content uses both.
fn dimension(fields: &Map<String, Value>, key: &str) -> Option<u32> {
    match fields.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().trim_end_matches("px").parse().ok(),
        _ => None,
    }
}

/// Reshape every block of a record, in authored order, dropping the ones
/// that cannot be rendered.
pub fn reshape(record: &RecommendationRecord) -> Vec<ContentBlock> {
    record
        .blocks
        .iter()
        .filter_map(|block| {
            let shaped = ContentBlock::from_stored(block);
            if shaped.is_none() {
                warn!(
                    "Skipping '{}' block in recommendation {}",
                    block.block_type, record.id
                );
            }
            shaped
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub title: &'static str,
    pub description: &'static str,
    pub content: Vec<ContentBlock>,
}

/// Label the sentiment classifier uses for the positive bucket.
pub const POSITIVE_LABEL: &str = "POSITIVE";

pub fn is_positive(label: &str) -> bool {
    label.eq_ignore_ascii_case(POSITIVE_LABEL)
}

/// One of exactly two suggestions: uplifting for positive text, comforting
/// for everything else.
pub fn suggestion_for(label: &str) -> Suggestion {
    if is_positive(label) {
        Suggestion {
            title: "Keep the momentum going",
            description: "You're in a good place. Here's something upbeat to carry the feeling forward.",
            content: vec![
                ContentBlock::Iframe {
                    src: "https://www.youtube.com/embed/ZbZSe6N_BXs".to_string(),
                    title: Some("Happy - Pharrell Williams".to_string()),
                    width: Some(560),
                    height: Some(315),
                },
                ContentBlock::Audio {
                    href: "https://open.spotify.com/playlist/37i9dQZF1DXdPec7aLTmlC".to_string(),
                    label: Some("Happy Hits playlist".to_string()),
                },
            ],
        }
    } else {
        Suggestion {
            title: "Take a gentle pause",
            description: "It sounds like a heavy moment. A few minutes of calm might help.",
            content: vec![
                ContentBlock::Iframe {
                    src: "https://www.youtube.com/embed/inpok4MKVLM".to_string(),
                    title: Some("5-minute guided meditation".to_string()),
                    width: Some(560),
                    height: Some(315),
                },
                ContentBlock::Audio {
                    href: "https://open.spotify.com/playlist/37i9dQZF1DWZqd5JICZI0u".to_string(),
                    label: Some("Peaceful piano".to_string()),
                },
            ],
        }
    }
}
