//! Persisted form of a tagged buffer.
//!
//! The blob is JSON, but callers should treat it as opaque bytes:
//! `deserialize(serialize(buffer))` reproduces the same text and the
//! same tag regions, and that is the whole contract.

use serde::{Deserialize, Serialize};

use crate::regions::TagRegion;
use crate::{BufferError, BufferResult, TagBuffer};

/// Format version written by [`serialize`].
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    format: u32,
    text: String,
    #[serde(default)]
    regions: Vec<TagRegion>,
}

/// Encodes a buffer as an opaque blob.
pub fn serialize(buffer: &TagBuffer) -> BufferResult<Vec<u8>> {
    let snapshot = Snapshot {
        format: FORMAT_VERSION,
        text: buffer.text(),
        regions: buffer.regions(),
    };
    Ok(serde_json::to_vec(&snapshot)?)
}

/// Decodes a blob produced by [`serialize`].
///
/// An empty blob decodes to an empty buffer.
pub fn deserialize(blob: &[u8]) -> BufferResult<TagBuffer> {
    if blob.is_empty() {
        return Ok(TagBuffer::new());
    }

    let snapshot: Snapshot = serde_json::from_slice(blob)?;
    if snapshot.format != FORMAT_VERSION {
        return Err(BufferError::UnsupportedFormat(snapshot.format));
    }

    let buffer = TagBuffer::from_parts(&snapshot.text, &snapshot.regions)?;
    tracing::debug!(
        chars = buffer.len_chars(),
        regions = snapshot.regions.len(),
        "decoded buffer"
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tag;

    #[test]
    fn test_round_trip() {
        let mut buffer = TagBuffer::from("Title\nbody text");
        buffer.apply_tag(Tag::Title, 0..5).unwrap();
        buffer.apply_tag(Tag::Bold, 6..10).unwrap();
        buffer.apply_tag(Tag::JustCenter, 0..1).unwrap();

        let blob = serialize(&buffer).unwrap();
        let decoded = deserialize(&blob).unwrap();

        assert_eq!(decoded, buffer);
        assert_eq!(decoded.text(), "Title\nbody text");
        assert_eq!(decoded.regions(), buffer.regions());
    }

    #[test]
    fn test_empty_blob() {
        let buffer = deserialize(b"").unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_rejects_unknown_format() {
        let blob = br#"{"format":7,"text":"x","regions":[]}"#;
        assert!(matches!(
            deserialize(blob),
            Err(BufferError::UnsupportedFormat(7))
        ));
    }

    #[test]
    fn test_rejects_region_past_end() {
        let blob = br#"{"format":1,"text":"abc","regions":[{"tag":"bold","start":1,"end":9}]}"#;
        assert!(matches!(
            deserialize(blob),
            Err(BufferError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let blob = br#"{"format":1,"text":"abc","regions":[{"tag":"blink","start":0,"end":1}]}"#;
        assert!(matches!(deserialize(blob), Err(BufferError::Codec(_))));
    }
}
