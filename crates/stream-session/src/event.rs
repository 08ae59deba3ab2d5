//! Subscription-channel message decoding.
//!
//! Every server message is a JSON document with a `messageType` discriminator.
//! Messages are decoded once here into [`StreamEvent`]; nothing downstream
//! looks at raw JSON.

use serde::Deserialize;

/// A decoded message from the subscription channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    /// One matched record.
    Entry { id: u64 },
    /// Progress report: `processed_so_far` of `total_known` records scanned.
    /// A `total_known` of zero means no final count is known yet.
    Progress {
        processed_so_far: u64,
        total_known: u64,
    },
    /// Any other message type. Ignored by the session.
    Unknown,
}

#[derive(Deserialize)]
#[serde(tag = "messageType", rename_all = "camelCase")]
enum WireMessage {
    Entry { data: EntryData },
    QueryMetadata { data: ProgressData },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct EntryData {
    id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressData {
    left_off: u64,
    total: u64,
}

impl StreamEvent {
    /// Decode a single text frame.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let message: WireMessage = serde_json::from_str(text)?;
        Ok(match message {
            WireMessage::Entry { data } => StreamEvent::Entry { id: data.id },
            WireMessage::QueryMetadata { data } => StreamEvent::Progress {
                processed_so_far: data.left_off,
                total_known: data.total,
            },
            WireMessage::Unknown => StreamEvent::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entry() {
        let event = StreamEvent::decode(
            r#"{"messageType":"entry","data":{"id":42,"protocol":{"name":"http"},"summary":"/get"}}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::Entry { id: 42 });
    }

    #[test]
    fn test_decode_query_metadata() {
        let event = StreamEvent::decode(
            r#"{"messageType":"queryMetadata","data":{"current":3,"total":10,"leftOff":7,"truncatedTimestamp":0}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            StreamEvent::Progress {
                processed_so_far: 7,
                total_known: 10
            }
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        let event =
            StreamEvent::decode(r#"{"messageType":"toast","data":{"text":"hello"}}"#).unwrap();
        assert_eq!(event, StreamEvent::Unknown);
    }

    #[test]
    fn test_decode_entry_without_id_is_error() {
        assert!(StreamEvent::decode(r#"{"messageType":"entry","data":{}}"#).is_err());
    }

    #[test]
    fn test_decode_non_integer_progress_is_error() {
        assert!(StreamEvent::decode(
            r#"{"messageType":"queryMetadata","data":{"leftOff":"x","total":3}}"#
        )
        .is_err());
    }

    #[test]
    fn test_decode_missing_discriminator_is_error() {
        assert!(StreamEvent::decode(r#"{"data":{"id":1}}"#).is_err());
    }

    #[test]
    fn test_decode_invalid_json_is_error() {
        assert!(StreamEvent::decode("not json").is_err());
    }
}
