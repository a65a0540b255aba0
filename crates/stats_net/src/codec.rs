//! MessagePack codec helpers.
//!
//! Payloads are encoded as MessagePack maps keyed by field name, so
//! publishers written in other languages can omit optional fields.

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Encode a value to MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    rmp_serde::to_vec_named(value).map_err(NetError::Encode)
}

/// Decode a value from MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialisation fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, NetError> {
    rmp_serde::from_slice(bytes).map_err(NetError::Decode)
}

#[cfg(test)]
mod tests {
    use stats_core::{EventKind, PlayerId, RawEvent};

    use super::*;

    #[derive(Serialize)]
    struct Sparse {
        kind: EventKind,
        client: u32,
    }

    #[test]
    fn test_decode_event_with_missing_fields() {
        let bytes = encode(&Sparse {
            kind: EventKind::Assist,
            client: 7,
        })
        .unwrap();
        let raw: RawEvent = decode(&bytes).unwrap();
        assert_eq!(raw, RawEvent::new(EventKind::Assist).client(PlayerId(7)));
    }

    #[test]
    fn test_encode_uses_field_names() {
        let bytes = encode(&RawEvent::new(EventKind::RoundStart)).unwrap();
        // fixmap with 4 entries
        assert_eq!(bytes[0], 0x84);
        assert!(bytes.windows(4).any(|w| w == b"kind"));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result: Result<RawEvent, _> = decode(&[0xFF, 0xFF]);
        assert!(matches!(result, Err(NetError::Decode(_))));
    }
}
