//! Codec error types.

use thiserror::Error;

/// Errors raised while decoding or encoding a frame.
///
/// Everything except [`WireError::Key`] and [`WireError::Base64`] is local to
/// one frame: callers log it and move on to the next frame.
#[derive(Error, Debug)]
pub enum WireError {
    /// Not enough bytes for a fixed-size header
    #[error("malformed {layer} header: need {needed} bytes, have {available}")]
    MalformedHeader {
        /// Layer that failed (`capture` or `mesh`)
        layer: &'static str,
        /// Fixed size of the header
        needed: usize,
        /// Bytes that were available
        available: usize,
    },

    /// Outer transport message failed schema validation
    #[error("not a valid envelope: {0}")]
    Envelope(String),

    /// Channel key text is not valid base64
    #[error("channel key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Channel key longer than 32 bytes
    #[error("channel key is {0} bytes, longer than 32")]
    Key(usize),

    /// Payload or application body failed to decode
    #[error("{reason} (likely cause: {likely_cause})")]
    Decode {
        /// What failed
        reason: &'static str,
        /// Most probable explanation
        likely_cause: &'static str,
    },

    /// Envelope decoded but the application message type has no decoder
    #[error("unsupported application type {0}")]
    UnsupportedType(u32),

    /// Structured fields could not be turned back into a schema message
    #[error("encode failed: {0}")]
    Encode(String),
}

impl WireError {
    /// Payload schema decode failure
    pub(crate) fn payload_decode() -> Self {
        WireError::Decode {
            reason: "schema decode failed",
            likely_cause: "wrong channel key or corrupt payload",
        }
    }

    /// Whether the error is a configuration problem rather than a bad frame
    pub fn is_fatal(&self) -> bool {
        matches!(self, WireError::Key(_) | WireError::Base64(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(WireError::Key(33).is_fatal());
        assert!(!WireError::UnsupportedType(255).is_fatal());
        assert!(!WireError::payload_decode().is_fatal());
        assert!(!WireError::Envelope("truncated".into()).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = WireError::MalformedHeader {
            layer: "capture",
            needed: 15,
            available: 3,
        };
        assert_eq!(err.to_string(), "malformed capture header: need 15 bytes, have 3");
        assert_eq!(
            WireError::payload_decode().to_string(),
            "schema decode failed (likely cause: wrong channel key or corrupt payload)"
        );
    }
}
