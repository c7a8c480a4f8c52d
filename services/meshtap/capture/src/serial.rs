//! Sniffer serial framing.
//!
//! The sniffer firmware writes each received frame followed by a fixed
//! two-byte terminator. Frames have no length prefix, so the framer buffers
//! input until it sees the terminator.

use bytes::{Buf, Bytes, BytesMut};
use tracing::warn;

use crate::CaptureError;

/// End-of-frame marker written by the sniffer
pub const FRAME_TERMINATOR: [u8; 2] = [0xCF, 0xCF];

/// Largest frame accepted before giving up on finding a terminator
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4096;

/// Incremental serial frame decoder
#[derive(Debug)]
pub struct SerialFramer {
    max_frame_size: usize,
}

impl SerialFramer {
    /// Create a framer with the default frame limit
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a framer with a custom frame limit
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Take one frame from the buffer, terminator stripped.
    ///
    /// Returns `Ok(None)` while the frame is incomplete. A frame longer than
    /// the limit, terminated or not, is discarded and an error returned; the
    /// next call starts fresh.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, CaptureError> {
        match buf
            .windows(FRAME_TERMINATOR.len())
            .position(|w| w == FRAME_TERMINATOR)
        {
            Some(end) if end > self.max_frame_size => {
                buf.advance(end + FRAME_TERMINATOR.len());
                warn!(len = end, "discarding oversized serial frame");
                Err(CaptureError::FrameTooLarge(self.max_frame_size))
            }
            Some(end) => {
                let frame = buf.split_to(end).freeze();
                buf.advance(FRAME_TERMINATOR.len());
                Ok(Some(frame))
            }
            None if buf.len() > self.max_frame_size => {
                let len = buf.len();
                // keep a trailing half terminator
                let keep = usize::from(buf.last() == Some(&FRAME_TERMINATOR[0]));
                buf.advance(len - keep);
                warn!(len, "discarding serial input without frame terminator");
                Err(CaptureError::FrameTooLarge(self.max_frame_size))
            }
            None => Ok(None),
        }
    }
}

impl Default for SerialFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut framer = SerialFramer::new();
        let mut buf = BytesMut::from(&b"frame\xCF\xCF"[..]);
        assert_eq!(framer.decode(&mut buf).unwrap().unwrap(), &b"frame"[..]);
        assert!(buf.is_empty());
        assert!(framer.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_partial_frames_stay_buffered() {
        let mut framer = SerialFramer::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"one\xCF");
        assert!(framer.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\xCFtwo\xCF\xCFthr");
        assert_eq!(framer.decode(&mut buf).unwrap().unwrap(), &b"one"[..]);
        assert_eq!(framer.decode(&mut buf).unwrap().unwrap(), &b"two"[..]);
        assert!(framer.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"thr");
    }

    #[test]
    fn test_empty_frame() {
        let mut framer = SerialFramer::new();
        let mut buf = BytesMut::from(&b"\xCF\xCF"[..]);
        assert!(framer.decode(&mut buf).unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_oversized_input_discarded() {
        let mut framer = SerialFramer::with_max_frame_size(8);
        let mut buf = BytesMut::from(&[0x11u8; 9][..]);
        assert!(matches!(
            framer.decode(&mut buf),
            Err(CaptureError::FrameTooLarge(8))
        ));
        assert!(buf.is_empty());

        buf.extend_from_slice(b"ok\xCF\xCF");
        assert_eq!(framer.decode(&mut buf).unwrap().unwrap(), &b"ok"[..]);
    }

    #[test]
    fn test_oversized_terminated_frame_dropped() {
        let mut framer = SerialFramer::with_max_frame_size(8);
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[0x22u8; 12]);
        buf.extend_from_slice(b"\xCF\xCFnext\xCF\xCF");

        assert!(matches!(
            framer.decode(&mut buf),
            Err(CaptureError::FrameTooLarge(8))
        ));
        assert_eq!(framer.decode(&mut buf).unwrap().unwrap(), &b"next"[..]);
        assert!(buf.is_empty());
    }
}
