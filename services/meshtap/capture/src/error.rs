//! Capture error types.

use thiserror::Error;

/// Errors raised while reading or writing captures
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Underlying reader or writer failed
    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the expected magic number
    #[error("not a capture file (magic 0x{0:08X})")]
    BadMagic(u32),

    /// File format version is not 2.x
    #[error("unsupported capture version {major}.{minor}")]
    Version {
        /// Major version
        major: u16,
        /// Minor version
        minor: u16,
    },

    /// File ended inside a record
    #[error("truncated record: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes the record needs
        needed: usize,
        /// Bytes that were available
        available: usize,
    },

    /// Record claims more captured bytes than the snap length allows
    #[error("record of {len} bytes exceeds snap length {snap_len}")]
    Oversized {
        /// Captured length in the record
        len: u32,
        /// Snap length from the file header
        snap_len: u32,
    },

    /// Serial input grew past the frame limit without a terminator
    #[error("serial frame exceeds {0} bytes without a terminator")]
    FrameTooLarge(usize),
}
