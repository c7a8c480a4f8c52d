//! Classic capture file format.
//!
//! ```text
//! global header (24 bytes, once)
//! +----------------------+----------------------+
//! | u32 magic            | 0xA1B2C3D4           |
//! | u16 major, u16 minor | 2, 4                 |
//! | u32 reserved1        | 0                    |
//! | u32 reserved2        | 0                    |
//! | u32 snap_len         | max captured bytes   |
//! | u16 link_type        | 270 (LoRaTap)        |
//! | u16 fcs/reserved     | 0                    |
//! +----------------------+----------------------+
//! per-frame record
//! +----------------------+----------------------+
//! | u32 seconds          | u32 microseconds     |
//! | u32 captured_len     | u32 original_len     |
//! | captured bytes       |                      |
//! +----------------------+----------------------+
//! ```
//!
//! All fields are little-endian.

use bytes::{Buf, BufMut, BytesMut};
use std::io::{self, Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::CaptureError;

/// File magic number
pub const PCAP_MAGIC: u32 = 0xA1B2_C3D4;

/// Format major version
pub const VERSION_MAJOR: u16 = 2;

/// Format minor version
pub const VERSION_MINOR: u16 = 4;

/// Default maximum captured bytes per frame
pub const DEFAULT_SNAP_LEN: u32 = 1024;

/// Link type of frames carrying the LoRa capture header
pub const LINKTYPE_LORATAP: u16 = 270;

const GLOBAL_HEADER_SIZE: usize = 24;
const RECORD_HEADER_SIZE: usize = 16;

/// One captured frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    /// Capture time since the Unix epoch (microsecond resolution)
    pub timestamp: Duration,
    /// Frame length before truncation to the snap length
    pub original_len: u32,
    /// Captured bytes
    pub data: Vec<u8>,
}

impl CaptureRecord {
    /// Whether the frame was cut short by the snap length
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.original_len as usize
    }
}

/// Writes frames to a capture file
#[derive(Debug)]
pub struct CaptureWriter<W: Write> {
    inner: W,
    snap_len: u32,
    frames: u64,
}

impl<W: Write> CaptureWriter<W> {
    /// Write the global header with the default snap length and link type
    pub fn new(inner: W) -> Result<Self, CaptureError> {
        Self::with_options(inner, DEFAULT_SNAP_LEN, LINKTYPE_LORATAP)
    }

    /// Write the global header with the given snap length and link type
    pub fn with_options(mut inner: W, snap_len: u32, link_type: u16) -> Result<Self, CaptureError> {
        let mut buf = BytesMut::with_capacity(GLOBAL_HEADER_SIZE);
        buf.put_u32_le(PCAP_MAGIC);
        buf.put_u16_le(VERSION_MAJOR);
        buf.put_u16_le(VERSION_MINOR);
        buf.put_u32_le(0);
        buf.put_u32_le(0);
        buf.put_u32_le(snap_len);
        buf.put_u16_le(link_type);
        // FCS length, P and R bits, reserved3
        buf.put_u16_le(0);

        inner.write_all(&buf)?;
        Ok(Self {
            inner,
            snap_len,
            frames: 0,
        })
    }

    /// Append a frame captured at `timestamp`
    pub fn write_frame(&mut self, timestamp: Duration, data: &[u8]) -> Result<(), CaptureError> {
        let original_len = data.len() as u32;
        let captured_len = original_len.min(self.snap_len);

        let mut buf = BytesMut::with_capacity(RECORD_HEADER_SIZE + captured_len as usize);
        buf.put_u32_le(timestamp.as_secs() as u32);
        buf.put_u32_le(timestamp.subsec_micros());
        buf.put_u32_le(captured_len);
        buf.put_u32_le(original_len);
        buf.put_slice(&data[..captured_len as usize]);

        self.inner.write_all(&buf)?;
        self.frames += 1;
        trace!(captured_len, original_len, "wrote capture record");
        Ok(())
    }

    /// Append a frame stamped with the current time
    pub fn write_frame_now(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        self.write_frame(now, data)
    }

    /// Flush buffered output
    pub fn flush(&mut self) -> Result<(), CaptureError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Frames written so far
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Snap length in effect
    pub fn snap_len(&self) -> u32 {
        self.snap_len
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads frames from a capture file
#[derive(Debug)]
pub struct CaptureReader<R: Read> {
    inner: R,
    snap_len: u32,
    link_type: u16,
}

// Read until `buf` is full or the input ends; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl<R: Read> CaptureReader<R> {
    /// Read and validate the global header
    pub fn new(mut inner: R) -> Result<Self, CaptureError> {
        let mut raw = [0u8; GLOBAL_HEADER_SIZE];
        let n = read_full(&mut inner, &mut raw)?;
        if n < GLOBAL_HEADER_SIZE {
            return Err(CaptureError::Truncated {
                needed: GLOBAL_HEADER_SIZE,
                available: n,
            });
        }

        let mut buf = &raw[..];
        let magic = buf.get_u32_le();
        if magic != PCAP_MAGIC {
            return Err(CaptureError::BadMagic(magic));
        }

        let major = buf.get_u16_le();
        let minor = buf.get_u16_le();
        if major != VERSION_MAJOR {
            return Err(CaptureError::Version { major, minor });
        }

        buf.advance(8);
        let snap_len = buf.get_u32_le();
        let link_type = buf.get_u16_le();

        Ok(Self {
            inner,
            snap_len,
            link_type,
        })
    }

    /// Snap length from the file header
    pub fn snap_len(&self) -> u32 {
        self.snap_len
    }

    /// Link type from the file header
    pub fn link_type(&self) -> u16 {
        self.link_type
    }

    /// Read the next record; `None` at a clean end of file
    pub fn next_record(&mut self) -> Result<Option<CaptureRecord>, CaptureError> {
        let mut raw = [0u8; RECORD_HEADER_SIZE];
        let n = read_full(&mut self.inner, &mut raw)?;
        if n == 0 {
            return Ok(None);
        }
        if n < RECORD_HEADER_SIZE {
            return Err(CaptureError::Truncated {
                needed: RECORD_HEADER_SIZE,
                available: n,
            });
        }

        let mut buf = &raw[..];
        let seconds = buf.get_u32_le();
        let micros = buf.get_u32_le();
        let captured_len = buf.get_u32_le();
        let original_len = buf.get_u32_le();

        if captured_len > self.snap_len {
            return Err(CaptureError::Oversized {
                len: captured_len,
                snap_len: self.snap_len,
            });
        }

        let mut data = vec![0u8; captured_len as usize];
        let n = read_full(&mut self.inner, &mut data)?;
        if n < data.len() {
            return Err(CaptureError::Truncated {
                needed: data.len(),
                available: n,
            });
        }

        Ok(Some(CaptureRecord {
            timestamp: Duration::from_secs(u64::from(seconds))
                + Duration::from_micros(u64::from(micros)),
            original_len,
            data,
        }))
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<CaptureRecord, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
