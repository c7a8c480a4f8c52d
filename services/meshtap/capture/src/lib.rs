//! Capture files and sniffer framing.
//!
//! Frames from a LoRa sniffer arrive over a serial link terminated by a
//! two-byte marker ([`SerialFramer`]) and are stored in the classic capture
//! file format ([`CaptureWriter`], [`CaptureReader`]) so third-party capture
//! viewers can open them. The frame bytes are opaque here; decoding them is
//! the codec's job.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod pcap;
pub mod serial;

pub use error::CaptureError;
pub use pcap::{
    CaptureReader, CaptureRecord, CaptureWriter, DEFAULT_SNAP_LEN, LINKTYPE_LORATAP, PCAP_MAGIC,
};
pub use serial::{SerialFramer, FRAME_TERMINATOR};
