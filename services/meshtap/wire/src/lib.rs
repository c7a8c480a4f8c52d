//! Layered packet codec for the LoRa mesh protocol.
//!
//! A mesh packet is peeled in layers, each with its own `decode`/`encode`:
//!
//! ```text
//! radio capture                      bridge message
//! +---------------------------+      +---------------------------+
//! | capture header (15B, BE)  |      | transport envelope        |
//! +---------------------------+      | (schema message carrying  |
//! | mesh header (16B, LE)     |      |  addressing + ciphertext) |
//! +---------------------------+      +---------------------------+
//! | ciphertext                |
//! +---------------------------+
//!            \                          /
//!             AES-CTR keyed by the channel key, IV from (packet id, src)
//!                           |
//!             payload envelope (message type, ids, body)
//!                           |
//!             application dispatcher (text or schema message)
//! ```
//!
//! The codec is pure: no I/O, no shared state, safe to call from any number
//! of tasks at once.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod capture;
pub mod codec;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod header;
pub mod payload;

pub use app::{app_name, AppData, ApplicationRecord};
pub use capture::{CaptureHeader, CAPTURE_HEADER_SIZE, MESH_SYNC_WORD};
pub use codec::{
    decode_bridge_message, decode_capture_frame, decode_radio_packet, encode_capture_frame,
    CaptureFrame, FrameBuilder, Link, MeshFrame,
};
pub use crypto::{ChannelKey, DEFAULT_CHANNEL_KEY, DEFAULT_PSK};
pub use envelope::TransportEnvelope;
pub use error::WireError;
pub use header::{MeshHeader, NodeId, PacketFlags, BROADCAST_ADDR, MESH_HEADER_SIZE};
pub use payload::DecryptedPayload;
