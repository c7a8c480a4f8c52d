//! Layered frame decoding and encoding.
//!
//! Each layer has its own `decode`; the functions here compose them for the
//! two ways a mesh packet reaches us (a radio capture or a bridge message)
//! and [`FrameBuilder`] runs the same layers in reverse.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::app::{self, ApplicationRecord};
use crate::capture::CaptureHeader;
use crate::crypto::ChannelKey;
use crate::envelope::TransportEnvelope;
use crate::header::{MeshHeader, NodeId, PacketFlags};
use crate::payload::DecryptedPayload;
use crate::WireError;

/// How a mesh packet reached us
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// Heard over the air, behind a mesh header
    Radio(MeshHeader),
    /// Relayed by a bridge gateway inside an envelope
    Bridge(TransportEnvelope),
}

impl Link {
    /// Source node
    pub fn source(&self) -> NodeId {
        match self {
            Link::Radio(header) => header.source(),
            Link::Bridge(envelope) => envelope.source(),
        }
    }

    /// Destination node
    pub fn destination(&self) -> NodeId {
        match self {
            Link::Radio(header) => header.destination(),
            Link::Bridge(envelope) => envelope.destination(),
        }
    }

    /// Packet id
    pub fn packet_id(&self) -> u32 {
        match self {
            Link::Radio(header) => header.packet_id,
            Link::Bridge(envelope) => envelope.packet_id,
        }
    }

    /// Hop and routing flags
    pub fn flags(&self) -> PacketFlags {
        match self {
            Link::Radio(header) => header.flags,
            Link::Bridge(envelope) => envelope.flags,
        }
    }
}

/// A decoded mesh packet.
///
/// `app` carries its own result: an application body that is unsupported or
/// fails to decode still leaves the addressing and payload fields usable, and
/// `payload.inner` keeps the raw body.
#[derive(Debug)]
pub struct MeshFrame {
    /// Addressing layer
    pub link: Link,
    /// Decrypted payload fields
    pub payload: DecryptedPayload,
    /// Application record
    pub app: Result<ApplicationRecord, WireError>,
}

impl MeshFrame {
    /// Canonical name of the payload's message type
    pub fn app_name(&self) -> String {
        app::app_name(self.payload.message_type)
    }
}

/// A decoded radio capture
#[derive(Debug)]
pub enum CaptureFrame {
    /// Frame from another LoRa network; body left undecoded
    Foreign {
        /// Capture metadata
        capture: CaptureHeader,
        /// Frame body
        body: Bytes,
    },
    /// Mesh packet
    Mesh {
        /// Capture metadata
        capture: CaptureHeader,
        /// Decoded packet
        packet: MeshFrame,
    },
}

impl CaptureFrame {
    /// Capture metadata
    pub fn capture(&self) -> &CaptureHeader {
        match self {
            CaptureFrame::Foreign { capture, .. } => capture,
            CaptureFrame::Mesh { capture, .. } => capture,
        }
    }
}

fn open(link: Link, ciphertext: &[u8], key: &ChannelKey) -> Result<MeshFrame, WireError> {
    let src = link.source();
    let packet_id = link.packet_id();
    let payload = DecryptedPayload::decode(ciphertext, packet_id, src.0, key)?;
    let app = app::decode(payload.message_type, &payload.inner);

    debug!(
        src = %src,
        dst = %link.destination(),
        packet_id,
        message_type = payload.message_type,
        app_ok = app.is_ok(),
        "decoded mesh packet"
    );

    Ok(MeshFrame { link, payload, app })
}

/// Decode a mesh packet: header followed by ciphertext
pub fn decode_radio_packet(mut bytes: Bytes, key: &ChannelKey) -> Result<MeshFrame, WireError> {
    let header = MeshHeader::decode(&mut bytes)?;
    open(Link::Radio(header), &bytes, key)
}

/// Decode a capture: capture header, then a mesh packet when the sync word
/// matches
pub fn decode_capture_frame(mut bytes: Bytes, key: &ChannelKey) -> Result<CaptureFrame, WireError> {
    let capture = CaptureHeader::decode(&mut bytes)?;

    if !capture.is_mesh() {
        debug!(sync_word = capture.sync_word, len = bytes.len(), "skipping foreign frame");
        return Ok(CaptureFrame::Foreign {
            capture,
            body: bytes,
        });
    }

    let packet = decode_radio_packet(bytes, key)?;
    Ok(CaptureFrame::Mesh { capture, packet })
}

/// Decode a bridge message body
pub fn decode_bridge_message(bytes: &[u8], key: &ChannelKey) -> Result<MeshFrame, WireError> {
    let envelope = TransportEnvelope::decode(bytes)?;
    let ciphertext = envelope.ciphertext.clone();
    open(Link::Bridge(envelope), &ciphertext, key)
}

/// Frame builder, the encoding mirror of the decode pipelines
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    header: MeshHeader,
    capture: Option<CaptureHeader>,
    payload: DecryptedPayload,
}

impl FrameBuilder {
    /// Create a builder for a packet with the given header
    pub fn new(header: MeshHeader) -> Self {
        Self {
            header,
            capture: None,
            payload: DecryptedPayload::new(0, Bytes::new()),
        }
    }

    /// Prefix the frame with a capture header
    pub fn with_capture(mut self, capture: CaptureHeader) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Set payload fields; the message type and body come from the record
    pub fn payload_fields(mut self, payload: DecryptedPayload) -> Self {
        self.payload = payload;
        self
    }

    fn seal(&self, record: &ApplicationRecord, key: &ChannelKey) -> Result<Bytes, WireError> {
        let mut payload = self.payload.clone();
        payload.message_type = record.message_type;
        payload.inner = Bytes::from(app::encode(record)?);
        Ok(payload.encode(self.header.packet_id, self.header.src, key))
    }

    /// Build a radio frame (capture header if set, mesh header, ciphertext)
    pub fn build(&self, record: &ApplicationRecord, key: &ChannelKey) -> Result<Bytes, WireError> {
        let ciphertext = self.seal(record, key)?;

        let mut buf = BytesMut::with_capacity(
            crate::CAPTURE_HEADER_SIZE + crate::MESH_HEADER_SIZE + ciphertext.len(),
        );
        if let Some(capture) = &self.capture {
            capture.encode(&mut buf);
        }
        self.header.encode(&mut buf);
        buf.put_slice(&ciphertext);

        Ok(buf.freeze())
    }

    /// Build a bridge message body
    pub fn build_bridge(
        &self,
        record: &ApplicationRecord,
        key: &ChannelKey,
        channel_id: &str,
        gateway_id: &str,
    ) -> Result<Bytes, WireError> {
        let ciphertext = self.seal(record, key)?;
        Ok(TransportEnvelope::from_header(&self.header, ciphertext, channel_id, gateway_id).encode())
    }
}

/// Encode a capture frame from its parts
pub fn encode_capture_frame(
    capture: &CaptureHeader,
    header: &MeshHeader,
    payload: &DecryptedPayload,
    record: &ApplicationRecord,
    key: &ChannelKey,
) -> Result<Bytes, WireError> {
    FrameBuilder::new(*header)
        .with_capture(*capture)
        .payload_fields(payload.clone())
        .build(record, key)
}
