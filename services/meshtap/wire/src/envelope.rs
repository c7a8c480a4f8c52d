//! Bridge transport envelope.
//!
//! Packets relayed over a store-and-forward bridge arrive wrapped in a
//! schema-typed envelope instead of behind a radio header. Unwrapping yields
//! the same addressing fields and ciphertext the radio path produces.

use bytes::Bytes;
use meshtap_proto::mesh::mesh_packet::PayloadVariant;
use meshtap_proto::{MeshPacket, ServiceEnvelope};
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::header::{MeshHeader, NodeId, PacketFlags};

/// Unwrapped bridge envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportEnvelope {
    /// Destination node
    pub dst: u32,
    /// Source node
    pub src: u32,
    /// Packet id
    pub packet_id: u32,
    /// Encrypted application payload
    #[serde(skip)]
    pub ciphertext: Bytes,
    /// Channel name the gateway heard the packet on
    pub channel_id: String,
    /// Gateway that relayed the packet
    pub gateway_id: String,
    /// Hop and routing flags as reported by the gateway
    pub flags: PacketFlags,
}

impl TransportEnvelope {
    /// Wrap a radio header and ciphertext for relaying
    pub fn from_header(header: &MeshHeader, ciphertext: Bytes, channel_id: &str, gateway_id: &str) -> Self {
        Self {
            dst: header.dst,
            src: header.src,
            packet_id: header.packet_id,
            ciphertext,
            channel_id: channel_id.to_string(),
            gateway_id: gateway_id.to_string(),
            flags: header.flags,
        }
    }

    /// Source node
    pub fn source(&self) -> NodeId {
        NodeId(self.src)
    }

    /// Destination node
    pub fn destination(&self) -> NodeId {
        NodeId(self.dst)
    }

    /// Decode an envelope from a bridge message body
    pub fn decode(bytes: &[u8]) -> Result<Self, crate::WireError> {
        let envelope = ServiceEnvelope::decode(bytes)
            .map_err(|e| crate::WireError::Envelope(e.to_string()))?;

        let packet = envelope
            .packet
            .ok_or_else(|| crate::WireError::Envelope("missing packet".to_string()))?;

        let ciphertext = match packet.payload_variant {
            Some(PayloadVariant::Encrypted(bytes)) => Bytes::from(bytes),
            Some(PayloadVariant::Decoded(_)) => {
                return Err(crate::WireError::Envelope(
                    "packet payload is not encrypted".to_string(),
                ))
            }
            None => return Err(crate::WireError::Envelope("missing payload".to_string())),
        };

        Ok(Self {
            dst: packet.to,
            src: packet.from,
            packet_id: packet.id,
            ciphertext,
            channel_id: envelope.channel_id,
            gateway_id: envelope.gateway_id,
            flags: PacketFlags::new(
                packet.hop_limit as u8,
                packet.want_ack,
                packet.via_mqtt,
                packet.hop_start as u8,
            ),
        })
    }

    /// Encode the envelope into a bridge message body
    pub fn encode(&self) -> Bytes {
        let envelope = ServiceEnvelope {
            packet: Some(MeshPacket {
                from: self.src,
                to: self.dst,
                id: self.packet_id,
                hop_limit: u32::from(self.flags.hop_limit),
                want_ack: self.flags.want_ack,
                via_mqtt: self.flags.via_mqtt,
                hop_start: u32::from(self.flags.hop_start),
                payload_variant: Some(PayloadVariant::Encrypted(self.ciphertext.to_vec())),
                ..Default::default()
            }),
            channel_id: self.channel_id.clone(),
            gateway_id: self.gateway_id.clone(),
        };
        Bytes::from(envelope.encode_to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransportEnvelope {
        let header = MeshHeader::new(0x12345678, 0xFFFFFFFF, 0x42);
        TransportEnvelope::from_header(
            &header,
            Bytes::from_static(&[1, 2, 3, 4]),
            "LongFast",
            "!a1b2c3d4",
        )
    }

    #[test]
    fn test_encode_decode() {
        let envelope = sample();
        let decoded = TransportEnvelope::decode(&envelope.encode()).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.source().to_string(), "!12345678");
    }

    #[test]
    fn test_truncated_message() {
        // field 1, length 5, only one byte present
        let result = TransportEnvelope::decode(&[0x0A, 0x05, 0x01]);
        assert!(matches!(result, Err(crate::WireError::Envelope(_))));
    }

    #[test]
    fn test_missing_packet() {
        let body = ServiceEnvelope {
            packet: None,
            channel_id: "LongFast".to_string(),
            gateway_id: String::new(),
        }
        .encode_to_vec();

        match TransportEnvelope::decode(&body) {
            Err(crate::WireError::Envelope(reason)) => assert_eq!(reason, "missing packet"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_plaintext_packet_rejected() {
        let body = ServiceEnvelope {
            packet: Some(MeshPacket {
                from: 1,
                to: 2,
                payload_variant: Some(PayloadVariant::Decoded(Default::default())),
                ..Default::default()
            }),
            ..Default::default()
        }
        .encode_to_vec();

        assert!(matches!(
            TransportEnvelope::decode(&body),
            Err(crate::WireError::Envelope(_))
        ));
    }
}
