//! Encrypted application-data envelope.

use bytes::Bytes;
use meshtap_proto::Data;
use prost::Message;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::{self, ChannelKey};

/// Fields recovered from a decrypted payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedPayload {
    /// Message-type id selecting the application decoder
    pub message_type: u32,
    /// Sender wants an application-level response
    pub want_response: bool,
    /// Final destination when relayed
    pub dst_id: Option<u32>,
    /// Original source when relayed
    pub src_id: Option<u32>,
    /// Packet id this message answers
    pub request_id: Option<u32>,
    /// Packet id this message replies to
    pub reply_id: Option<u32>,
    /// Emoji reaction codepoint
    pub emoji: Option<u32>,
    /// Extra flag bits, big-endian
    pub bitfield: [u8; 4],
    /// Application body handed to the dispatcher
    #[serde(skip)]
    pub inner: Bytes,
}

fn non_zero(value: u32) -> Option<u32> {
    (value != 0).then_some(value)
}

impl DecryptedPayload {
    /// Create a payload carrying `inner` for the given message type
    pub fn new(message_type: u32, inner: Bytes) -> Self {
        Self {
            message_type,
            want_response: false,
            dst_id: None,
            src_id: None,
            request_id: None,
            reply_id: None,
            emoji: None,
            bitfield: [0; 4],
            inner,
        }
    }

    /// Decrypt and schema-decode a payload
    pub fn decode(
        ciphertext: &[u8],
        packet_id: u32,
        src: u32,
        key: &ChannelKey,
    ) -> Result<Self, crate::WireError> {
        let plaintext = crypto::transform(key, packet_id, src, ciphertext);
        Self::from_plaintext(&plaintext)
    }

    /// Schema-decode an already decrypted payload
    pub fn from_plaintext(plaintext: &[u8]) -> Result<Self, crate::WireError> {
        let data = Data::decode(plaintext).map_err(|e| {
            debug!("payload schema decode failed: {}", e);
            crate::WireError::payload_decode()
        })?;

        Ok(Self {
            message_type: data.portnum as u32,
            want_response: data.want_response,
            dst_id: non_zero(data.dest),
            src_id: non_zero(data.source),
            request_id: non_zero(data.request_id),
            reply_id: non_zero(data.reply_id),
            emoji: non_zero(data.emoji),
            bitfield: data.bitfield.unwrap_or_default().to_be_bytes(),
            inner: Bytes::from(data.payload),
        })
    }

    /// Schema-encode without encrypting
    pub fn to_plaintext(&self) -> Vec<u8> {
        let bitfield = u32::from_be_bytes(self.bitfield);
        let data = Data {
            portnum: self.message_type as i32,
            payload: self.inner.to_vec(),
            want_response: self.want_response,
            dest: self.dst_id.unwrap_or_default(),
            source: self.src_id.unwrap_or_default(),
            request_id: self.request_id.unwrap_or_default(),
            reply_id: self.reply_id.unwrap_or_default(),
            emoji: self.emoji.unwrap_or_default(),
            bitfield: non_zero(bitfield),
        };
        data.encode_to_vec()
    }

    /// Schema-encode and encrypt for the given packet
    pub fn encode(&self, packet_id: u32, src: u32, key: &ChannelKey) -> Bytes {
        let mut buf = self.to_plaintext();
        crypto::apply_keystream(key, packet_id, src, &mut buf);
        Bytes::from(buf)
    }
}
