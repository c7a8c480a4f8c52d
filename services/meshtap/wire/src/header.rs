//! Mesh packet header processing.
//!
//! Every radio frame carrying a mesh packet starts with this 16-byte header.
//! It is never encrypted, so addressing and hop information are available
//! without the channel key.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mesh header size in bytes
pub const MESH_HEADER_SIZE: usize = 16;

/// Node address meaning "every node"
pub const BROADCAST_ADDR: u32 = 0xFFFF_FFFF;

const HOP_LIMIT_MASK: u8 = 0x07;
const WANT_ACK_SHIFT: u8 = 3;
const VIA_MQTT_SHIFT: u8 = 4;
const HOP_START_SHIFT: u8 = 5;

/// Node identifier, shown as `!<hex>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Whether this is the broadcast address
    pub fn is_broadcast(self) -> bool {
        self.0 == BROADCAST_ADDR
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{:x}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

/// Flag byte components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketFlags {
    /// Hops remaining (0..7)
    pub hop_limit: u8,
    /// Sender wants an acknowledgement
    pub want_ack: bool,
    /// Packet has travelled over a bridge
    pub via_mqtt: bool,
    /// Hop limit the packet started with (0..7)
    pub hop_start: u8,
}

impl PacketFlags {
    /// Create flags with the given components
    pub fn new(hop_limit: u8, want_ack: bool, via_mqtt: bool, hop_start: u8) -> Self {
        Self {
            hop_limit: hop_limit & HOP_LIMIT_MASK,
            want_ack,
            via_mqtt,
            hop_start: hop_start & HOP_LIMIT_MASK,
        }
    }

    /// Pack flags into the wire byte
    pub fn pack(self) -> u8 {
        (self.hop_limit & HOP_LIMIT_MASK)
            | ((self.want_ack as u8) << WANT_ACK_SHIFT)
            | ((self.via_mqtt as u8) << VIA_MQTT_SHIFT)
            | ((self.hop_start & HOP_LIMIT_MASK) << HOP_START_SHIFT)
    }

    /// Unpack flags from the wire byte
    pub fn unpack(value: u8) -> Self {
        Self {
            hop_limit: value & HOP_LIMIT_MASK,
            want_ack: (value >> WANT_ACK_SHIFT) & 0x01 == 1,
            via_mqtt: (value >> VIA_MQTT_SHIFT) & 0x01 == 1,
            hop_start: (value >> HOP_START_SHIFT) & HOP_LIMIT_MASK,
        }
    }
}

/// Mesh packet header (16 bytes, little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshHeader {
    /// Destination node
    pub dst: u32,
    /// Source node
    pub src: u32,
    /// Packet id, unique per source
    pub packet_id: u32,
    /// Hop and routing flags
    pub flags: PacketFlags,
    /// Hash of the channel the packet was sent on
    pub channel_hash: u8,
    /// Low byte of the next-hop node
    pub next_hop: u8,
    /// Low byte of the relaying node
    pub relay_node: u8,
}

impl MeshHeader {
    /// Create a header with default flags
    pub fn new(src: u32, dst: u32, packet_id: u32) -> Self {
        Self {
            dst,
            src,
            packet_id,
            flags: PacketFlags::new(3, false, false, 3),
            channel_hash: 0,
            next_hop: 0,
            relay_node: 0,
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

    /// Hops already taken
    pub fn hops_taken(&self) -> u8 {
        self.flags.hop_start.saturating_sub(self.flags.hop_limit)
    }

    /// Encode the header to bytes
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.dst);
        buf.put_u32_le(self.src);
        buf.put_u32_le(self.packet_id);
        buf.put_u8(self.flags.pack());
        buf.put_u8(self.channel_hash);
        buf.put_u8(self.next_hop);
        buf.put_u8(self.relay_node);
    }

    /// Decode the header from bytes, leaving the ciphertext in `buf`
    pub fn decode(buf: &mut Bytes) -> Result<Self, crate::WireError> {
        if buf.len() < MESH_HEADER_SIZE {
            return Err(crate::WireError::MalformedHeader {
                layer: "mesh",
                needed: MESH_HEADER_SIZE,
                available: buf.len(),
            });
        }

        Ok(Self {
            dst: buf.get_u32_le(),
            src: buf.get_u32_le(),
            packet_id: buf.get_u32_le(),
            flags: PacketFlags::unpack(buf.get_u8()),
            channel_hash: buf.get_u8(),
            next_hop: buf.get_u8(),
            relay_node: buf.get_u8(),
        })
    }
}
