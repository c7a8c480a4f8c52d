//! Bridge transport envelope.

use crate::mesh::MeshPacket;

/// Outer message published by a gateway relaying a mesh packet over a
/// store-and-forward bridge
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceEnvelope {
    /// The relayed packet, normally still encrypted
    #[prost(message, optional, tag = "1")]
    pub packet: Option<MeshPacket>,
    /// Channel name the packet was heard on
    #[prost(string, tag = "2")]
    pub channel_id: String,
    /// Gateway node id in `!<hex>` notation
    #[prost(string, tag = "3")]
    pub gateway_id: String,
}
