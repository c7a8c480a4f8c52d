//! In-memory record sink

use crate::{NodeRecord, PacketRecord, RecordSink, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// In-memory sink; also the index behind [`crate::FileSink`]
#[derive(Clone, Default)]
pub struct MemorySink {
    /// Packets by capture time
    packets: Arc<DashMap<DateTime<Utc>, PacketRecord>>,
    /// Nodes by id
    nodes: Arc<DashMap<String, NodeRecord>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a packet unless its timestamp is taken
    pub(crate) fn insert_packet_sync(&self, record: PacketRecord) -> bool {
        match self.packets.entry(record.timestamp) {
            Entry::Occupied(_) => {
                debug!(timestamp = %record.timestamp, "packet already stored, ignoring");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Whether a packet with this timestamp is stored
    pub(crate) fn contains_packet(&self, timestamp: &DateTime<Utc>) -> bool {
        self.packets.contains_key(timestamp)
    }

    /// Insert or replace a node
    pub(crate) fn upsert_node_sync(&self, node: NodeRecord) {
        debug!(id = %node.id, "upsert node");
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn packets_sorted(&self) -> Vec<PacketRecord> {
        let mut packets: Vec<_> = self.packets.iter().map(|e| e.value().clone()).collect();
        packets.sort_by_key(|p| p.timestamp);
        packets
    }

    pub(crate) fn nodes_sorted(&self) -> Vec<NodeRecord> {
        let mut nodes: Vec<_> = self.nodes.iter().map(|e| e.value().clone()).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert_packet(&self, record: PacketRecord) -> Result<bool, StorageError> {
        Ok(self.insert_packet_sync(record))
    }

    async fn upsert_node(&self, node: NodeRecord) -> Result<(), StorageError> {
        self.upsert_node_sync(node);
        Ok(())
    }

    async fn packets(&self) -> Result<Vec<PacketRecord>, StorageError> {
        Ok(self.packets_sorted())
    }

    async fn node(&self, id: &str) -> Result<Option<NodeRecord>, StorageError> {
        Ok(self.nodes.get(id).map(|n| n.value().clone()))
    }

    async fn nodes(&self) -> Result<Vec<NodeRecord>, StorageError> {
        Ok(self.nodes_sorted())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
