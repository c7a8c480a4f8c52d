//! Decoded record storage for meshtap.
//!
//! Every decoded frame becomes a [`PacketRecord`] keyed by its capture time;
//! node-identity broadcasts additionally maintain a [`NodeRecord`] per node.
//! Packets are insert-or-ignore (replaying the same capture twice is
//! harmless), nodes are replace-on-conflict (the latest broadcast wins).
//! Backends are pluggable behind [`RecordSink`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be read back
    #[error("Data corruption: {0}")]
    Corruption(String),
    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One decoded frame.
///
/// Layers that did not decode leave their fields empty, so a frame with an
/// unsupported application body still records its addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Capture time; unique per record
    pub timestamp: DateTime<Utc>,
    /// Source node in `!<hex>` notation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Destination node in `!<hex>` notation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,
    /// Packet id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_id: Option<u32>,
    /// Header fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet: Option<Value>,
    /// Payload envelope fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Canonical application name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Application body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<Value>,
}

impl PacketRecord {
    /// Empty record for a frame captured at `timestamp`
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            src: None,
            dst: None,
            packet_id: None,
            packet: None,
            payload: None,
            app_name: None,
            app_data: None,
        }
    }
}

/// Latest identity broadcast by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id in `!<hex>` notation
    pub id: String,
    /// Capture time of the broadcast
    pub last_updated: DateTime<Utc>,
    /// Identity fields as broadcast
    pub fields: Value,
}

/// Destination for decoded records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store a packet; returns false when a record with the same timestamp
    /// already exists (the existing record is kept)
    async fn insert_packet(&self, record: PacketRecord) -> Result<bool, StorageError>;

    /// Store a node, replacing any existing record for the same id
    async fn upsert_node(&self, node: NodeRecord) -> Result<(), StorageError>;

    /// All packets ordered by timestamp
    async fn packets(&self) -> Result<Vec<PacketRecord>, StorageError>;

    /// Node by id
    async fn node(&self, id: &str) -> Result<Option<NodeRecord>, StorageError>;

    /// All nodes ordered by id
    async fn nodes(&self) -> Result<Vec<NodeRecord>, StorageError>;

    /// Make stored records durable
    async fn flush(&self) -> Result<(), StorageError>;
}

/// Storage backend configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StorageMode {
    /// In-memory storage, lost on exit
    #[default]
    InMemory,
    /// JSON files under a data directory
    File {
        /// Data directory path
        data_dir: PathBuf,
    },
}

// Re-export backend implementations
pub use backend::file::FileSink;
pub use backend::mem::MemorySink;

/// Open a sink for the given mode
pub async fn open_sink(mode: StorageMode) -> Result<Box<dyn RecordSink>, StorageError> {
    match mode {
        StorageMode::InMemory => Ok(Box::new(MemorySink::new())),
        StorageMode::File { data_dir } => Ok(Box::new(FileSink::open(data_dir).await?)),
    }
}
