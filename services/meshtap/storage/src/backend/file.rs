//! File-based record sink
//!
//! Layout under the data directory:
//!
//! ```text
//! packets.jsonl   one PacketRecord per line, append-only
//! nodes.json      snapshot of all NodeRecords, rewritten on upsert
//! ```

use crate::backend::mem::MemorySink;
use crate::{NodeRecord, PacketRecord, RecordSink, StorageError};
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

const PACKETS_FILE: &str = "packets.jsonl";
const NODES_FILE: &str = "nodes.json";

/// File-backed sink with an in-memory index
pub struct FileSink {
    data_dir: PathBuf,
    index: MemorySink,
    /// Append handle for the packet log
    packets: Mutex<File>,
    /// Serializes node snapshot rewrites
    nodes_lock: Mutex<()>,
}

impl FileSink {
    /// Open (or create) a sink under `data_dir`, loading existing records
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let index = MemorySink::new();
        let loaded_packets = load_packets(&data_dir.join(PACKETS_FILE), &index)?;
        let loaded_nodes = load_nodes(&data_dir.join(NODES_FILE), &index)?;
        info!(
            "Opened record store at {} ({} packets, {} nodes)",
            data_dir.display(),
            loaded_packets,
            loaded_nodes
        );

        let mut packets = OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(PACKETS_FILE))?;
        if ends_mid_line(&data_dir.join(PACKETS_FILE))? {
            packets.write_all(b"\n")?;
        }

        Ok(Self {
            data_dir,
            index,
            packets: Mutex::new(packets),
            nodes_lock: Mutex::new(()),
        })
    }

    fn save_nodes(&self) -> Result<(), StorageError> {
        let _guard = self
            .nodes_lock
            .lock()
            .map_err(|_| StorageError::Backend("node snapshot lock poisoned".to_string()))?;

        let content = serde_json::to_string_pretty(&self.index.nodes_sorted())?;
        let tmp = self.data_dir.join(format!("{}.tmp", NODES_FILE));
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, self.data_dir.join(NODES_FILE))?;
        Ok(())
    }
}

fn load_packets(path: &Path, index: &MemorySink) -> Result<usize, StorageError> {
    if !path.exists() {
        return Ok(0);
    }

    let mut loaded = 0;
    for (line_no, line) in BufReader::new(File::open(path)?).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<PacketRecord>(&line) {
            Ok(record) => {
                if index.insert_packet_sync(record) {
                    loaded += 1;
                }
            }
            // a crash mid-append leaves at most one partial line
            Err(e) => warn!("Skipping unreadable packet record at line {}: {}", line_no + 1, e),
        }
    }
    Ok(loaded)
}

fn ends_mid_line(path: &Path) -> Result<bool, StorageError> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn load_nodes(path: &Path, index: &MemorySink) -> Result<usize, StorageError> {
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let nodes: Vec<NodeRecord> = serde_json::from_str(&content).map_err(|e| {
        StorageError::Corruption(format!("Invalid node snapshot {}: {}", path.display(), e))
    })?;

    let count = nodes.len();
    for node in nodes {
        index.upsert_node_sync(node);
    }
    Ok(count)
}

#[async_trait]
impl RecordSink for FileSink {
    async fn insert_packet(&self, record: PacketRecord) -> Result<bool, StorageError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        // held across check, append and index update
        let mut file = self
            .packets
            .lock()
            .map_err(|_| StorageError::Backend("packet log lock poisoned".to_string()))?;
        if self.index.contains_packet(&record.timestamp) {
            debug!(timestamp = %record.timestamp, "packet already stored, ignoring");
            return Ok(false);
        }

        file.write_all(line.as_bytes())?;
        self.index.insert_packet_sync(record);
        debug!("Appended packet record ({} bytes)", line.len());
        Ok(true)
    }

    async fn upsert_node(&self, node: NodeRecord) -> Result<(), StorageError> {
        self.index.upsert_node_sync(node);
        self.save_nodes()
    }

    async fn packets(&self) -> Result<Vec<PacketRecord>, StorageError> {
        Ok(self.index.packets_sorted())
    }

    async fn node(&self, id: &str) -> Result<Option<NodeRecord>, StorageError> {
        self.index.node(id).await
    }

    async fn nodes(&self) -> Result<Vec<NodeRecord>, StorageError> {
        Ok(self.index.nodes_sorted())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let file = self
            .packets
            .lock()
            .map_err(|_| StorageError::Backend("packet log lock poisoned".to_string()))?;
        file.sync_data()?;
        Ok(())
    }
}
