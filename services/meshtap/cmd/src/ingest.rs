//! Turning decoded frames into stored records.

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use meshtap_proto::PortNum;
use meshtap_storage::{NodeRecord, PacketRecord, RecordSink};
use meshtap_wire::{
    decode_bridge_message, decode_capture_frame, AppData, CaptureFrame, ChannelKey, Link,
    MeshFrame,
};
use serde_json::{json, Value};
use std::time::Duration;

/// Counters reported when a run finishes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    /// Frames seen
    pub frames: u64,
    /// Frames carrying a mesh packet
    pub mesh: u64,
    /// Frames from other LoRa networks
    pub foreign: u64,
    /// Frames that failed to decode
    pub failed: u64,
    /// Mesh packets whose application body decoded
    pub apps_decoded: u64,
    /// Records newly stored
    pub stored: u64,
    /// Records already present
    pub duplicates: u64,
    /// Node identity updates
    pub nodes: u64,
}

/// Capture time as a UTC timestamp
pub fn capture_time(timestamp: Duration) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp.as_secs() as i64, timestamp.subsec_nanos())
        .single()
}

/// Record for a decoded mesh packet; `link` holds the layer(s) below it
fn mesh_record(timestamp: DateTime<Utc>, link: Value, frame: &MeshFrame) -> Result<PacketRecord> {
    let mut record = PacketRecord::new(timestamp);
    record.src = Some(frame.link.source().to_string());
    record.dst = Some(frame.link.destination().to_string());
    record.packet_id = Some(frame.link.packet_id());
    record.packet = Some(link);
    record.payload = Some(serde_json::to_value(&frame.payload)?);
    record.app_name = Some(frame.app_name());
    if let Ok(app) = &frame.app {
        record.app_data = Some(serde_json::to_value(&app.app_data)?);
    }
    Ok(record)
}

/// Node update carried by a node-identity packet
pub fn node_record(timestamp: DateTime<Utc>, frame: &MeshFrame) -> Option<NodeRecord> {
    if frame.payload.message_type != PortNum::NodeinfoApp as u32 {
        return None;
    }
    match &frame.app {
        Ok(app) => match &app.app_data {
            AppData::Structured(fields) => Some(NodeRecord {
                id: frame.link.source().to_string(),
                last_updated: timestamp,
                fields: fields.clone(),
            }),
            AppData::Text(_) => None,
        },
        Err(_) => None,
    }
}

/// Human-readable one-line summary of a mesh packet
pub fn describe(frame: &MeshFrame) -> String {
    let body = match &frame.app {
        Ok(app) => match &app.app_data {
            AppData::Text(text) => format!("{:?}", text),
            AppData::Structured(fields) => fields.to_string(),
        },
        Err(e) => format!("<{}; {} raw bytes>", e, frame.payload.inner.len()),
    };
    format!(
        "{} -> {} id=0x{:08x} hops={} {} {}",
        frame.link.source(),
        frame.link.destination(),
        frame.link.packet_id(),
        frame.link.flags().hop_start.saturating_sub(frame.link.flags().hop_limit),
        frame.app_name(),
        body
    )
}

/// Decodes frames with one channel key and stores the results
pub struct Ingest<'a> {
    sink: &'a dyn RecordSink,
    key: &'a ChannelKey,
    /// Counters so far
    pub stats: IngestStats,
}

impl<'a> Ingest<'a> {
    /// Create an ingester writing to `sink`
    pub fn new(sink: &'a dyn RecordSink, key: &'a ChannelKey) -> Self {
        Self {
            sink,
            key,
            stats: IngestStats::default(),
        }
    }

    async fn store(&mut self, record: PacketRecord, node: Option<NodeRecord>) -> Result<()> {
        if self.sink.insert_packet(record).await? {
            self.stats.stored += 1;
        } else {
            self.stats.duplicates += 1;
        }
        if let Some(node) = node {
            self.sink.upsert_node(node).await?;
            self.stats.nodes += 1;
        }
        Ok(())
    }

    /// Decode and store one captured frame, returning it with its record.
    ///
    /// A frame that fails to decode is counted and returned as an error for
    /// the caller to log; storage errors are returned the same way.
    pub async fn capture(
        &mut self,
        timestamp: Duration,
        data: &[u8],
    ) -> Result<(CaptureFrame, PacketRecord)> {
        self.stats.frames += 1;
        let timestamp = capture_time(timestamp)
            .ok_or_else(|| anyhow!("capture time {:?} out of range", timestamp))?;

        let frame = match decode_capture_frame(bytes::Bytes::copy_from_slice(data), self.key) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.failed += 1;
                return Err(e.into());
            }
        };

        let record = match &frame {
            CaptureFrame::Foreign { capture, .. } => {
                self.stats.foreign += 1;
                let mut record = PacketRecord::new(timestamp);
                record.packet = Some(json!({ "capture": capture }));
                self.store(record.clone(), None).await?;
                record
            }
            CaptureFrame::Mesh { capture, packet } => {
                self.stats.mesh += 1;
                if packet.app.is_ok() {
                    self.stats.apps_decoded += 1;
                }
                let header = match &packet.link {
                    Link::Radio(header) => serde_json::to_value(header)?,
                    Link::Bridge(envelope) => serde_json::to_value(envelope)?,
                };
                let link = json!({ "capture": capture, "header": header });
                let record = mesh_record(timestamp, link, packet)?;
                self.store(record.clone(), node_record(timestamp, packet)).await?;
                record
            }
        };
        Ok((frame, record))
    }

    /// Decode and store one bridge message received at `timestamp`
    pub async fn bridge(
        &mut self,
        timestamp: DateTime<Utc>,
        data: &[u8],
    ) -> Result<(MeshFrame, PacketRecord)> {
        self.stats.frames += 1;

        let frame = match decode_bridge_message(data, self.key) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.failed += 1;
                return Err(e.into());
            }
        };

        self.stats.mesh += 1;
        if frame.app.is_ok() {
            self.stats.apps_decoded += 1;
        }
        let envelope = match &frame.link {
            Link::Bridge(envelope) => serde_json::to_value(envelope)?,
            Link::Radio(header) => serde_json::to_value(header)?,
        };
        let record = mesh_record(timestamp, json!({ "envelope": envelope }), &frame)?;
        self.store(record.clone(), node_record(timestamp, &frame)).await?;
        Ok((frame, record))
    }
}
