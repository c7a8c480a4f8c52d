//! Telemetry application payloads.

use crate::mapping::is_default;
use serde::{Deserialize, Serialize};

/// Telemetry report; exactly one metrics variant is normally present
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Telemetry {
    /// Report time (seconds since epoch)
    #[prost(fixed32, tag = "1")]
    #[serde(skip_serializing_if = "is_default")]
    pub time: u32,
    /// Metrics carried by this report
    #[prost(oneof = "telemetry::Variant", tags = "2, 3, 5, 6")]
    #[serde(flatten)]
    pub variant: Option<telemetry::Variant>,
}

/// Nested message and enum types in `Telemetry`.
pub mod telemetry {
    use serde::{Deserialize, Serialize};

    /// Metrics variants; rendered as a single `<variantName>: {..}` entry
    #[derive(Clone, PartialEq, ::prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Variant {
        /// Battery and airtime
        #[prost(message, tag = "2")]
        DeviceMetrics(super::DeviceMetrics),
        /// Environment sensors
        #[prost(message, tag = "3")]
        EnvironmentMetrics(super::EnvironmentMetrics),
        /// Power monitor channels
        #[prost(message, tag = "5")]
        PowerMetrics(super::PowerMetrics),
        /// Local mesh statistics
        #[prost(message, tag = "6")]
        LocalStats(super::LocalStats),
    }
}

/// Device health metrics
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceMetrics {
    /// Battery level in percent (101 when powered)
    #[prost(uint32, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u32>,
    /// Battery voltage
    #[prost(float, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f32>,
    /// Channel utilization in percent
    #[prost(float, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_utilization: Option<f32>,
    /// Transmit airtime in percent over the last hour
    #[prost(float, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_util_tx: Option<f32>,
    /// Seconds since boot
    #[prost(uint32, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u32>,
}

/// Environment sensor readings
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentMetrics {
    /// Temperature in Celsius
    #[prost(float, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Relative humidity in percent
    #[prost(float, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<f32>,
    /// Barometric pressure in hPa
    #[prost(float, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barometric_pressure: Option<f32>,
    /// Gas resistance in MOhm
    #[prost(float, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_resistance: Option<f32>,
    /// Supply voltage
    #[prost(float, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f32>,
    /// Supply current
    #[prost(float, optional, tag = "6")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f32>,
    /// Indoor air quality index
    #[prost(uint32, optional, tag = "7")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iaq: Option<u32>,
}

/// Power monitor readings
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerMetrics {
    /// Channel 1 voltage
    #[prost(float, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch1_voltage: Option<f32>,
    /// Channel 1 current
    #[prost(float, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch1_current: Option<f32>,
    /// Channel 2 voltage
    #[prost(float, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch2_voltage: Option<f32>,
    /// Channel 2 current
    #[prost(float, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch2_current: Option<f32>,
    /// Channel 3 voltage
    #[prost(float, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch3_voltage: Option<f32>,
    /// Channel 3 current
    #[prost(float, optional, tag = "6")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch3_current: Option<f32>,
}

/// Statistics a node keeps about its local mesh
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalStats {
    /// Seconds since boot
    #[prost(uint32, tag = "1")]
    #[serde(skip_serializing_if = "is_default")]
    pub uptime_seconds: u32,
    /// Channel utilization in percent
    #[prost(float, tag = "2")]
    #[serde(skip_serializing_if = "is_default")]
    pub channel_utilization: f32,
    /// Transmit airtime in percent
    #[prost(float, tag = "3")]
    #[serde(skip_serializing_if = "is_default")]
    pub air_util_tx: f32,
    /// Packets sent
    #[prost(uint32, tag = "4")]
    #[serde(skip_serializing_if = "is_default")]
    pub num_packets_tx: u32,
    /// Packets received
    #[prost(uint32, tag = "5")]
    #[serde(skip_serializing_if = "is_default")]
    pub num_packets_rx: u32,
    /// Packets received with a bad CRC
    #[prost(uint32, tag = "6")]
    #[serde(skip_serializing_if = "is_default")]
    pub num_packets_rx_bad: u32,
    /// Nodes heard recently
    #[prost(uint32, tag = "7")]
    #[serde(skip_serializing_if = "is_default")]
    pub num_online_nodes: u32,
    /// Nodes in the node database
    #[prost(uint32, tag = "8")]
    #[serde(skip_serializing_if = "is_default")]
    pub num_total_nodes: u32,
}
