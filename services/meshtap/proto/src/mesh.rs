//! Core mesh messages: the over-the-air packet, the application-data
//! envelope and the node identity, position and traceroute payloads.

use crate::mapping::{base64_bytes, enum_name, is_default};
use serde::{Deserialize, Serialize};

/// A packet as carried over a bridge; radio frames carry the same fields in
/// a fixed binary header instead.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeshPacket {
    /// Sending node
    #[prost(fixed32, tag = "1")]
    pub from: u32,
    /// Destination node (0xFFFFFFFF for broadcast)
    #[prost(fixed32, tag = "2")]
    pub to: u32,
    /// Channel index or hash
    #[prost(uint32, tag = "3")]
    pub channel: u32,
    /// Packet id, unique per sender
    #[prost(fixed32, tag = "6")]
    pub id: u32,
    /// Receive time (seconds since epoch) stamped by the gateway
    #[prost(fixed32, tag = "7")]
    pub rx_time: u32,
    /// Receive SNR stamped by the gateway
    #[prost(float, tag = "8")]
    pub rx_snr: f32,
    /// Remaining hops
    #[prost(uint32, tag = "9")]
    pub hop_limit: u32,
    /// Sender requested an acknowledgement
    #[prost(bool, tag = "10")]
    pub want_ack: bool,
    /// Receive RSSI stamped by the gateway
    #[prost(int32, tag = "12")]
    pub rx_rssi: i32,
    /// Packet has travelled over a bridge
    #[prost(bool, tag = "14")]
    pub via_mqtt: bool,
    /// Hop limit the packet started with
    #[prost(uint32, tag = "15")]
    pub hop_start: u32,
    /// Low byte of the next-hop node
    #[prost(uint32, tag = "18")]
    pub next_hop: u32,
    /// Low byte of the relaying node
    #[prost(uint32, tag = "19")]
    pub relay_node: u32,
    /// Decoded or encrypted payload
    #[prost(oneof = "mesh_packet::PayloadVariant", tags = "4, 5")]
    pub payload_variant: Option<mesh_packet::PayloadVariant>,
}

/// Nested message and enum types in `MeshPacket`.
pub mod mesh_packet {
    /// Payload carried by a [`super::MeshPacket`]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        /// Plaintext application data
        #[prost(message, tag = "4")]
        Decoded(super::Data),
        /// Ciphertext of an encoded [`super::Data`]
        #[prost(bytes, tag = "5")]
        Encrypted(Vec<u8>),
    }
}

/// Application-data envelope recovered from a decrypted payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Data {
    /// Message-type id selecting how `payload` is interpreted
    #[prost(enumeration = "crate::PortNum", tag = "1")]
    pub portnum: i32,
    /// Application body
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    /// Sender wants an application-level response
    #[prost(bool, tag = "3")]
    pub want_response: bool,
    /// Final destination when relayed
    #[prost(fixed32, tag = "4")]
    pub dest: u32,
    /// Original source when relayed
    #[prost(fixed32, tag = "5")]
    pub source: u32,
    /// Packet id this message answers
    #[prost(fixed32, tag = "6")]
    pub request_id: u32,
    /// Packet id this message replies to
    #[prost(fixed32, tag = "7")]
    pub reply_id: u32,
    /// Emoji reaction codepoint
    #[prost(fixed32, tag = "8")]
    pub emoji: u32,
    /// Extra flag bits
    #[prost(uint32, optional, tag = "9")]
    pub bitfield: Option<u32>,
}

proto_enum! {
    /// Device role advertised in node identity
    pub enum Role {
        /// Regular client
        Client = 0 => "CLIENT",
        /// Client that does not forward
        ClientMute = 1 => "CLIENT_MUTE",
        /// Infrastructure router
        Router = 2 => "ROUTER",
        /// Router that is also a client
        RouterClient = 3 => "ROUTER_CLIENT",
        /// Repeater
        Repeater = 4 => "REPEATER",
        /// Position tracker
        Tracker = 5 => "TRACKER",
        /// Sensor
        Sensor = 6 => "SENSOR",
        /// TAK integration
        Tak = 7 => "TAK",
        /// Hidden client
        ClientHidden = 8 => "CLIENT_HIDDEN",
        /// Lost-and-found beacon
        LostAndFound = 9 => "LOST_AND_FOUND",
        /// TAK tracker
        TakTracker = 10 => "TAK_TRACKER",
        /// Late-rebroadcasting router
        RouterLate = 11 => "ROUTER_LATE",
    }
}

proto_enum! {
    /// Hardware model advertised in node identity
    #[allow(missing_docs)]
    pub enum HardwareModel {
        Unset = 0 => "UNSET",
        TloraV2 = 1 => "TLORA_V2",
        TloraV1 = 2 => "TLORA_V1",
        TloraV211p6 = 3 => "TLORA_V2_1_1P6",
        Tbeam = 4 => "TBEAM",
        HeltecV20 = 5 => "HELTEC_V2_0",
        TbeamV0p7 = 6 => "TBEAM_V0P7",
        TEcho = 7 => "T_ECHO",
        TloraV11p3 = 8 => "TLORA_V1_1P3",
        Rak4631 = 9 => "RAK4631",
        HeltecV21 = 10 => "HELTEC_V2_1",
        HeltecV1 = 11 => "HELTEC_V1",
        LilygoTbeamS3Core = 12 => "LILYGO_TBEAM_S3_CORE",
        Rak11200 = 13 => "RAK11200",
        NanoG1 = 14 => "NANO_G1",
        TloraV211p8 = 15 => "TLORA_V2_1_1P8",
        TloraT3S3 = 16 => "TLORA_T3_S3",
        NanoG1Explorer = 17 => "NANO_G1_EXPLORER",
        NanoG2Ultra = 18 => "NANO_G2_ULTRA",
        LoraType = 19 => "LORA_TYPE",
        Wiphone = 20 => "WIPHONE",
        WioWm1110 = 21 => "WIO_WM1110",
        Rak2560 = 22 => "RAK2560",
        HeltecHru3601 = 23 => "HELTEC_HRU_3601",
        HeltecWirelessBridge = 24 => "HELTEC_WIRELESS_BRIDGE",
        StationG1 = 25 => "STATION_G1",
        Rak11310 = 26 => "RAK11310",
        SenseloraRp2040 = 27 => "SENSELORA_RP2040",
        SenseloraS3 = 28 => "SENSELORA_S3",
        Canaryone = 29 => "CANARYONE",
        Rp2040Lora = 30 => "RP2040_LORA",
        StationG2 = 31 => "STATION_G2",
        LoraRelayV1 = 32 => "LORA_RELAY_V1",
        Nrf52840dk = 33 => "NRF52840DK",
        Ppr = 34 => "PPR",
        Genieblocks = 35 => "GENIEBLOCKS",
        Nrf52Unknown = 36 => "NRF52_UNKNOWN",
        Portduino = 37 => "PORTDUINO",
        AndroidSim = 38 => "ANDROID_SIM",
        DiyV1 = 39 => "DIY_V1",
        Nrf52840Pca10059 = 40 => "NRF52840_PCA10059",
        DrDev = 41 => "DR_DEV",
        M5stack = 42 => "M5STACK",
        HeltecV3 = 43 => "HELTEC_V3",
        HeltecWslV3 = 44 => "HELTEC_WSL_V3",
        Betafpv2400Tx = 45 => "BETAFPV_2400_TX",
        Betafpv900NanoTx = 46 => "BETAFPV_900_NANO_TX",
        RpiPico = 47 => "RPI_PICO",
        HeltecWirelessTracker = 48 => "HELTEC_WIRELESS_TRACKER",
        HeltecWirelessPaper = 49 => "HELTEC_WIRELESS_PAPER",
        TDeck = 50 => "T_DECK",
        TWatchS3 = 51 => "T_WATCH_S3",
        PicomputerS3 = 52 => "PICOMPUTER_S3",
        HeltecHt62 = 53 => "HELTEC_HT62",
        EbyteEsp32S3 = 54 => "EBYTE_ESP32_S3",
        Esp32S3Pico = 55 => "ESP32_S3_PICO",
        Chatter2 = 56 => "CHATTER_2",
        HeltecWirelessPaperV10 = 57 => "HELTEC_WIRELESS_PAPER_V1_0",
        HeltecWirelessTrackerV10 = 58 => "HELTEC_WIRELESS_TRACKER_V1_0",
        Unphone = 59 => "UNPHONE",
        TdLorac = 60 => "TD_LORAC",
        CdebyteEoraS3 = 61 => "CDEBYTE_EORA_S3",
        TwcMeshV4 = 62 => "TWC_MESH_V4",
        Nrf52PromicroDiy = 63 => "NRF52_PROMICRO_DIY",
        Radiomaster900BanditNano = 64 => "RADIOMASTER_900_BANDIT_NANO",
        HeltecCapsuleSensorV3 = 65 => "HELTEC_CAPSULE_SENSOR_V3",
        HeltecVisionMasterT190 = 66 => "HELTEC_VISION_MASTER_T190",
        HeltecVisionMasterE213 = 67 => "HELTEC_VISION_MASTER_E213",
        HeltecVisionMasterE290 = 68 => "HELTEC_VISION_MASTER_E290",
        HeltecMeshNodeT114 = 69 => "HELTEC_MESH_NODE_T114",
        SensecapIndicator = 70 => "SENSECAP_INDICATOR",
        TrackerT1000E = 71 => "TRACKER_T1000_E",
        PrivateHw = 255 => "PRIVATE_HW",
    }
}

/// Node identity broadcast (node-info application)
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Node id in `!<hex>` notation
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "is_default")]
    pub id: String,
    /// Full display name
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "is_default")]
    pub long_name: String,
    /// Short (up to 4 character) name
    #[prost(string, tag = "3")]
    #[serde(skip_serializing_if = "is_default")]
    pub short_name: String,
    /// Hardware MAC address
    #[prost(bytes = "vec", tag = "4")]
    #[serde(skip_serializing_if = "Vec::is_empty", with = "base64_bytes")]
    pub macaddr: Vec<u8>,
    /// Hardware model
    #[prost(enumeration = "HardwareModel", tag = "5")]
    #[serde(
        skip_serializing_if = "is_default",
        serialize_with = "enum_name::serialize::<HardwareModel, _>",
        deserialize_with = "enum_name::deserialize::<HardwareModel, _>"
    )]
    pub hw_model: i32,
    /// Licensed amateur radio operator
    #[prost(bool, tag = "6")]
    #[serde(skip_serializing_if = "is_default")]
    pub is_licensed: bool,
    /// Device role
    #[prost(enumeration = "Role", tag = "7")]
    #[serde(
        skip_serializing_if = "is_default",
        serialize_with = "enum_name::serialize::<Role, _>",
        deserialize_with = "enum_name::deserialize::<Role, _>"
    )]
    pub role: i32,
    /// Public key for direct messages
    #[prost(bytes = "vec", tag = "8")]
    #[serde(skip_serializing_if = "Vec::is_empty", with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Node does not accept direct messages
    #[prost(bool, optional, tag = "9")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unmessagable: Option<bool>,
}

proto_enum! {
    /// How a position fix was obtained
    pub enum LocSource {
        /// Not set
        LocUnset = 0 => "LOC_UNSET",
        /// Entered manually
        LocManual = 1 => "LOC_MANUAL",
        /// Onboard GPS
        LocInternal = 2 => "LOC_INTERNAL",
        /// External GPS
        LocExternal = 3 => "LOC_EXTERNAL",
    }
}

/// Position report (position application)
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    /// Latitude in 1e-7 degrees
    #[prost(sfixed32, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude_i: Option<i32>,
    /// Longitude in 1e-7 degrees
    #[prost(sfixed32, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude_i: Option<i32>,
    /// Altitude above mean sea level in metres
    #[prost(int32, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<i32>,
    /// Fix time (seconds since epoch)
    #[prost(fixed32, tag = "4")]
    #[serde(skip_serializing_if = "is_default")]
    pub time: u32,
    /// Source of the fix
    #[prost(enumeration = "LocSource", tag = "5")]
    #[serde(
        skip_serializing_if = "is_default",
        serialize_with = "enum_name::serialize::<LocSource, _>",
        deserialize_with = "enum_name::deserialize::<LocSource, _>"
    )]
    pub location_source: i32,
    /// GPS timestamp (seconds since epoch)
    #[prost(fixed32, tag = "7")]
    #[serde(skip_serializing_if = "is_default")]
    pub timestamp: u32,
    /// Horizontal accuracy in millimetres
    #[prost(uint32, tag = "14")]
    #[serde(skip_serializing_if = "is_default")]
    pub gps_accuracy: u32,
    /// Ground speed in m/s
    #[prost(uint32, optional, tag = "15")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_speed: Option<u32>,
    /// Ground track in 1e-5 degrees
    #[prost(uint32, optional, tag = "16")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_track: Option<u32>,
    /// Satellites in view
    #[prost(uint32, tag = "19")]
    #[serde(skip_serializing_if = "is_default")]
    pub sats_in_view: u32,
    /// Sequence number of this report
    #[prost(uint32, tag = "22")]
    #[serde(skip_serializing_if = "is_default")]
    pub seq_number: u32,
    /// Bits of precision kept in the coordinates
    #[prost(uint32, tag = "23")]
    #[serde(skip_serializing_if = "is_default")]
    pub precision_bits: u32,
}

/// Traceroute result (traceroute application)
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteDiscovery {
    /// Nodes traversed towards the destination
    #[prost(fixed32, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<u32>,
    /// SNR (dB * 4) of each hop towards the destination
    #[prost(int32, repeated, tag = "2")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snr_towards: Vec<i32>,
    /// Nodes traversed on the way back
    #[prost(fixed32, repeated, tag = "3")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub route_back: Vec<u32>,
    /// SNR (dB * 4) of each hop on the way back
    #[prost(int32, repeated, tag = "4")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snr_back: Vec<i32>,
}
