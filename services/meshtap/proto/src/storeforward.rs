//! Store-and-forward control payloads.

use crate::mapping::{enum_name, is_default};
use serde::{Deserialize, Serialize};

proto_enum! {
    /// Store-and-forward request/response code
    #[allow(missing_docs)]
    pub enum RequestResponse {
        Unset = 0 => "UNSET",
        RouterError = 1 => "ROUTER_ERROR",
        RouterHeartbeat = 2 => "ROUTER_HEARTBEAT",
        RouterPing = 3 => "ROUTER_PING",
        RouterPong = 4 => "ROUTER_PONG",
        RouterBusy = 5 => "ROUTER_BUSY",
        RouterHistory = 6 => "ROUTER_HISTORY",
        RouterStats = 7 => "ROUTER_STATS",
        RouterTextDirect = 8 => "ROUTER_TEXT_DIRECT",
        RouterTextBroadcast = 9 => "ROUTER_TEXT_BROADCAST",
        ClientError = 64 => "CLIENT_ERROR",
        ClientHistory = 65 => "CLIENT_HISTORY",
        ClientStats = 66 => "CLIENT_STATS",
        ClientPing = 67 => "CLIENT_PING",
        ClientPong = 68 => "CLIENT_PONG",
        ClientAbort = 106 => "CLIENT_ABORT",
    }
}

/// Store-and-forward control message
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreAndForward {
    /// Request or response code
    #[prost(enumeration = "RequestResponse", tag = "1")]
    #[serde(
        skip_serializing_if = "is_default",
        serialize_with = "enum_name::serialize::<RequestResponse, _>",
        deserialize_with = "enum_name::deserialize::<RequestResponse, _>"
    )]
    pub rr: i32,
    /// Body matching `rr`
    #[prost(oneof = "store_and_forward::Variant", tags = "2, 3, 4, 5")]
    #[serde(flatten)]
    pub variant: Option<store_and_forward::Variant>,
}

/// Nested message and enum types in `StoreAndForward`.
pub mod store_and_forward {
    use serde::{Deserialize, Serialize};

    /// Store-and-forward bodies
    #[derive(Clone, PartialEq, ::prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Variant {
        /// Router statistics
        #[prost(message, tag = "2")]
        Stats(super::Statistics),
        /// History replay announcement
        #[prost(message, tag = "3")]
        History(super::History),
        /// Router heartbeat
        #[prost(message, tag = "4")]
        Heartbeat(super::Heartbeat),
        /// Replayed text message
        #[prost(bytes, tag = "5")]
        Text(#[serde(with = "crate::mapping::base64_bytes")] Vec<u8>),
    }
}

/// Router statistics
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    /// Messages stored
    #[prost(uint32, tag = "1")]
    #[serde(skip_serializing_if = "is_default")]
    pub messages_total: u32,
    /// Messages saved to persistent storage
    #[prost(uint32, tag = "2")]
    #[serde(skip_serializing_if = "is_default")]
    pub messages_saved: u32,
    /// Capacity
    #[prost(uint32, tag = "3")]
    #[serde(skip_serializing_if = "is_default")]
    pub messages_max: u32,
    /// Router uptime in seconds
    #[prost(uint32, tag = "4")]
    #[serde(skip_serializing_if = "is_default")]
    pub up_time: u32,
    /// Requests served
    #[prost(uint32, tag = "5")]
    #[serde(skip_serializing_if = "is_default")]
    pub requests: u32,
    /// History requests served
    #[prost(uint32, tag = "6")]
    #[serde(skip_serializing_if = "is_default")]
    pub requests_history: u32,
    /// Heartbeat enabled
    #[prost(bool, tag = "7")]
    #[serde(skip_serializing_if = "is_default")]
    pub heartbeat: bool,
    /// Maximum messages returned per request
    #[prost(uint32, tag = "8")]
    #[serde(skip_serializing_if = "is_default")]
    pub return_max: u32,
    /// Lookback window in minutes
    #[prost(uint32, tag = "9")]
    #[serde(skip_serializing_if = "is_default")]
    pub return_window: u32,
}

/// History replay announcement
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct History {
    /// Messages about to be replayed
    #[prost(uint32, tag = "1")]
    #[serde(skip_serializing_if = "is_default")]
    pub history_messages: u32,
    /// Window covered in milliseconds
    #[prost(uint32, tag = "2")]
    #[serde(skip_serializing_if = "is_default")]
    pub window: u32,
    /// Index of the last request
    #[prost(uint32, tag = "3")]
    #[serde(skip_serializing_if = "is_default")]
    pub last_request: u32,
}

/// Router heartbeat
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Heartbeat {
    /// Heartbeat period in seconds
    #[prost(uint32, tag = "1")]
    #[serde(skip_serializing_if = "is_default")]
    pub period: u32,
    /// Router is a secondary
    #[prost(uint32, tag = "2")]
    #[serde(skip_serializing_if = "is_default")]
    pub secondary: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heartbeat_mapping() {
        let message = StoreAndForward {
            rr: RequestResponse::RouterHeartbeat as i32,
            variant: Some(store_and_forward::Variant::Heartbeat(Heartbeat {
                period: 900,
                secondary: 0,
            })),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({ "rr": "ROUTER_HEARTBEAT", "heartbeat": { "period": 900 } })
        );
    }

    #[test]
    fn test_text_variant_is_base64() {
        let message = StoreAndForward {
            rr: RequestResponse::RouterTextBroadcast as i32,
            variant: Some(store_and_forward::Variant::Text(b"hey".to_vec())),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({ "rr": "ROUTER_TEXT_BROADCAST", "text": "aGV5" }));

        let back: StoreAndForward = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }
}
