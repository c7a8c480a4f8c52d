//! Application payload dispatch.
//!
//! The message type selects how the inner payload bytes are read: type 1 is
//! UTF-8 text, a fixed set of others are schema messages surfaced as a
//! generic field-name to value mapping. The table below is the whole set;
//! anything else is reported as unsupported.

use meshtap_proto::mapping::NamedEnum;
use meshtap_proto::{PortNum, Position, RouteDiscovery, StoreAndForward, Telemetry, User};
use prost::Message;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WireError;

/// Decoded application body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppData {
    /// Plain text message
    Text(String),
    /// Schema message as a field-name to value mapping
    Structured(Value),
}

/// Result of dispatching an application payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Message-type id
    pub message_type: u32,
    /// Canonical name of the message type
    pub app_name: String,
    /// Decoded body
    pub app_data: AppData,
}

impl ApplicationRecord {
    /// Text record
    pub fn text(body: impl Into<String>) -> Self {
        let message_type = PortNum::TextMessageApp as u32;
        Self {
            message_type,
            app_name: app_name(message_type),
            app_data: AppData::Text(body.into()),
        }
    }

    /// Structured record for the given message type
    pub fn structured(message_type: u32, fields: Value) -> Self {
        Self {
            message_type,
            app_name: app_name(message_type),
            app_data: AppData::Structured(fields),
        }
    }
}

type DecodeFn = fn(&[u8]) -> Result<Value, WireError>;
type EncodeFn = fn(&Value) -> Result<Vec<u8>, WireError>;

#[derive(Clone, Copy)]
enum BodyCodec {
    Text,
    Schema { decode: DecodeFn, encode: EncodeFn },
}

const fn schema<M>() -> BodyCodec
where
    M: Message + Default + Serialize + DeserializeOwned,
{
    BodyCodec::Schema {
        decode: decode_typed::<M>,
        encode: encode_typed::<M>,
    }
}

const CODECS: &[(PortNum, BodyCodec)] = &[
    (PortNum::TextMessageApp, BodyCodec::Text),
    (PortNum::PositionApp, schema::<Position>()),
    (PortNum::NodeinfoApp, schema::<User>()),
    (PortNum::StoreForwardApp, schema::<StoreAndForward>()),
    (PortNum::TelemetryApp, schema::<Telemetry>()),
    (PortNum::TracerouteApp, schema::<RouteDiscovery>()),
];

fn codec_for(message_type: u32) -> Option<BodyCodec> {
    CODECS
        .iter()
        .find(|(port, _)| *port as u32 == message_type)
        .map(|(_, codec)| *codec)
}

fn decode_typed<M>(body: &[u8]) -> Result<Value, WireError>
where
    M: Message + Default + Serialize,
{
    let message = M::decode(body).map_err(|_| WireError::Decode {
        reason: "application body decode failed",
        likely_cause: "corrupt or truncated application payload",
    })?;
    serde_json::to_value(&message).map_err(|e| WireError::Encode(e.to_string()))
}

fn encode_typed<M>(fields: &Value) -> Result<Vec<u8>, WireError>
where
    M: Message + DeserializeOwned,
{
    let message: M =
        serde_json::from_value(fields.clone()).map_err(|e| WireError::Encode(e.to_string()))?;
    Ok(message.encode_to_vec())
}

/// Canonical name of a message type, `UNKNOWN_<n>` when it has none
pub fn app_name(message_type: u32) -> String {
    i32::try_from(message_type)
        .ok()
        .and_then(PortNum::name_of)
        .map(str::to_string)
        .unwrap_or_else(|| format!("UNKNOWN_{}", message_type))
}

/// Decode an application body
pub fn decode(message_type: u32, body: &[u8]) -> Result<ApplicationRecord, WireError> {
    let app_data = match codec_for(message_type) {
        Some(BodyCodec::Text) => {
            let text = std::str::from_utf8(body).map_err(|_| WireError::Decode {
                reason: "text message is not valid UTF-8",
                likely_cause: "wrong channel key or corrupt payload",
            })?;
            AppData::Text(text.to_string())
        }
        Some(BodyCodec::Schema { decode, .. }) => AppData::Structured(decode(body)?),
        None => return Err(WireError::UnsupportedType(message_type)),
    };

    Ok(ApplicationRecord {
        message_type,
        app_name: app_name(message_type),
        app_data,
    })
}

/// Encode an application record back to its body bytes
pub fn encode(record: &ApplicationRecord) -> Result<Vec<u8>, WireError> {
    match (codec_for(record.message_type), &record.app_data) {
        (Some(BodyCodec::Text), AppData::Text(text)) => Ok(text.as_bytes().to_vec()),
        (Some(BodyCodec::Schema { encode, .. }), AppData::Structured(fields)) => encode(fields),
        (Some(_), _) => Err(WireError::Encode(format!(
            "{} body does not match its message type",
            record.app_name
        ))),
        (None, _) => Err(WireError::UnsupportedType(record.message_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtap_proto::HardwareModel;
    use serde_json::json;

    #[test]
    fn test_text_dispatch() {
        let record = decode(1, b"hello").unwrap();
        assert_eq!(record.app_name, "TEXT_MESSAGE_APP");
        assert_eq!(record.app_data, AppData::Text("hello".to_string()));
        assert_eq!(encode(&record).unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_utf8_text() {
        assert!(matches!(
            decode(1, &[0xC3, 0x28]),
            Err(WireError::Decode { .. })
        ));
    }

    #[test]
    fn test_unsupported_type() {
        assert!(matches!(decode(255, b"x"), Err(WireError::UnsupportedType(255))));
        assert!(matches!(decode(5, b""), Err(WireError::UnsupportedType(5))));
    }

    #[test]
    fn test_app_names() {
        assert_eq!(app_name(3), "POSITION_APP");
        assert_eq!(app_name(65), "STORE_FORWARD_APP");
        assert_eq!(app_name(255), "UNKNOWN_255");
        assert_eq!(app_name(u32::MAX), format!("UNKNOWN_{}", u32::MAX));
    }

    #[test]
    fn test_node_info_mapping() {
        let user = User {
            id: "!12345678".to_string(),
            long_name: "Base Camp".to_string(),
            short_name: "BC".to_string(),
            hw_model: HardwareModel::HeltecV3 as i32,
            ..Default::default()
        };

        let record = decode(4, &user.encode_to_vec()).unwrap();
        assert_eq!(record.app_name, "NODEINFO_APP");
        assert_eq!(
            record.app_data,
            AppData::Structured(json!({
                "id": "!12345678",
                "longName": "Base Camp",
                "shortName": "BC",
                "hwModel": "HELTEC_V3",
            }))
        );

        let body = encode(&record).unwrap();
        assert_eq!(User::decode(&body[..]).unwrap(), user);
    }

    #[test]
    fn test_position_mapping() {
        let position = Position {
            latitude_i: Some(473_977_418),
            longitude_i: Some(85_455_939),
            altitude: Some(408),
            time: 1_700_000_000,
            ..Default::default()
        };

        let record = decode(3, &position.encode_to_vec()).unwrap();
        assert_eq!(
            record.app_data,
            AppData::Structured(json!({
                "latitudeI": 473_977_418,
                "longitudeI": 85_455_939,
                "altitude": 408,
                "time": 1_700_000_000u32,
            }))
        );
    }

    #[test]
    fn test_traceroute_mapping() {
        let route = RouteDiscovery {
            route: vec![0x11111111, 0x22222222],
            snr_towards: vec![24, -8],
            ..Default::default()
        };

        let record = decode(70, &route.encode_to_vec()).unwrap();
        assert_eq!(record.app_name, "TRACEROUTE_APP");
        let body = encode(&record).unwrap();
        assert_eq!(RouteDiscovery::decode(&body[..]).unwrap(), route);
    }

    #[test]
    fn test_corrupt_schema_body() {
        // length-delimited field claiming more bytes than present
        let err = decode(4, &[0x0A, 0x10, b'x']).unwrap_err();
        assert!(matches!(err, WireError::Decode { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_mismatched_body_rejected() {
        let record = ApplicationRecord::structured(1, json!({"text": "hi"}));
        assert!(matches!(encode(&record), Err(WireError::Encode(_))));

        let record = ApplicationRecord::structured(255, json!({}));
        assert!(matches!(encode(&record), Err(WireError::UnsupportedType(255))));
    }

    #[test]
    fn test_unknown_field_name_rejected_on_encode() {
        let record = ApplicationRecord::structured(4, json!({"hwModel": "NOT_A_MODEL"}));
        assert!(matches!(encode(&record), Err(WireError::Encode(_))));
    }
}
