//! Structured-mapping rules shared by the application messages.
//!
//! Application messages serialize through `serde` following the protobuf
//! JSON mapping: lowerCamelCase field names, default-valued scalars omitted,
//! enums rendered by their canonical name (or the bare number when the value
//! has no name) and bytes as standard base64.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

/// Enumeration whose values have canonical protocol names
pub trait NamedEnum {
    /// Name of a raw value, if the value is known
    fn name_of(value: i32) -> Option<&'static str>;
    /// Raw value for a canonical name
    fn value_of(name: &str) -> Option<i32>;
}

/// Whether a field holds its protobuf default and should be left out
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Serialize/deserialize an `i32` enum field by canonical name
pub mod enum_name {
    use super::*;

    /// Render a raw enum value by name, falling back to the number
    pub fn serialize<E: NamedEnum, S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        match E::name_of(*value) {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_i32(*value),
        }
    }

    /// Accept either a canonical name or a raw number
    pub fn deserialize<'de, E: NamedEnum, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Number(i32),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(name) => E::value_of(&name)
                .ok_or_else(|| D::Error::custom(format!("unknown enum value name {name:?}"))),
            Repr::Number(value) => Ok(value),
        }
    }
}

/// Serialize/deserialize a bytes field as standard base64
pub mod base64_bytes {
    use super::*;

    /// Encode bytes as base64 text
    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(value))
    }

    /// Decode base64 text into bytes
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        BASE64_STANDARD.decode(text.as_bytes()).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{HardwareModel, Role, User};
    use serde_json::json;

    #[test]
    fn test_is_default() {
        assert!(is_default(&0u32));
        assert!(is_default(&String::new()));
        assert!(!is_default(&7u32));
        assert!(!is_default(&true));
    }

    #[test]
    fn test_user_mapping_uses_names_and_omits_defaults() {
        let user = User {
            id: "!a1b2c3d4".to_string(),
            long_name: "Base Camp".to_string(),
            short_name: "BC".to_string(),
            hw_model: HardwareModel::HeltecV3 as i32,
            role: Role::Client as i32,
            public_key: vec![1, 2, 3],
            ..Default::default()
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "!a1b2c3d4",
                "longName": "Base Camp",
                "shortName": "BC",
                "hwModel": "HELTEC_V3",
                "publicKey": "AQID",
            })
        );
    }

    #[test]
    fn test_unnamed_enum_value_renders_as_number() {
        let user = User {
            hw_model: 4242,
            ..Default::default()
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value, json!({ "hwModel": 4242 }));
    }

    #[test]
    fn test_mapping_back_into_message() {
        let user: User = serde_json::from_value(json!({
            "longName": "Relay",
            "role": "ROUTER",
            "macaddr": "AAECAwQF",
            "isUnmessagable": true,
        }))
        .unwrap();

        assert_eq!(user.long_name, "Relay");
        assert_eq!(user.role, Role::Router as i32);
        assert_eq!(user.macaddr, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(user.is_unmessagable, Some(true));
    }

    #[test]
    fn test_unknown_enum_name_rejected() {
        let result = serde_json::from_value::<User>(json!({ "role": "ADMIRAL" }));
        assert!(result.is_err());
    }
}
