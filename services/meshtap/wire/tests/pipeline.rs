//! End-to-end decoding of captured and bridged mesh traffic.

use bytes::{BufMut, Bytes, BytesMut};
use meshtap_proto::{Telemetry, User};
use meshtap_wire::{
    decode_bridge_message, decode_capture_frame, encode_capture_frame, AppData, ApplicationRecord,
    CaptureFrame, CaptureHeader, ChannelKey, DecryptedPayload, FrameBuilder, Link, MeshHeader,
    WireError, BROADCAST_ADDR,
};
use prost::Message;
use serde_json::json;

fn ping_capture() -> CaptureHeader {
    let mut capture = CaptureHeader::new(906_875_000, 2, 9);
    capture.snr_raw = 8;
    capture.packet_rssi_raw = 40;
    capture
}

fn ping_frame(key: &ChannelKey) -> Bytes {
    let header = MeshHeader::new(0x12345678, BROADCAST_ADDR, 0x00000001);
    encode_capture_frame(
        &ping_capture(),
        &header,
        &DecryptedPayload::new(1, Bytes::new()),
        &ApplicationRecord::text("ping"),
        key,
    )
    .unwrap()
}

#[test]
fn unencrypted_ping_capture_decodes() {
    let key = ChannelKey::derive("").unwrap();
    let bytes = ping_frame(&key);

    let (capture, packet) = match decode_capture_frame(bytes, &key).unwrap() {
        CaptureFrame::Mesh { capture, packet } => (capture, packet),
        other => panic!("expected a mesh frame, got {:?}", other),
    };

    assert_eq!(capture.spreading_factor, 9);
    assert_eq!(capture.snr_db(), 2.0);
    assert_eq!(capture.bandwidth_label(), "250 kHz");

    assert_eq!(packet.link.source().to_string(), "!12345678");
    assert_eq!(packet.link.destination().to_string(), "!ffffffff");
    assert_eq!(packet.link.packet_id(), 1);

    let record = packet.app.unwrap();
    assert_eq!(record.app_name, "TEXT_MESSAGE_APP");
    assert_eq!(record.app_data, AppData::Text("ping".to_string()));
}

#[test]
fn unencrypted_ping_body_is_plain_schema() {
    let key = ChannelKey::Unencrypted;
    let bytes = ping_frame(&key);

    // capture header, mesh header, then Data { portnum: 1, payload: "ping" }
    assert_eq!(&bytes[31..], &[0x08, 0x01, 0x12, 0x04, b'p', b'i', b'n', b'g']);
}

#[test]
fn encrypted_capture_round_trip() {
    let key = ChannelKey::derive("AQ==").unwrap();
    let frame = decode_capture_frame(ping_frame(&key), &key).unwrap();

    match frame {
        CaptureFrame::Mesh { packet, .. } => {
            assert_eq!(
                packet.app.unwrap().app_data,
                AppData::Text("ping".to_string())
            );
        }
        other => panic!("expected a mesh frame, got {:?}", other),
    }
}

#[test]
fn corrupted_ciphertext_is_a_decode_error() {
    for key in [ChannelKey::Unencrypted, ChannelKey::default()] {
        let mut bytes = BytesMut::from(&ping_frame(&key)[..]);
        bytes[31] ^= 0xFF;

        match decode_capture_frame(bytes.freeze(), &key) {
            Err(WireError::Decode { reason, .. }) => assert_eq!(reason, "schema decode failed"),
            other => panic!("expected a decode error, got {:?}", other),
        }
    }
}

#[test]
fn corrupted_text_body_fails_only_the_application_layer() {
    // byte 35 is the first body byte: 'p' of "ping"
    for key in [ChannelKey::Unencrypted, ChannelKey::default()] {
        let mut bytes = BytesMut::from(&ping_frame(&key)[..]);
        bytes[35] ^= 0x80;

        let packet = match decode_capture_frame(bytes.freeze(), &key).unwrap() {
            CaptureFrame::Mesh { packet, .. } => packet,
            other => panic!("expected a mesh frame, got {:?}", other),
        };
        assert_eq!(packet.payload.message_type, 1);
        assert_eq!(packet.payload.inner.len(), 4);
        match packet.app {
            Err(WireError::Decode { reason, .. }) => {
                assert_eq!(reason, "text message is not valid UTF-8")
            }
            other => panic!("expected a decode error, got {:?}", other),
        }
    }
}

#[test]
fn bit_flip_inside_valid_text_goes_undetected() {
    // counter mode carries no integrity check
    let key = ChannelKey::default();
    let mut bytes = BytesMut::from(&ping_frame(&key)[..]);
    bytes[35] ^= 0x01;

    let packet = match decode_capture_frame(bytes.freeze(), &key).unwrap() {
        CaptureFrame::Mesh { packet, .. } => packet,
        other => panic!("expected a mesh frame, got {:?}", other),
    };
    assert_eq!(packet.app.unwrap().app_data, AppData::Text("qing".to_string()));
}

#[test]
fn malformed_envelope_yields_one_error() {
    let key = ChannelKey::default();
    let garbage: &[&[u8]] = &[&[0x0A, 0x05, 0x01], &[0xFF], &[0x0A, 0x80]];

    for body in garbage {
        let result = decode_bridge_message(body, &key);
        assert!(
            matches!(result, Err(WireError::Envelope(_))),
            "body {:?} gave {:?}",
            body,
            result
        );
    }
}

#[test]
fn bridged_node_info_decodes() {
    let key = ChannelKey::default();
    let user = User {
        id: "!a1b2c3d4".to_string(),
        long_name: "Ridge Relay".to_string(),
        short_name: "RR".to_string(),
        ..Default::default()
    };
    let record = ApplicationRecord::structured(4, json!({
        "id": "!a1b2c3d4",
        "longName": "Ridge Relay",
        "shortName": "RR",
    }));

    let header = MeshHeader::new(0xA1B2C3D4, BROADCAST_ADDR, 0x77);
    let body = FrameBuilder::new(header)
        .build_bridge(&record, &key, "LongFast", "!00000001")
        .unwrap();

    let frame = decode_bridge_message(&body, &key).unwrap();
    assert!(matches!(frame.link, Link::Bridge(_)));
    assert_eq!(User::decode(&frame.payload.inner[..]).unwrap(), user);
    assert_eq!(frame.app.unwrap(), record);
}

#[test]
fn unsupported_application_type_is_not_fatal() {
    let key = ChannelKey::default();
    let header = MeshHeader::new(0x01, 0x02, 0x03);
    let payload = DecryptedPayload::new(255, Bytes::from_static(b"opaque"));

    let mut buf = BytesMut::new();
    ping_capture().encode(&mut buf);
    header.encode(&mut buf);
    buf.put_slice(&payload.encode(header.packet_id, header.src, &key));

    match decode_capture_frame(buf.freeze(), &key).unwrap() {
        CaptureFrame::Mesh { packet, .. } => {
            assert_eq!(packet.app_name(), "UNKNOWN_255");
            let err = packet.app.unwrap_err();
            assert!(matches!(err, WireError::UnsupportedType(255)));
            assert!(!err.is_fatal());
            assert_eq!(&packet.payload.inner[..], b"opaque");
        }
        other => panic!("expected a mesh frame, got {:?}", other),
    }
}

#[test]
fn telemetry_is_surfaced_as_mapping() {
    let key = ChannelKey::default();
    let record = ApplicationRecord::structured(67, json!({
        "time": 1_700_000_000u32,
        "deviceMetrics": { "batteryLevel": 87, "voltage": 3.75 },
    }));

    let header = MeshHeader::new(0x10, BROADCAST_ADDR, 0x20);
    let bytes = FrameBuilder::new(header)
        .with_capture(ping_capture())
        .build(&record, &key)
        .unwrap();

    match decode_capture_frame(bytes, &key).unwrap() {
        CaptureFrame::Mesh { packet, .. } => {
            let decoded = packet.app.unwrap();
            assert_eq!(decoded.app_name, "TELEMETRY_APP");
            assert_eq!(decoded, record);
            assert!(Telemetry::decode(&packet.payload.inner[..]).is_ok());
        }
        other => panic!("expected a mesh frame, got {:?}", other),
    }
}
