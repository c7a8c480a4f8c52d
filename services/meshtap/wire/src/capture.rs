//! Radio capture-metadata header.
//!
//! A sniffer prefixes every received LoRa frame with this fixed 15-byte
//! header describing the channel and signal quality. Multi-byte fields are in
//! network byte order.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capture header size in bytes
pub const CAPTURE_HEADER_SIZE: usize = 15;

/// Sync word used by the mesh protocol; anything else belongs to another
/// LoRa network
pub const MESH_SYNC_WORD: u8 = 0x2B;

/// Bandwidth is reported in 125 kHz steps
pub const BANDWIDTH_STEP_KHZ: u32 = 125;

/// Raw RSSI value meaning "not available"
pub const RSSI_UNAVAILABLE: u8 = 0xFF;

const RSSI_OFFSET_DBM: i16 = -139;

/// Capture-metadata header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureHeader {
    /// Header version
    pub version: u8,
    /// Padding byte
    pub padding: u8,
    /// Header length as recorded by the sniffer
    pub header_length: u16,
    /// Channel frequency in Hz
    pub frequency_hz: u32,
    /// Channel bandwidth code (125 kHz steps)
    pub bandwidth_code: u8,
    /// Spreading factor (7..12)
    pub spreading_factor: u8,
    /// Raw packet RSSI
    pub packet_rssi_raw: u8,
    /// Raw receiver max RSSI
    pub max_rssi_raw: u8,
    /// Raw receiver current RSSI
    pub current_rssi_raw: u8,
    /// Raw SNR in quarter dB, two's complement
    pub snr_raw: i8,
    /// Radio sync word
    pub sync_word: u8,
}

impl CaptureHeader {
    /// Create a header for a mesh frame on the given channel
    pub fn new(frequency_hz: u32, bandwidth_code: u8, spreading_factor: u8) -> Self {
        Self {
            version: 0,
            padding: 0,
            header_length: CAPTURE_HEADER_SIZE as u16,
            frequency_hz,
            bandwidth_code,
            spreading_factor,
            packet_rssi_raw: RSSI_UNAVAILABLE,
            max_rssi_raw: RSSI_UNAVAILABLE,
            current_rssi_raw: RSSI_UNAVAILABLE,
            snr_raw: 0,
            sync_word: MESH_SYNC_WORD,
        }
    }

    /// Encode the header to bytes
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.version);
        buf.put_u8(self.padding);
        buf.put_u16(self.header_length);
        buf.put_u32(self.frequency_hz);
        buf.put_u8(self.bandwidth_code);
        buf.put_u8(self.spreading_factor);
        buf.put_u8(self.packet_rssi_raw);
        buf.put_u8(self.max_rssi_raw);
        buf.put_u8(self.current_rssi_raw);
        buf.put_i8(self.snr_raw);
        buf.put_u8(self.sync_word);
    }

    /// Decode the header from bytes, leaving the frame body in `buf`
    pub fn decode(buf: &mut Bytes) -> Result<Self, crate::WireError> {
        if buf.len() < CAPTURE_HEADER_SIZE {
            return Err(crate::WireError::MalformedHeader {
                layer: "capture",
                needed: CAPTURE_HEADER_SIZE,
                available: buf.len(),
            });
        }

        Ok(Self {
            version: buf.get_u8(),
            padding: buf.get_u8(),
            header_length: buf.get_u16(),
            frequency_hz: buf.get_u32(),
            bandwidth_code: buf.get_u8(),
            spreading_factor: buf.get_u8(),
            packet_rssi_raw: buf.get_u8(),
            max_rssi_raw: buf.get_u8(),
            current_rssi_raw: buf.get_u8(),
            snr_raw: buf.get_i8(),
            sync_word: buf.get_u8(),
        })
    }

    /// Whether the frame body is a mesh packet
    pub fn is_mesh(&self) -> bool {
        self.sync_word == MESH_SYNC_WORD
    }

    /// SNR in dB
    pub fn snr_db(&self) -> f32 {
        f32::from(self.snr_raw) / 4.0
    }

    /// Packet RSSI in dBm; quarter-dB resolution applies below the noise floor
    pub fn packet_rssi_dbm(&self) -> Option<f32> {
        if self.packet_rssi_raw == RSSI_UNAVAILABLE {
            return None;
        }
        let raw = f32::from(self.packet_rssi_raw);
        if self.snr_raw >= 0 {
            Some(f32::from(RSSI_OFFSET_DBM) + raw)
        } else {
            Some(f32::from(RSSI_OFFSET_DBM) + raw * 0.25)
        }
    }

    /// Receiver max RSSI in dBm
    pub fn max_rssi_dbm(&self) -> Option<i16> {
        rssi_dbm(self.max_rssi_raw)
    }

    /// Receiver current RSSI in dBm
    pub fn current_rssi_dbm(&self) -> Option<i16> {
        rssi_dbm(self.current_rssi_raw)
    }

    /// Channel bandwidth in kHz when the code is one the protocol uses
    pub fn bandwidth_khz(&self) -> Option<u32> {
        match self.bandwidth_code {
            2 => Some(u32::from(self.bandwidth_code) * BANDWIDTH_STEP_KHZ),
            _ => None,
        }
    }

    /// Display label for the bandwidth
    pub fn bandwidth_label(&self) -> String {
        match self.bandwidth_khz() {
            Some(khz) => format!("{} kHz", khz),
            None => format!("unknown ({})", self.bandwidth_code),
        }
    }
}

fn rssi_dbm(raw: u8) -> Option<i16> {
    if raw == RSSI_UNAVAILABLE {
        None
    } else {
        Some(RSSI_OFFSET_DBM + i16::from(raw))
    }
}

fn fmt_dbm<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => format!("{} dBm", v),
        None => "N/A".to_string(),
    }
}

impl fmt::Display for CaptureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz bw={} sf={} rssi={} max={} cur={} snr={} dB sync=0x{:02X}",
            self.frequency_hz,
            self.bandwidth_label(),
            self.spreading_factor,
            fmt_dbm(self.packet_rssi_dbm()),
            fmt_dbm(self.max_rssi_dbm()),
            fmt_dbm(self.current_rssi_dbm()),
            self.snr_db(),
            self.sync_word
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CaptureHeader {
        CaptureHeader {
            version: 0,
            padding: 0,
            header_length: 15,
            frequency_hz: 906_875_000,
            bandwidth_code: 2,
            spreading_factor: 11,
            packet_rssi_raw: 40,
            max_rssi_raw: 0xFF,
            current_rssi_raw: 30,
            snr_raw: 8,
            sync_word: MESH_SYNC_WORD,
        }
    }

    #[test]
    fn test_encode_decode() {
        let header = sample();
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), CAPTURE_HEADER_SIZE);

        let mut bytes = buf.freeze();
        let decoded = CaptureHeader::decode(&mut bytes).unwrap();
        assert_eq!(decoded, header);
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_bytes_survive_decode_encode() {
        let raw: [u8; 15] = [
            0x00, 0x00, 0x00, 0x0F, 0x36, 0x0E, 0x0C, 0x38, 0x02, 0x0B, 0x45, 0xFF, 0x2A, 0xF4,
            0x2B,
        ];
        let mut bytes = Bytes::copy_from_slice(&raw);
        let header = CaptureHeader::decode(&mut bytes).unwrap();
        assert_eq!(header.frequency_hz, 0x360E_0C38);
        assert_eq!(header.snr_raw, -12);

        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(&buf[..], &raw[..]);
    }

    #[test]
    fn test_short_input() {
        let mut bytes = Bytes::from_static(&[0u8; 14]);
        match CaptureHeader::decode(&mut bytes) {
            Err(crate::WireError::MalformedHeader {
                layer,
                needed,
                available,
            }) => {
                assert_eq!(layer, "capture");
                assert_eq!(needed, 15);
                assert_eq!(available, 14);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_derived_signal_values() {
        let header = sample();
        assert_eq!(header.snr_db(), 2.0);
        assert_eq!(header.packet_rssi_dbm(), Some(-99.0));
        assert_eq!(header.max_rssi_dbm(), None);
        assert_eq!(header.current_rssi_dbm(), Some(-109));

        let mut weak = header;
        weak.snr_raw = -20;
        assert_eq!(weak.snr_db(), -5.0);
        assert_eq!(weak.packet_rssi_dbm(), Some(-129.0));

        weak.packet_rssi_raw = RSSI_UNAVAILABLE;
        assert_eq!(weak.packet_rssi_dbm(), None);
    }

    #[test]
    fn test_bandwidth_label() {
        let mut header = sample();
        assert_eq!(header.bandwidth_label(), "250 kHz");

        header.bandwidth_code = 250;
        assert_eq!(header.bandwidth_khz(), None);
        assert_eq!(header.bandwidth_label(), "unknown (250)");
    }

    #[test]
    fn test_sync_word_gate() {
        let mut header = sample();
        assert!(header.is_mesh());
        header.sync_word = 0x34;
        assert!(!header.is_mesh());
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.contains("sf=11"));
        assert!(text.contains("rssi=-99 dBm"));
        assert!(text.contains("max=N/A"));
        assert!(text.contains("snr=2 dB"));
    }
}
