//! Status response parsing

use serde::Serialize;

use super::constants::{
    FLAME_HW_MIN, STATUS_BITS_OFFSET, STATUS_BIT_BURNER2, STATUS_BIT_PILOT, STATUS_FLAME_OFFSET,
    STATUS_MIN_LEN,
};
use super::mapping::hardware_to_percentage;
use crate::error::{FireSrvError, Result};

/// Snapshot of the device as reported by one status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub power: bool,
    /// 0-100, always 0 when power is off
    pub flame_level: u8,
    pub burner2: bool,
    pub pilot: bool,
    /// Decoded response as lowercase hex, for diagnostics
    pub raw_response: String,
}

impl DeviceStatus {
    /// Parse a decoded status reply (the 53-byte device info block)
    ///
    /// Byte 7 carries flame/power (below 0x80 is off), byte 9 the status bits.
    pub fn parse(response: &[u8]) -> Result<Self> {
        if response.len() < STATUS_MIN_LEN {
            return Err(FireSrvError::protocol(format!(
                "Status response too short: {} bytes (need {}): {}",
                response.len(),
                STATUS_MIN_LEN,
                common::hex::encode_lower(response)
            )));
        }

        let flame_byte = response[STATUS_FLAME_OFFSET];
        let status_bits = response[STATUS_BITS_OFFSET];

        let power = flame_byte >= FLAME_HW_MIN;
        let flame_level = if power {
            hardware_to_percentage(flame_byte)
        } else {
            0
        };

        Ok(Self {
            power,
            flame_level,
            burner2: status_bits & STATUS_BIT_BURNER2 != 0,
            pilot: status_bits & STATUS_BIT_PILOT != 0,
            raw_response: common::hex::encode_lower(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(flame: u8, bits: u8) -> Vec<u8> {
        let mut response = vec![0u8; 53];
        response[STATUS_FLAME_OFFSET] = flame;
        response[STATUS_BITS_OFFSET] = bits;
        response
    }

    #[test]
    fn test_parse_power_on_with_burner2_and_pilot() {
        let status = DeviceStatus::parse(&response_with(0x8A, 0xC9)).unwrap();
        assert!(status.power);
        assert_eq!(status.flame_level, hardware_to_percentage(0x8A));
        assert!(status.burner2);
        assert!(status.pilot);
        assert_eq!(status.raw_response.len(), 106);
    }

    #[test]
    fn test_parse_power_off_ignores_status_bits_for_flame() {
        let status = DeviceStatus::parse(&response_with(0x00, 0xFF)).unwrap();
        assert!(!status.power);
        assert_eq!(status.flame_level, 0);

        let status = DeviceStatus::parse(&response_with(0x7F, 0x00)).unwrap();
        assert!(!status.power);
        assert_eq!(status.flame_level, 0);
    }

    #[test]
    fn test_parse_status_bits() {
        let status = DeviceStatus::parse(&response_with(0xFF, 0xC1)).unwrap();
        assert!(!status.burner2);
        assert!(status.pilot);
        assert_eq!(status.flame_level, 100);

        let status = DeviceStatus::parse(&response_with(0x80, 0x09)).unwrap();
        assert!(status.burner2);
        assert!(!status.pilot);
        assert!(status.power);
        assert_eq!(status.flame_level, 0);
    }

    #[test]
    fn test_parse_minimum_length() {
        assert!(DeviceStatus::parse(&[0x8A; 18]).is_ok());

        let err = DeviceStatus::parse(&[0x8A; 17]).unwrap_err();
        assert!(matches!(err, FireSrvError::ProtocolError(_)));
        assert!(DeviceStatus::parse(&[]).is_err());
    }

    #[test]
    fn test_parse_captured_response() {
        let raw = common::hex::decode(b"0303000000035c8a82c900040000011f00c84c616b652046697265706c616365ffffffffffff000000000000000000000000044201").unwrap();
        let status = DeviceStatus::parse(&raw).unwrap();
        assert!(status.power);
        assert!(status.burner2);
        assert!(status.pilot);
        assert!(status.raw_response.starts_with("0303000000035c8a"));
    }
}
