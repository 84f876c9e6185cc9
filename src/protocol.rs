use core::fmt::Write;
use heapless::String;
use log::debug;
use uuid::Uuid;

pub const DEVICE_NAME: &str = "CRANE_SCALE_DEVICE";

// Nordic UART style service: TX notifies the weight, RX is declared for clients that expect it
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x6E400001_B5A3_F393_E0A9_E50E24DCCA9E);
pub const RX_CHAR_UUID: Uuid = Uuid::from_u128(0x6E400002_B5A3_F393_E0A9_E50E24DCCA9E);
pub const TX_CHAR_UUID: Uuid = Uuid::from_u128(0x6E400003_B5A3_F393_E0A9_E50E24DCCA9E);

/// Longest `{:.2}` rendering of a finite f32 fits comfortably.
pub const PAYLOAD_CAPACITY: usize = 48;

pub type WeightPayload = String<PAYLOAD_CAPACITY>;

/// Encode a weight in kilograms as decimal text with two fraction digits.
pub fn encode_weight(weight_kg: f32) -> Option<WeightPayload> {
    let mut payload = WeightPayload::new();
    write!(payload, "{:.2}", weight_kg).ok()?;
    debug!("Encoded weight payload: {}", payload);
    Some(payload)
}

/// NimBLE stores 128-bit UUIDs least significant byte first.
pub fn uuid_to_le_bytes(uuid: &Uuid) -> [u8; 16] {
    let mut bytes = *uuid.as_bytes();
    bytes.reverse();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_constants() {
        assert_eq!(
            SERVICE_UUID.to_string().to_uppercase(),
            "6E400001-B5A3-F393-E0A9-E50E24DCCA9E"
        );
        assert_eq!(
            TX_CHAR_UUID.to_string().to_uppercase(),
            "6E400003-B5A3-F393-E0A9-E50E24DCCA9E"
        );
        assert_eq!(
            RX_CHAR_UUID.to_string().to_uppercase(),
            "6E400002-B5A3-F393-E0A9-E50E24DCCA9E"
        );
    }

    #[test]
    fn test_uuid_byte_order() {
        let bytes = uuid_to_le_bytes(&SERVICE_UUID);
        assert_eq!(bytes[0], 0x9E);
        assert_eq!(bytes[15], 0x6E);
    }

    #[test]
    fn test_weight_encoding() {
        assert_eq!(encode_weight(0.1).unwrap().as_str(), "0.10");
        assert_eq!(encode_weight(0.0).unwrap().as_str(), "0.00");
        assert_eq!(encode_weight(12.345).unwrap().as_str(), "12.35");
        assert_eq!(encode_weight(150.0).unwrap().as_str(), "150.00");
    }

    #[test]
    fn test_extreme_weight_still_fits() {
        assert!(encode_weight(f32::MAX).is_some());
    }
}
