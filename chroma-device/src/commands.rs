//! Command descriptor constants
//!
//! Grouped by hardware area. The `data_size` on each descriptor is the
//! size of the argument region the firmware expects for the command; get
//! variants share their set counterpart's id with bit 7 raised.

use chroma_protocol::Command;

/// Standard device queries (class 0x00)
pub mod standard {
    use super::Command;

    pub const SET_DEVICE_MODE: Command = Command::new(0x00, 0x04, 0x02);
    pub const GET_FIRMWARE_VERSION: Command = Command::new(0x00, 0x81, 0x02);
    pub const GET_SERIAL: Command = Command::new(0x00, 0x82, 0x16);
    pub const GET_DEVICE_MODE: Command = Command::new(0x00, 0x84, 0x02);
}

/// LED property commands (class 0x03)
pub mod led {
    use super::Command;

    /// First argument to every LED command: persist to the variable store.
    pub const VARSTORE: u8 = 0x01;

    pub const SET_LED_STATE: Command = Command::new(0x03, 0x00, 0x03);
    pub const SET_LED_RGB: Command = Command::new(0x03, 0x01, 0x05);
    pub const SET_LED_MODE: Command = Command::new(0x03, 0x02, 0x03);
    pub const SET_LED_BRIGHTNESS: Command = Command::new(0x03, 0x03, 0x03);

    pub const GET_LED_STATE: Command = Command::new(0x03, 0x80, 0x03);
    pub const GET_LED_RGB: Command = Command::new(0x03, 0x81, 0x05);
    pub const GET_LED_MODE: Command = Command::new(0x03, 0x82, 0x03);
    pub const GET_LED_BRIGHTNESS: Command = Command::new(0x03, 0x83, 0x03);
}

/// Addressable frame-buffer upload (class 0x03)
pub mod frame {
    use super::Command;

    /// Argument size varies with the row width; `data_size` is left zero.
    pub const SET_FRAME_DATA: Command = Command::new(0x03, 0x0B, 0x00);

    /// Frame id selecting the raw frame buffer for row uploads.
    pub const FRAME_ID_RAW: u8 = 0xFF;
}

/// Laptop keyboards use a dedicated brightness pair (class 0x0E) instead
/// of an LED property.
pub mod laptop {
    use super::Command;

    pub const SET_BRIGHTNESS: Command = Command::new(0x0E, 0x04, 0x02);
    pub const GET_BRIGHTNESS: Command = Command::new(0x0E, 0x84, 0x02);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_variants_raise_bit_seven() {
        assert_eq!(led::GET_LED_STATE.id, led::SET_LED_STATE.id | 0x80);
        assert_eq!(led::GET_LED_RGB.id, led::SET_LED_RGB.id | 0x80);
        assert_eq!(led::GET_LED_MODE.id, led::SET_LED_MODE.id | 0x80);
        assert_eq!(
            led::GET_LED_BRIGHTNESS.id,
            led::SET_LED_BRIGHTNESS.id | 0x80
        );
        assert_eq!(
            laptop::GET_BRIGHTNESS.id,
            laptop::SET_BRIGHTNESS.id | 0x80
        );
        assert_eq!(
            standard::GET_DEVICE_MODE.id,
            standard::SET_DEVICE_MODE.id | 0x80
        );
    }
}
