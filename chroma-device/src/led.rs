//! Per-LED property handles
//!
//! Each addressable LED (backlight, logo, scroll wheel, ...) exposes the
//! same property set: on/off state, color, and brightness. Brightness is
//! 0.0 to 100.0 at the API and a single 0 to 255 byte on the wire.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use chroma_protocol::{Argument, CommandRunner, Rgb};

use crate::commands::led as cmd;
use crate::error::DeviceError;

/// Addressable LED with its wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedType {
    ScrollWheel,
    Battery,
    Logo,
    Backlight,
    Macro,
    GameMode,
}

impl LedType {
    /// Wire identifier the firmware uses for this LED.
    pub const fn wire_id(self) -> u8 {
        match self {
            LedType::ScrollWheel => 0x01,
            LedType::Battery => 0x03,
            LedType::Logo => 0x04,
            LedType::Backlight => 0x05,
            LedType::Macro => 0x07,
            LedType::GameMode => 0x08,
        }
    }
}

/// Map an API-level brightness (0.0 to 100.0) to the wire byte.
pub(crate) fn scale_brightness(level: f32) -> u8 {
    (level.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8
}

/// Inverse of [`scale_brightness`].
pub(crate) fn unscale_brightness(raw: u8) -> f32 {
    f32::from(raw) / 255.0 * 100.0
}

#[derive(Debug, Default)]
struct LedCache {
    brightness: Option<f32>,
    state: Option<bool>,
    color: Option<Rgb>,
}

/// Handle to one LED on one device.
///
/// Reads are cached until [`Led::refresh`] or a write invalidates them.
pub struct Led {
    runner: Arc<CommandRunner>,
    led_type: LedType,
    cache: Mutex<LedCache>,
}

impl Led {
    pub(crate) fn new(runner: Arc<CommandRunner>, led_type: LedType) -> Self {
        Self {
            runner,
            led_type,
            cache: Mutex::new(LedCache::default()),
        }
    }

    pub fn led_type(&self) -> LedType {
        self.led_type
    }

    /// Drop all cached property values.
    pub fn refresh(&self) {
        *self.cache.lock() = LedCache::default();
    }

    fn query_args(&self) -> [Argument; 2] {
        [
            Argument::Byte(cmd::VARSTORE),
            Argument::Byte(self.led_type.wire_id()),
        ]
    }

    /// Current brightness, 0.0 to 100.0.
    pub async fn brightness(&self) -> Result<f32, DeviceError> {
        if let Some(cached) = self.cache.lock().brightness {
            return Ok(cached);
        }
        let resp = self
            .runner
            .run_with_result(&cmd::GET_LED_BRIGHTNESS, &self.query_args())
            .await?;
        let raw = resp.get(2).copied().ok_or_else(|| {
            DeviceError::UnexpectedResponse("brightness response too short".into())
        })?;
        let level = unscale_brightness(raw);
        self.cache.lock().brightness = Some(level);
        Ok(level)
    }

    /// Set brightness, 0.0 to 100.0. Values outside the range are clamped.
    pub async fn set_brightness(&self, level: f32) -> Result<(), DeviceError> {
        let raw = scale_brightness(level);
        debug!("{:?} brightness -> {} (raw {})", self.led_type, level, raw);
        self.runner
            .run_command(
                &cmd::SET_LED_BRIGHTNESS,
                &[
                    Argument::Byte(cmd::VARSTORE),
                    Argument::Byte(self.led_type.wire_id()),
                    Argument::Byte(raw),
                ],
            )
            .await?;
        self.cache.lock().brightness = Some(unscale_brightness(raw));
        Ok(())
    }

    /// Whether the LED is lit.
    pub async fn state(&self) -> Result<bool, DeviceError> {
        if let Some(cached) = self.cache.lock().state {
            return Ok(cached);
        }
        let resp = self
            .runner
            .run_with_result(&cmd::GET_LED_STATE, &self.query_args())
            .await?;
        let on = resp.get(2).copied().unwrap_or(0) != 0;
        self.cache.lock().state = Some(on);
        Ok(on)
    }

    pub async fn set_state(&self, on: bool) -> Result<(), DeviceError> {
        self.runner
            .run_command(
                &cmd::SET_LED_STATE,
                &[
                    Argument::Byte(cmd::VARSTORE),
                    Argument::Byte(self.led_type.wire_id()),
                    Argument::Byte(u8::from(on)),
                ],
            )
            .await?;
        self.cache.lock().state = Some(on);
        Ok(())
    }

    /// Static color of the LED.
    pub async fn color(&self) -> Result<Rgb, DeviceError> {
        if let Some(cached) = self.cache.lock().color {
            return Ok(cached);
        }
        let resp = self
            .runner
            .run_with_result(&cmd::GET_LED_RGB, &self.query_args())
            .await?;
        if resp.len() < 5 {
            return Err(DeviceError::UnexpectedResponse(
                "color response too short".into(),
            ));
        }
        let color = Rgb::new(resp[2], resp[3], resp[4]);
        self.cache.lock().color = Some(color);
        Ok(color)
    }

    pub async fn set_color(&self, color: Rgb) -> Result<(), DeviceError> {
        self.runner
            .run_command(
                &cmd::SET_LED_RGB,
                &[
                    Argument::Byte(cmd::VARSTORE),
                    Argument::Byte(self.led_type.wire_id()),
                    Argument::Color(color),
                ],
            )
            .await?;
        self.cache.lock().color = Some(color);
        Ok(())
    }
}
