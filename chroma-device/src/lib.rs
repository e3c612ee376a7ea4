//! High-level device layer for Chroma USB HID peripherals
//!
//! Builds on `chroma-protocol` to expose device features: the hardware
//! model registry with quirk flags, per-LED property handles, master
//! brightness with per-model strategy dispatch, suspend/resume, standard
//! device queries, frame-buffer row upload, and the macro key listener.

pub mod commands;
pub mod error;
pub mod led;
pub mod macros;
pub mod models;

pub use error::DeviceError;
pub use led::{Led, LedType};
pub use macros::{InputEvent, MacroListener, MacroTrigger};
pub use models::{find_model, BrightnessStrategy, Family, Model, Quirk, MODELS, VENDOR_ID};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use chroma_protocol::{Argument, CommandRunner, Rgb, Transport};

use crate::led::{scale_brightness, unscale_brightness};

/// Firmware revision reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Default)]
struct SuspendState {
    suspended: bool,
    saved_brightness: Option<f32>,
}

/// One opened Chroma peripheral.
///
/// Owns the command runner configured from the model's quirk set. All
/// commands issued through this handle share the runner's serialization
/// lock, so concurrent calls never interleave frames on the wire.
pub struct ChromaDevice {
    model: &'static Model,
    runner: Arc<CommandRunner>,
    leds: Mutex<HashMap<LedType, Arc<Led>>>,
    suspend: Mutex<SuspendState>,
}

impl ChromaDevice {
    /// Assemble a device handle over an opened transport.
    ///
    /// Frame length, checksum rule, transaction code, and pacing all come
    /// from the model definition.
    pub fn new(transport: Arc<dyn Transport>, model: &'static Model) -> Self {
        let runner = Arc::new(CommandRunner::new(
            transport,
            model.frame_config(),
            model.runner_options(),
        ));
        info!("opened {} ({:04x}:{:04x})", model.name, model.vid, model.pid);
        Self {
            model,
            runner,
            leds: Mutex::new(HashMap::new()),
            suspend: Mutex::new(SuspendState::default()),
        }
    }

    pub fn model(&self) -> &'static Model {
        self.model
    }

    pub fn runner(&self) -> &Arc<CommandRunner> {
        &self.runner
    }

    /// Handle for one of this device's LEDs, created on first use.
    pub fn led(&self, led_type: LedType) -> Arc<Led> {
        Arc::clone(
            self.leds
                .lock()
                .entry(led_type)
                .or_insert_with(|| Arc::new(Led::new(Arc::clone(&self.runner), led_type))),
        )
    }

    // === Master brightness ===

    /// Master brightness, 0.0 to 100.0, read via the model's strategy.
    pub async fn get_brightness(&self) -> Result<f32, DeviceError> {
        {
            let state = self.suspend.lock();
            if state.suspended {
                return Ok(state.saved_brightness.unwrap_or(0.0));
            }
        }
        match self.model.brightness_strategy() {
            BrightnessStrategy::Led(led_type) => self.led(led_type).brightness().await,
            BrightnessStrategy::Dedicated => self.get_dedicated_brightness().await,
        }
    }

    /// Set master brightness, 0.0 to 100.0.
    ///
    /// While suspended, only the saved level changes; the hardware stays
    /// dark until [`resume`].
    ///
    /// [`resume`]: ChromaDevice::resume
    pub async fn set_brightness(&self, level: f32) -> Result<(), DeviceError> {
        {
            let mut state = self.suspend.lock();
            if state.suspended {
                state.saved_brightness = Some(level.clamp(0.0, 100.0));
                return Ok(());
            }
        }
        self.drive_brightness(level).await
    }

    async fn drive_brightness(&self, level: f32) -> Result<(), DeviceError> {
        match self.model.brightness_strategy() {
            BrightnessStrategy::Led(led_type) => self.led(led_type).set_brightness(level).await,
            BrightnessStrategy::Dedicated => self.set_dedicated_brightness(level).await,
        }
    }

    async fn get_dedicated_brightness(&self) -> Result<f32, DeviceError> {
        let resp = self
            .runner
            .run_with_result(
                &commands::laptop::GET_BRIGHTNESS,
                &[Argument::Byte(commands::led::VARSTORE)],
            )
            .await?;
        let raw = resp.get(1).copied().ok_or_else(|| {
            DeviceError::UnexpectedResponse("brightness response too short".into())
        })?;
        Ok(unscale_brightness(raw))
    }

    async fn set_dedicated_brightness(&self, level: f32) -> Result<(), DeviceError> {
        self.runner
            .run_command(
                &commands::laptop::SET_BRIGHTNESS,
                &[
                    Argument::Byte(commands::led::VARSTORE),
                    Argument::Byte(scale_brightness(level)),
                ],
            )
            .await?;
        Ok(())
    }

    // === Suspend / resume ===

    /// Save the current brightness and drive the lighting to zero.
    ///
    /// Idempotent: suspending twice keeps the first saved level.
    pub async fn suspend(&self) -> Result<(), DeviceError> {
        if self.suspend.lock().suspended {
            return Ok(());
        }
        let current = self.get_brightness().await?;
        self.drive_brightness(0.0).await?;
        let mut state = self.suspend.lock();
        state.suspended = true;
        state.saved_brightness = Some(current);
        debug!("{} suspended at {:.1}", self.model.name, current);
        Ok(())
    }

    /// Restore the brightness saved by [`suspend`].
    ///
    /// [`suspend`]: ChromaDevice::suspend
    pub async fn resume(&self) -> Result<(), DeviceError> {
        let saved = {
            let mut state = self.suspend.lock();
            if !state.suspended {
                return Ok(());
            }
            state.suspended = false;
            state.saved_brightness.take()
        };
        if let Some(level) = saved {
            self.drive_brightness(level).await?;
            debug!("{} resumed to {:.1}", self.model.name, level);
        }
        // Cached LED properties are stale after the dark period
        for led in self.leds.lock().values() {
            led.refresh();
        }
        Ok(())
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend.lock().suspended
    }

    // === Standard queries ===

    pub async fn firmware_version(&self) -> Result<FirmwareVersion, DeviceError> {
        let resp = self
            .runner
            .run_with_result(&commands::standard::GET_FIRMWARE_VERSION, &[])
            .await?;
        if resp.len() < 2 {
            return Err(DeviceError::UnexpectedResponse(
                "firmware version response too short".into(),
            ));
        }
        Ok(FirmwareVersion {
            major: resp[0],
            minor: resp[1],
        })
    }

    /// Device serial number, NUL padding stripped.
    pub async fn serial_number(&self) -> Result<String, DeviceError> {
        let resp = self
            .runner
            .run_with_result(&commands::standard::GET_SERIAL, &[])
            .await?;
        let end = resp.iter().position(|&b| b == 0).unwrap_or(resp.len());
        Ok(String::from_utf8_lossy(&resp[..end]).into_owned())
    }

    /// Switch between normal (0x00) and driver (0x03) device modes.
    pub async fn set_device_mode(&self, mode: u8, param: u8) -> Result<(), DeviceError> {
        self.runner
            .run_command(
                &commands::standard::SET_DEVICE_MODE,
                &[Argument::Byte(mode), Argument::Byte(param)],
            )
            .await?;
        Ok(())
    }

    pub async fn get_device_mode(&self) -> Result<(u8, u8), DeviceError> {
        let resp = self
            .runner
            .run_with_result(&commands::standard::GET_DEVICE_MODE, &[])
            .await?;
        if resp.len() < 2 {
            return Err(DeviceError::UnexpectedResponse(
                "device mode response too short".into(),
            ));
        }
        Ok((resp[0], resp[1]))
    }

    // === Frame buffer ===

    /// Upload one row of the addressable lighting matrix.
    ///
    /// Wire args are `(frame id, row, start column, end column, colors)`.
    pub async fn write_frame_row(&self, row: u8, colors: &[Rgb]) -> Result<(), DeviceError> {
        let Some((rows, cols)) = self.model.matrix else {
            return Err(DeviceError::NotSupported {
                model: self.model.name,
                feature: "addressable lighting matrix",
            });
        };
        if row >= rows {
            return Err(DeviceError::InvalidParameter(format!(
                "row {row} out of range (matrix has {rows} rows)"
            )));
        }
        if colors.is_empty() || colors.len() > cols as usize {
            return Err(DeviceError::InvalidParameter(format!(
                "row width {} out of range (matrix has {} columns)",
                colors.len(),
                cols
            )));
        }

        self.runner
            .run_command(
                &commands::frame::SET_FRAME_DATA,
                &[
                    Argument::Byte(commands::frame::FRAME_ID_RAW),
                    Argument::Byte(row),
                    Argument::Byte(0),
                    Argument::Byte((colors.len() - 1) as u8),
                    Argument::Colors(colors.to_vec()),
                ],
            )
            .await?;
        Ok(())
    }
}
