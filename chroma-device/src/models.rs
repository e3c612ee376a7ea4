//! Hardware model registry
//!
//! Maps USB VID/PID pairs to the model's family, lighting matrix, and the
//! quirk flags that drive protocol behavior. Quirks never change code
//! paths structurally; they only select transaction code, pacing, frame
//! length, and which LED carries the device's master brightness.

use std::time::Duration;

use chroma_protocol::{timing, FrameConfig, RunnerOptions};

use crate::led::LedType;

/// Razer's USB vendor id.
pub const VENDOR_ID: u16 = 0x1532;

/// Broad hardware category a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Keyboard,
    Laptop,
    Mouse,
    Mousepad,
    Headset,
}

/// Per-model firmware oddities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quirk {
    /// Master brightness lives on the scroll wheel LED
    ScrollWheelBrightness,
    /// Master brightness lives on the logo LED
    LogoLedBrightness,
    /// Firmware expects transaction code 0x3F instead of 0xFF
    TransactionCode3f,
    /// Firmware drops back-to-back reports without a gap
    CommandPacing,
    /// Non-standard report frame length
    CustomFrameLength,
}

/// How a model exposes its master brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessStrategy {
    /// Brightness is a property of one LED
    Led(LedType),
    /// Dedicated brightness command pair (laptop keyboards)
    Dedicated,
}

/// Hardware model definition
#[derive(Debug, Clone, Copy)]
pub struct Model {
    pub vid: u16,
    pub pid: u16,
    pub name: &'static str,
    pub family: Family,
    pub quirks: &'static [Quirk],
    /// Lighting matrix dimensions (rows, columns), when addressable
    pub matrix: Option<(u8, u8)>,
    /// Report frame length for this model
    pub report_len: usize,
}

/// All supported models
/// Add new hardware here once its quirks are confirmed
pub const MODELS: &[Model] = &[
    Model {
        vid: VENDOR_ID,
        pid: 0x0203,
        name: "BlackWidow Chroma",
        family: Family::Keyboard,
        quirks: &[],
        matrix: Some((6, 22)),
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0209,
        name: "BlackWidow Chroma Tournament Edition",
        family: Family::Keyboard,
        quirks: &[],
        matrix: Some((6, 22)),
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0205,
        name: "Blade Stealth",
        family: Family::Laptop,
        quirks: &[],
        matrix: Some((6, 16)),
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0210,
        name: "Blade Pro",
        family: Family::Laptop,
        quirks: &[Quirk::CommandPacing],
        matrix: Some((6, 25)),
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0043,
        name: "DeathAdder Chroma",
        family: Family::Mouse,
        quirks: &[Quirk::ScrollWheelBrightness, Quirk::TransactionCode3f],
        matrix: None,
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0044,
        name: "Mamba",
        family: Family::Mouse,
        quirks: &[Quirk::LogoLedBrightness, Quirk::CommandPacing],
        matrix: None,
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0C00,
        name: "Firefly",
        family: Family::Mousepad,
        quirks: &[],
        matrix: Some((1, 15)),
        report_len: chroma_protocol::DEFAULT_REPORT_LEN,
    },
    Model {
        vid: VENDOR_ID,
        pid: 0x0504,
        name: "Kraken 7.1 Chroma",
        family: Family::Headset,
        quirks: &[Quirk::CustomFrameLength],
        matrix: None,
        report_len: 64,
    },
];

/// Find a model definition by VID/PID
pub fn find_model(vid: u16, pid: u16) -> Option<&'static Model> {
    MODELS.iter().find(|m| m.vid == vid && m.pid == pid)
}

/// Check whether a VID/PID pair is supported
pub fn is_supported(vid: u16, pid: u16) -> bool {
    find_model(vid, pid).is_some()
}

impl Model {
    pub fn has_quirk(&self, quirk: Quirk) -> bool {
        self.quirks.contains(&quirk)
    }

    /// Frame parameters for this model's firmware.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            report_len: self.report_len,
            ..FrameConfig::default()
        }
    }

    /// Runner behavior derived from the quirk set.
    pub fn runner_options(&self) -> RunnerOptions {
        let default_tx_id = if self.has_quirk(Quirk::TransactionCode3f) {
            timing::TX_ID_3F
        } else {
            timing::DEFAULT_TX_ID
        };
        let min_command_gap = self
            .has_quirk(Quirk::CommandPacing)
            .then(|| Duration::from_millis(timing::COMMAND_GAP_MS));
        RunnerOptions {
            default_tx_id,
            min_command_gap,
            ..RunnerOptions::default()
        }
    }

    /// Where this model keeps its master brightness.
    ///
    /// The quirk flags override the default backlight LED; laptops use a
    /// dedicated command pair instead of any LED.
    pub fn brightness_strategy(&self) -> BrightnessStrategy {
        if self.family == Family::Laptop {
            BrightnessStrategy::Dedicated
        } else if self.has_quirk(Quirk::ScrollWheelBrightness) {
            BrightnessStrategy::Led(LedType::ScrollWheel)
        } else if self.has_quirk(Quirk::LogoLedBrightness) {
            BrightnessStrategy::Led(LedType::Logo)
        } else {
            BrightnessStrategy::Led(LedType::Backlight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_hardware() {
        let model = find_model(VENDOR_ID, 0x0203).unwrap();
        assert_eq!(model.name, "BlackWidow Chroma");
        assert!(find_model(VENDOR_ID, 0xFFFF).is_none());
        assert!(!is_supported(0x046D, 0x0203));
    }

    #[test]
    fn quirks_select_transaction_code_and_pacing() {
        let deathadder = find_model(VENDOR_ID, 0x0043).unwrap();
        let opts = deathadder.runner_options();
        assert_eq!(opts.default_tx_id, timing::TX_ID_3F);
        assert_eq!(opts.min_command_gap, None);

        let mamba = find_model(VENDOR_ID, 0x0044).unwrap();
        let opts = mamba.runner_options();
        assert_eq!(opts.default_tx_id, timing::DEFAULT_TX_ID);
        assert_eq!(
            opts.min_command_gap,
            Some(Duration::from_millis(timing::COMMAND_GAP_MS))
        );
    }

    #[test]
    fn brightness_strategy_follows_family_and_quirks() {
        let keyboard = find_model(VENDOR_ID, 0x0203).unwrap();
        assert_eq!(
            keyboard.brightness_strategy(),
            BrightnessStrategy::Led(LedType::Backlight)
        );

        let laptop = find_model(VENDOR_ID, 0x0205).unwrap();
        assert_eq!(laptop.brightness_strategy(), BrightnessStrategy::Dedicated);

        let deathadder = find_model(VENDOR_ID, 0x0043).unwrap();
        assert_eq!(
            deathadder.brightness_strategy(),
            BrightnessStrategy::Led(LedType::ScrollWheel)
        );

        let mamba = find_model(VENDOR_ID, 0x0044).unwrap();
        assert_eq!(
            mamba.brightness_strategy(),
            BrightnessStrategy::Led(LedType::Logo)
        );
    }

    #[test]
    fn custom_frame_length_reaches_the_frame_config() {
        let kraken = find_model(VENDOR_ID, 0x0504).unwrap();
        assert!(kraken.has_quirk(Quirk::CustomFrameLength));
        assert_eq!(kraken.frame_config().report_len, 64);

        let firefly = find_model(VENDOR_ID, 0x0C00).unwrap();
        assert_eq!(
            firefly.frame_config().report_len,
            chroma_protocol::DEFAULT_REPORT_LEN
        );
    }
}
