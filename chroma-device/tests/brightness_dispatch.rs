//! End-to-end device tests against a fake firmware.
//!
//! The mock transport parses request frames, keeps a tiny brightness
//! register file, and answers get commands with properly framed and
//! checksummed responses, so the full device → runner → codec path runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use chroma_device::{find_model, ChromaDevice, DeviceError, LedType, VENDOR_ID};
use chroma_protocol::{build_report, Command, FrameConfig, Rgb, Transport, TransportError};

struct FakeFirmware {
    config: FrameConfig,
    sent: Mutex<Vec<Vec<u8>>>,
    pending: Mutex<Option<Vec<u8>>>,
    led_brightness: Mutex<HashMap<u8, u8>>,
    dedicated_brightness: Mutex<u8>,
}

impl FakeFirmware {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            config: FrameConfig::default(),
            sent: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            led_brightness: Mutex::new(HashMap::new()),
            dedicated_brightness: Mutex::new(0),
        })
    }

    fn frames(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    fn last_frame(&self) -> Vec<u8> {
        self.sent.lock().last().cloned().expect("no frame sent")
    }

    fn respond(&self, tx: u8, class: u8, id: u8, args: &[u8]) {
        let command = Command::new(class, id, args.len() as u8);
        let frame = build_report(tx, &command, args, &self.config).unwrap();
        *self.pending.lock() = Some(frame);
    }
}

#[async_trait]
impl Transport for FakeFirmware {
    async fn send(&self, report: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().push(report.to_vec());

        let tx = report[0];
        let size = report[4] as usize;
        let (class, id) = (report[5], report[6]);
        let args = &report[7..7 + size];

        match (class, id) {
            // set / get LED brightness
            (0x03, 0x03) => {
                self.led_brightness.lock().insert(args[1], args[2]);
            }
            (0x03, 0x83) => {
                let value = self.led_brightness.lock().get(&args[1]).copied().unwrap_or(0);
                self.respond(tx, class, id, &[args[0], args[1], value]);
            }
            // dedicated laptop brightness pair
            (0x0E, 0x04) => {
                *self.dedicated_brightness.lock() = args[1];
            }
            (0x0E, 0x84) => {
                let value = *self.dedicated_brightness.lock();
                self.respond(tx, class, id, &[0x01, value]);
            }
            _ => {}
        }
        Ok(())
    }

    async fn receive(&self, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        self.pending.lock().take().ok_or(TransportError::Timeout)
    }
}

fn device(pid: u16) -> (ChromaDevice, Arc<FakeFirmware>) {
    let firmware = FakeFirmware::new();
    let model = find_model(VENDOR_ID, pid).unwrap();
    let device = ChromaDevice::new(Arc::clone(&firmware) as Arc<dyn Transport>, model);
    (device, firmware)
}

#[tokio::test]
async fn keyboard_brightness_drives_the_backlight_led() {
    let (device, firmware) = device(0x0203);
    device.set_brightness(50.0).await.unwrap();

    let frame = firmware.last_frame();
    assert_eq!(frame[5], 0x03); // LED class
    assert_eq!(frame[6], 0x03); // set brightness
    assert_eq!(frame[8], LedType::Backlight.wire_id());
    assert_eq!(frame[9], 128);
}

#[tokio::test]
async fn scroll_wheel_quirk_redirects_brightness_and_transaction_code() {
    let (device, firmware) = device(0x0043);
    device.set_brightness(100.0).await.unwrap();

    let frame = firmware.last_frame();
    assert_eq!(frame[0], 0x3F); // quirky transaction code
    assert_eq!(frame[8], LedType::ScrollWheel.wire_id());
    assert_eq!(frame[9], 255);
}

#[tokio::test]
async fn logo_quirk_redirects_brightness() {
    let (device, firmware) = device(0x0044);
    device.set_brightness(25.0).await.unwrap();

    let frame = firmware.last_frame();
    assert_eq!(frame[8], LedType::Logo.wire_id());
}

#[tokio::test]
async fn laptop_uses_the_dedicated_brightness_pair() {
    let (device, firmware) = device(0x0205);
    device.set_brightness(75.0).await.unwrap();

    let frame = firmware.last_frame();
    assert_eq!(frame[5], 0x0E);
    assert_eq!(frame[6], 0x04);
    assert_eq!(frame[8], 191); // 75% of 255, rounded

    let level = device.get_brightness().await.unwrap();
    assert!((level - 75.0).abs() <= 0.5, "round trip drifted: {level}");
}

#[tokio::test]
async fn brightness_round_trip_stays_within_one_native_unit() {
    let (device, _firmware) = device(0x0203);
    for level in [0.0f32, 12.3, 33.3, 50.0, 66.7, 99.9, 100.0] {
        device.set_brightness(level).await.unwrap();
        device.led(LedType::Backlight).refresh();
        let back = device.get_brightness().await.unwrap();
        // one native unit is 100/255 of a percent
        assert!(
            (back - level).abs() <= 0.5,
            "level {level} came back as {back}"
        );
    }
}

#[tokio::test]
async fn suspend_darkens_and_resume_restores() {
    let (device, firmware) = device(0x0203);
    device.set_brightness(80.0).await.unwrap();

    device.suspend().await.unwrap();
    assert!(device.is_suspended());
    assert_eq!(firmware.last_frame()[9], 0, "suspend must drive raw 0");

    // reads come from the saved level, writes only update it
    let saved = device.get_brightness().await.unwrap();
    assert!((saved - 80.0).abs() <= 0.5);

    let frames_before = firmware.frames().len();
    device.set_brightness(30.0).await.unwrap();
    assert_eq!(
        firmware.frames().len(),
        frames_before,
        "no hardware traffic while suspended"
    );

    device.resume().await.unwrap();
    assert!(!device.is_suspended());
    assert_eq!(firmware.last_frame()[9], 77); // 30% of 255, rounded

    device.led(LedType::Backlight).refresh();
    let restored = device.get_brightness().await.unwrap();
    assert!((restored - 30.0).abs() <= 0.5);
}

#[tokio::test]
async fn frame_row_upload_packs_the_row_descriptor_and_colors() {
    let (device, firmware) = device(0x0203);
    let row = [Rgb::new(10, 20, 30), Rgb::new(40, 50, 60)];
    device.write_frame_row(2, &row).await.unwrap();

    let frame = firmware.last_frame();
    assert_eq!(frame[5], 0x03);
    assert_eq!(frame[6], 0x0B);
    assert_eq!(frame[4], 4 + 6); // descriptor plus two colors
    assert_eq!(&frame[7..11], &[0xFF, 2, 0, 1]);
    assert_eq!(&frame[11..17], &[10, 20, 30, 40, 50, 60]);
}

#[tokio::test]
async fn frame_row_upload_rejects_bad_geometry() {
    let (keyboard, _firmware) = device(0x0203);

    let err = keyboard
        .write_frame_row(6, &[Rgb::new(1, 2, 3)])
        .await
        .unwrap_err();
    assert!(matches!(err, DeviceError::InvalidParameter(_)));

    let err = keyboard.write_frame_row(0, &[]).await.unwrap_err();
    assert!(matches!(err, DeviceError::InvalidParameter(_)));

    // mice have no addressable matrix
    let (mouse, _firmware) = device(0x0043);
    let err = mouse
        .write_frame_row(0, &[Rgb::new(1, 2, 3)])
        .await
        .unwrap_err();
    assert!(matches!(err, DeviceError::NotSupported { .. }));
}
