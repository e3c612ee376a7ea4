//! hidapi-backed transport
//!
//! Commands travel as HID feature reports on the device's control
//! interface. hidapi wants a report number prepended to the frame on both
//! directions; the device uses report number 0.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use async_trait::async_trait;
use hidapi::HidDevice;
use tracing::debug;

use crate::error::TransportError;
use crate::Transport;

/// HID report number used for feature reports.
const REPORT_NUMBER: u8 = 0;

/// Poll interval while waiting for the firmware to fill the response
/// buffer.
const POLL_INTERVAL_MS: u64 = 10;

/// Feature-report transport over a single opened HID device.
pub struct HidTransport {
    device: Mutex<HidDevice>,
    report_len: usize,
}

impl HidTransport {
    /// Wrap an opened HID device.
    ///
    /// `report_len` is the device family's fixed frame length, excluding
    /// the report number.
    pub fn new(device: HidDevice, report_len: usize) -> Self {
        Self {
            device: Mutex::new(device),
            report_len,
        }
    }
}

#[async_trait]
impl Transport for HidTransport {
    async fn send(&self, report: &[u8]) -> Result<(), TransportError> {
        let mut buf = Vec::with_capacity(report.len() + 1);
        buf.push(REPORT_NUMBER);
        buf.extend_from_slice(report);

        let device = self.device.lock();
        device.send_feature_report(&buf)?;
        debug!("sent {} byte feature report", report.len());
        Ok(())
    }

    async fn receive(&self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let device = self.device.lock();
                let mut buf = vec![0u8; self.report_len + 1];
                buf[0] = REPORT_NUMBER;
                let read = device.get_feature_report(&mut buf)?;
                // An all-zero frame means the firmware has not produced a
                // response yet; keep polling until the deadline.
                if read > 1 && buf[1..read].iter().any(|&b| b != 0) {
                    return Ok(buf[1..].to_vec());
                }
            }
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout);
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }
}
