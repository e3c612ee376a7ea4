//! Device discovery
//!
//! Walks the hidapi enumeration, matches VID/PID pairs against the model
//! registry, and opens the control interface for a selected device. Most
//! hardware exposes several HID interfaces; feature-report commands are
//! accepted on the lowest-numbered one.

use std::ffi::CString;
use std::sync::Arc;

use anyhow::{Context, Result};
use hidapi::HidApi;
use tracing::debug;

use chroma_device::{find_model, ChromaDevice, Model};
use chroma_protocol::HidTransport;

/// One supported device found during enumeration, not yet opened.
pub struct Discovered {
    pub model: &'static Model,
    pub path: CString,
    pub interface: i32,
}

/// All supported devices currently connected, one entry per physical
/// device, in stable enumeration order.
pub fn enumerate(api: &HidApi) -> Vec<Discovered> {
    let mut found: Vec<Discovered> = Vec::new();
    for info in api.device_list() {
        let Some(model) = find_model(info.vendor_id(), info.product_id()) else {
            continue;
        };
        debug!(
            "candidate {} at {:?} interface {}",
            model.name,
            info.path(),
            info.interface_number()
        );
        match found
            .iter_mut()
            .find(|d| d.model.vid == model.vid && d.model.pid == model.pid)
        {
            Some(existing) if info.interface_number() < existing.interface => {
                existing.path = info.path().to_owned();
                existing.interface = info.interface_number();
            }
            Some(_) => {}
            None => found.push(Discovered {
                model,
                path: info.path().to_owned(),
                interface: info.interface_number(),
            }),
        }
    }
    found
}

/// Open a discovered device and wrap it in a device handle.
pub fn open(api: &HidApi, discovered: &Discovered) -> Result<ChromaDevice> {
    let hid = api
        .open_path(&discovered.path)
        .with_context(|| format!("opening {}", discovered.model.name))?;
    let transport = Arc::new(HidTransport::new(hid, discovered.model.report_len));
    Ok(ChromaDevice::new(transport, discovered.model))
}
