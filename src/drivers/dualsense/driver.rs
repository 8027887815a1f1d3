use std::{error::Error, ffi::CStr};

use hidapi::HidDevice;

// Source: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-playstation.c
pub const DS5_EDGE_PID: u16 = 0x0df2;

pub const DS5_VID: u16 = 0x054c;
pub const DS5_PID: u16 = 0x0ce6;

pub const PIDS: [u16; 2] = [DS5_EDGE_PID, DS5_PID];

/// A writable channel to one controller, held only for the duration of a
/// single report exchange. Implemented by the hidraw [Driver]; tests provide
/// in-memory fakes.
pub trait TransmitChannel {
    /// Whether the channel can accept output reports.
    fn writable(&self) -> bool;

    /// Write one report to the device, blocking until it is handed off.
    fn transmit(&mut self, data: &[u8]) -> Result<usize, Box<dyn Error + Send + Sync>>;
}

/// Write-only DualSense driver for applying trigger effect reports.
pub struct Driver {
    device: HidDevice,
}

impl Driver {
    /// Open the device at the given hidraw path. The channel is closed again
    /// when the driver is dropped.
    pub fn new(path: &CStr) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let api = hidapi::HidApi::new()?;
        let device = api.open_path(path)?;
        let info = device.get_device_info()?;
        let vid = info.vendor_id();
        let pid = info.product_id();
        if vid != DS5_VID || !PIDS.contains(&pid) {
            return Err(format!(
                "Device '{path:?}' is not a DualSense Controller: {vid}:{pid}"
            )
            .into());
        }

        Ok(Self { device })
    }
}

impl TransmitChannel for Driver {
    /// hidraw has no explicit writability flag, so this only verifies the
    /// open handle is still alive. The check is part of the channel contract;
    /// other implementations can report a real writability state here.
    fn writable(&self) -> bool {
        self.device.get_device_info().is_ok()
    }

    fn transmit(&mut self, data: &[u8]) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Ok(self.device.write(data)?)
    }
}
