use std::error::Error;
use std::ffi::{CStr, CString};
use std::sync::Arc;

use hidapi::{DeviceInfo, HidApi};

use crate::drivers::dualsense::driver::{DS5_VID, PIDS};

/// Identity of one connected controller. The registry owns the descriptor;
/// dispatch borrows it for a single report exchange.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    path: CString,
    product_name: String,
    manufacturer: String,
    vendor_id: u16,
    product_id: u16,
}

impl DeviceDescriptor {
    pub fn path(&self) -> &CStr {
        &self.path
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }
}

#[cfg(test)]
impl DeviceDescriptor {
    /// Descriptor for a controller that does not exist, for exercising the
    /// dispatch and reset paths against fake channels.
    pub(crate) fn fake(name: &str) -> Self {
        Self {
            path: CString::new(format!("/dev/hidraw-{name}")).unwrap(),
            product_name: name.to_string(),
            manufacturer: "Sony".to_string(),
            vendor_id: DS5_VID,
            product_id: PIDS[0],
        }
    }
}

impl From<&DeviceInfo> for DeviceDescriptor {
    fn from(info: &DeviceInfo) -> Self {
        Self {
            path: info.path().to_owned(),
            product_name: info.product_string().unwrap_or_default().to_string(),
            manufacturer: info.manufacturer_string().unwrap_or_default().to_string(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
        }
    }
}

/// Tracks the currently connected DualSense controllers.
///
/// The device list is replaced with a fresh allocation on every scan, so a
/// dispatch call holding a snapshot keeps iterating its own list even when a
/// hot-plug rescan happens underneath it.
pub struct DeviceRegistry {
    api: Option<HidApi>,
    devices: Arc<Vec<DeviceDescriptor>>,
}

impl DeviceRegistry {
    /// Returns a new, empty registry. The underlying HID context is created
    /// lazily on the first scan.
    pub fn new() -> Self {
        Self {
            api: None,
            devices: Arc::new(Vec::new()),
        }
    }

    /// Re-enumerate connected devices and swap in the new list.
    pub fn scan(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let api = match self.api {
            Some(ref mut api) => api,
            None => self.api.insert(HidApi::new()?),
        };
        api.refresh_devices()?;

        let devices: Vec<DeviceDescriptor> = api
            .device_list()
            .filter(|info| info.vendor_id() == DS5_VID && PIDS.contains(&info.product_id()))
            .map(DeviceDescriptor::from)
            .collect();

        if devices.is_empty() {
            log::info!("No DualSense found.");
        } else {
            let plural = if devices.len() > 1 { "s" } else { "" };
            log::info!("{} DualSense{} found.", devices.len(), plural);
            for (index, device) in devices.iter().enumerate() {
                log::debug!(
                    "DualSense #{index}: {} ({}) [{:04x}:{:04x}]",
                    device.product_name(),
                    device.manufacturer(),
                    device.vendor_id(),
                    device.product_id()
                );
            }
        }

        self.devices = Arc::new(devices);
        Ok(())
    }

    /// Snapshot of the current device list.
    pub fn devices(&self) -> Arc<Vec<DeviceDescriptor>> {
        self.devices.clone()
    }

    pub fn has_device(&self) -> bool {
        !self.devices.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn set_devices(&mut self, devices: Vec<DeviceDescriptor>) {
        self.devices = Arc::new(devices);
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
