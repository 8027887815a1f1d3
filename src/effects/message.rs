use tokio::sync::oneshot;

use crate::drivers::dualsense::effect::TriggerEffect;

/// Per-device info returned to IPC clients: product name, manufacturer,
/// vendor id, product id.
pub type DeviceEntry = (String, String, u16, u16);

/// Commands define all the different ways to interact with [BridgeManager]
/// over a channel. These commands are processed sequentially by the manager
/// task, which owns all of the bridge state.
#[derive(Debug)]
pub enum Command {
    ApplyEffect {
        side: String,
        effect: TriggerEffect,
        controller_index: i32,
        sender: oneshot::Sender<bool>,
    },
    HasDevice {
        sender: oneshot::Sender<bool>,
    },
    ListDevices {
        sender: oneshot::Sender<Vec<DeviceEntry>>,
    },
    HidRawAdded {
        name: String,
    },
    HidRawRemoved {
        name: String,
    },
    Stop,
}
