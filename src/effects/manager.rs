use std::error::Error;

use tokio::sync::mpsc;

use crate::effects::bridge::Bridge;
use crate::effects::message::{Command, DeviceEntry};
use crate::watcher;
use crate::watcher::WatchEvent;

const DEV_PATH: &str = "/dev";
const BUFFER_SIZE: usize = 1024;

/// Runs the [Bridge] on its own task and dispatches [Command] messages to it.
///
/// All bridge state (HID context, device list, effect cache) lives on this
/// task, so apply calls from any number of IPC clients are serialized by the
/// command channel.
pub struct BridgeManager {
    bridge: Bridge,
    tx: mpsc::Sender<Command>,
    rx: mpsc::Receiver<Command>,
}

impl BridgeManager {
    pub fn new(bridge: Bridge) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        Self { bridge, tx, rx }
    }

    /// The transmit side of the command channel. Clone this to talk to the
    /// manager from other tasks.
    pub fn tx(&self) -> mpsc::Sender<Command> {
        self.tx.clone()
    }

    /// Perform the initial device scan, start watching for hot-plug events
    /// and process commands until [Command::Stop] arrives.
    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.watch_hidraw_devices();
        self.bridge.rescan();

        while let Some(cmd) = self.rx.recv().await {
            log::debug!("Received command: {:?}", cmd);
            match cmd {
                Command::ApplyEffect {
                    side,
                    effect,
                    controller_index,
                    sender,
                } => {
                    let result = self.bridge.apply(&side, &effect, controller_index);
                    if sender.send(result).is_err() {
                        log::error!("Unable to send apply result: channel closed");
                    }
                }
                Command::HasDevice { sender } => {
                    if sender.send(self.bridge.has_device()).is_err() {
                        log::error!("Unable to send device presence: channel closed");
                    }
                }
                Command::ListDevices { sender } => {
                    let entries: Vec<DeviceEntry> = self
                        .bridge
                        .devices()
                        .iter()
                        .map(|d| {
                            (
                                d.product_name().to_string(),
                                d.manufacturer().to_string(),
                                d.vendor_id(),
                                d.product_id(),
                            )
                        })
                        .collect();
                    if sender.send(entries).is_err() {
                        log::error!("Unable to send device list: channel closed");
                    }
                }
                Command::HidRawAdded { name } => {
                    log::debug!("hidraw device added: {name}");
                    self.bridge.rescan();
                }
                Command::HidRawRemoved { name } => {
                    log::debug!("hidraw device removed: {name}");
                    self.bridge.rescan();
                }
                Command::Stop => break,
            }
        }

        if self.bridge.config().reset_triggers_on_quit {
            self.bridge.reset_all();
        }

        Ok(())
    }

    /// Watch `/dev` for hidraw nodes coming and going and turn those into
    /// rescan commands.
    fn watch_hidraw_devices(&self) {
        let (watcher_tx, mut watcher_rx) = mpsc::channel(BUFFER_SIZE);
        // A plain thread rather than a blocking task; the inotify loop never
        // returns and must not hold up runtime shutdown.
        std::thread::spawn(move || {
            watcher::watch(DEV_PATH.to_string(), watcher_tx);
        });

        let cmd_tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = watcher_rx.recv().await {
                let cmd = match event {
                    WatchEvent::Create { name } if name.starts_with("hidraw") => {
                        Command::HidRawAdded { name }
                    }
                    WatchEvent::Delete { name } if name.starts_with("hidraw") => {
                        Command::HidRawRemoved { name }
                    }
                    _ => continue,
                };
                if let Err(e) = cmd_tx.send(cmd).await {
                    log::error!("Error sending command: {e}");
                    break;
                }
            }
        });
    }
}
