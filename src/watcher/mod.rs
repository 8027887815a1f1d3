use inotify::{EventMask, Inotify, WatchMask};
use tokio::sync::mpsc::Sender;

#[derive(Debug, Clone)]
pub enum WatchEvent {
    Create { name: String },
    Delete { name: String },
}

/// Watch for node changes on the given path, sending [WatchEvent] to the
/// given channel. Blocks forever; run this on a dedicated thread.
pub fn watch(path: String, tx: Sender<WatchEvent>) {
    let mut inotify = match Inotify::init() {
        Ok(inotify) => inotify,
        Err(e) => {
            log::error!("Failed to initialize inotify: {e:?}");
            return;
        }
    };

    if let Err(e) = inotify
        .watches()
        .add(path.clone(), WatchMask::CREATE | WatchMask::DELETE)
    {
        log::error!("Unable to add inotify watcher for path: {path}. Got error {e:?}");
        return;
    }

    let mut buffer = [0u8; 4096];
    loop {
        let events = match inotify.read_events_blocking(&mut buffer) {
            Ok(events) => events,
            Err(e) => {
                log::error!("Failed to read inotify events: {e:?}");
                return;
            }
        };

        for event in events {
            let Some(name) = event.name.and_then(|n| n.to_str()) else {
                continue;
            };
            let name = name.to_string();

            let value = if event.mask.contains(EventMask::CREATE) {
                log::debug!("inotify CREATE: {path}/{name}");
                WatchEvent::Create { name }
            } else if event.mask.contains(EventMask::DELETE) {
                log::debug!("inotify DELETE: {path}/{name}");
                WatchEvent::Delete { name }
            } else {
                continue;
            };

            if let Err(e) = tx.blocking_send(value) {
                log::error!("Error sending event: {e}");
                return;
            }
        }
    }
}
