use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::drivers::dualsense::driver::{Driver, TransmitChannel};
use crate::drivers::dualsense::effect::{Side, TriggerEffect};
use crate::drivers::dualsense::generator::{EffectEncoder, TriggerEffectGenerator};
use crate::drivers::dualsense::hid_report::{
    EffectReport, LEFT_TRIGGER_OFFSET, RIGHT_TRIGGER_OFFSET,
};
use crate::effects::cache::EffectCache;
use crate::effects::registry::{DeviceDescriptor, DeviceRegistry};

/// All the ways applying an effect can fail. Every failure is handled locally
/// and surfaces to callers as a `false` result.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid DualSense index: {0}")]
    InvalidIndex(i32),
    #[error("Failed to open DualSense #{0}: {1}")]
    DeviceOpen(usize, String),
    #[error("DualSense #{0} is not writable.")]
    NotWritable(usize),
    #[error("Invalid trigger side: {0}")]
    InvalidSide(String),
    #[error("Error while sending data: {0}")]
    Transmit(String),
}

/// Opens a [TransmitChannel] to the controller a descriptor points at.
pub(crate) type ChannelOpener =
    Box<dyn Fn(&DeviceDescriptor) -> Result<Box<dyn TransmitChannel>, Box<dyn Error + Send + Sync>>>;

fn hidraw_opener() -> ChannelOpener {
    Box::new(|descriptor: &DeviceDescriptor| {
        let driver = Driver::new(descriptor.path())?;
        Ok(Box::new(driver) as Box<dyn TransmitChannel>)
    })
}

/// The trigger effect dispatcher.
///
/// Owns the device registry and the last-sent report cache and drives the
/// whole report exchange: validate the target, open a channel, build the
/// working report from the cache, hand the effect to the encoder at the
/// offsets the side maps to, transmit, and commit the cache on success.
pub struct Bridge {
    config: Config,
    registry: DeviceRegistry,
    cache: EffectCache,
    encoder: Box<dyn EffectEncoder>,
    opener: ChannelOpener,
}

impl Bridge {
    pub fn new(config: Config) -> Self {
        Self::with_encoder(config, Box::new(TriggerEffectGenerator))
    }

    pub(crate) fn with_encoder(config: Config, encoder: Box<dyn EffectEncoder>) -> Self {
        Self {
            config,
            registry: DeviceRegistry::new(),
            cache: EffectCache::new(),
            encoder,
            opener: hidraw_opener(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Re-enumerate connected controllers. Called on startup and whenever the
    /// hot-plug watcher signals a change.
    pub fn rescan(&mut self) {
        if let Err(e) = self.registry.scan() {
            log::error!("Failed to scan for DualSense devices: {e:?}");
        }
    }

    pub fn has_device(&self) -> bool {
        self.registry.has_device()
    }

    pub fn devices(&self) -> Arc<Vec<DeviceDescriptor>> {
        self.registry.devices()
    }

    /// Apply a trigger effect to one controller.
    ///
    /// `side` is the raw side token ("right"/"r", "left"/"l", "both"/"b").
    /// Returns the encoder's verdict when the report made it to the device
    /// and `false` on any failure along the way.
    pub fn apply(&mut self, side: &str, effect: &TriggerEffect, controller_index: i32) -> bool {
        match self.try_apply(side, effect, controller_index) {
            Ok(result) => {
                if self.config.print_on_effect_apply {
                    log::info!(
                        "DualSense #{controller_index} - {side} trigger effect applied. Result: {result}"
                    );
                }
                result
            }
            Err(BridgeError::InvalidIndex(index)) => {
                if self.config.error_on_invalid_index {
                    log::error!("Invalid DualSense index: {index}");
                }
                false
            }
            Err(e) => {
                log::error!("{e}");
                false
            }
        }
    }

    fn try_apply(
        &mut self,
        side: &str,
        effect: &TriggerEffect,
        controller_index: i32,
    ) -> Result<bool, BridgeError> {
        let devices = self.registry.devices();
        if controller_index < 0 || controller_index as usize >= devices.len() {
            return Err(BridgeError::InvalidIndex(controller_index));
        }
        let index = controller_index as usize;

        // The channel is scoped to this exchange; dropping it closes the
        // device on every exit path.
        let mut channel = (self.opener)(&devices[index])
            .map_err(|e| BridgeError::DeviceOpen(index, e.to_string()))?;
        if !channel.writable() {
            return Err(BridgeError::NotWritable(index));
        }

        self.apply_to_channel(channel.as_mut(), side, effect)
    }

    /// The protocol core, split from [try_apply](Self::try_apply) so it can
    /// run against any [TransmitChannel].
    pub(crate) fn apply_to_channel(
        &mut self,
        channel: &mut dyn TransmitChannel,
        side: &str,
        effect: &TriggerEffect,
    ) -> Result<bool, BridgeError> {
        let side = Side::from_str(side).map_err(BridgeError::InvalidSide)?;

        let mut report = self.cache.snapshot();
        report.stamp_header();

        let result = match side {
            Side::Right => self
                .encoder
                .encode(report.buffer_mut(), RIGHT_TRIGGER_OFFSET, effect),
            Side::Left => self
                .encoder
                .encode(report.buffer_mut(), LEFT_TRIGGER_OFFSET, effect),
            Side::Both => {
                // Left first, then right. Both encodes always run; a failed
                // left encode must not skip the right one.
                let left = self
                    .encoder
                    .encode(report.buffer_mut(), LEFT_TRIGGER_OFFSET, effect);
                let right = self
                    .encoder
                    .encode(report.buffer_mut(), RIGHT_TRIGGER_OFFSET, effect);
                left && right
            }
        };

        channel
            .transmit(report.transmit_bytes())
            .map_err(|e| BridgeError::Transmit(e.to_string()))?;

        // The cache only ever holds reports the device actually accepted.
        self.cache.commit(report);

        Ok(result)
    }

    /// Force both triggers off on every known controller.
    ///
    /// Used on shutdown. The reports are built from scratch rather than from
    /// the cache, every device is attempted independently, and nothing is
    /// committed back.
    pub fn reset_all(&self) {
        let devices = self.registry.devices();
        for (index, descriptor) in devices.iter().enumerate() {
            let mut channel = match (self.opener)(descriptor) {
                Ok(channel) => channel,
                Err(e) => {
                    log::error!("Failed to open DualSense #{index} on exit: {e}");
                    continue;
                }
            };
            if !channel.writable() {
                log::error!("DualSense #{index} is not writable on exit.");
                continue;
            }

            match Self::reset_channel(self.encoder.as_ref(), channel.as_mut()) {
                Ok(()) => log::info!("DualSense #{index} triggers reset on exit."),
                Err(e) => log::error!("Error resetting DualSense #{index} on exit: {e}"),
            }
        }
    }

    /// Build and send a fresh all-off report over one channel.
    pub(crate) fn reset_channel(
        encoder: &dyn EffectEncoder,
        channel: &mut dyn TransmitChannel,
    ) -> Result<(), BridgeError> {
        let mut report = EffectReport::new();
        report.stamp_header();
        encoder.encode(report.buffer_mut(), RIGHT_TRIGGER_OFFSET, &TriggerEffect::Off);
        encoder.encode(report.buffer_mut(), LEFT_TRIGGER_OFFSET, &TriggerEffect::Off);

        channel
            .transmit(report.transmit_bytes())
            .map_err(|e| BridgeError::Transmit(e.to_string()))?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn last_sent(&self) -> EffectReport {
        self.cache.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn set_opener(&mut self, opener: ChannelOpener) {
        self.opener = opener;
    }

    #[cfg(test)]
    pub(crate) fn set_devices(&mut self, devices: Vec<DeviceDescriptor>) {
        self.registry.set_devices(devices);
    }
}
