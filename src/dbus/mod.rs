use tokio::sync::{mpsc, oneshot};
use zbus::fdo;
use zbus_macros::interface;

use crate::drivers::dualsense::effect::TriggerEffect;
use crate::effects::message::{Command, DeviceEntry};

/// The [TriggerEffectsInterface] provides a DBus interface for applying
/// adaptive trigger effects. It works by sending command messages to a
/// channel that the [BridgeManager](crate::effects::manager::BridgeManager)
/// is listening on.
pub struct TriggerEffectsInterface {
    tx: mpsc::Sender<Command>,
}

impl TriggerEffectsInterface {
    pub fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    async fn apply(
        &self,
        side: String,
        effect: TriggerEffect,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let (sender, receiver) = oneshot::channel();
        self.tx
            .send(Command::ApplyEffect {
                side,
                effect,
                controller_index,
                sender,
            })
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        receiver
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))
    }
}

#[interface(name = "org.triggerbridge.TriggerEffects")]
impl TriggerEffectsInterface {
    async fn off(&self, side: String, controller_index: i32) -> fdo::Result<bool> {
        self.apply(side, TriggerEffect::Off, controller_index).await
    }

    async fn feedback(
        &self,
        side: String,
        position: u8,
        strength: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::Feedback { position, strength };
        self.apply(side, effect, controller_index).await
    }

    async fn weapon(
        &self,
        side: String,
        start_position: u8,
        end_position: u8,
        strength: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::Weapon {
            start_position,
            end_position,
            strength,
        };
        self.apply(side, effect, controller_index).await
    }

    async fn vibration(
        &self,
        side: String,
        position: u8,
        amplitude: u8,
        frequency: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::Vibration {
            position,
            amplitude,
            frequency,
        };
        self.apply(side, effect, controller_index).await
    }

    async fn multiple_position_feedback(
        &self,
        side: String,
        strength: Vec<u8>,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::MultiplePositionFeedback { strength };
        self.apply(side, effect, controller_index).await
    }

    async fn slope_feedback(
        &self,
        side: String,
        start_position: u8,
        end_position: u8,
        start_strength: u8,
        end_strength: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::SlopeFeedback {
            start_position,
            end_position,
            start_strength,
            end_strength,
        };
        self.apply(side, effect, controller_index).await
    }

    async fn multiple_position_vibration(
        &self,
        side: String,
        frequency: u8,
        amplitude: Vec<u8>,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::MultiplePositionVibration {
            frequency,
            amplitude,
        };
        self.apply(side, effect, controller_index).await
    }

    async fn bow(
        &self,
        side: String,
        start_position: u8,
        end_position: u8,
        strength: u8,
        snap_force: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::Bow {
            start_position,
            end_position,
            strength,
            snap_force,
        };
        self.apply(side, effect, controller_index).await
    }

    async fn galloping(
        &self,
        side: String,
        start_position: u8,
        end_position: u8,
        first_foot: u8,
        second_foot: u8,
        frequency: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::Galloping {
            start_position,
            end_position,
            first_foot,
            second_foot,
            frequency,
        };
        self.apply(side, effect, controller_index).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn machine(
        &self,
        side: String,
        start_position: u8,
        end_position: u8,
        amplitude_a: u8,
        amplitude_b: u8,
        frequency: u8,
        period: u8,
        controller_index: i32,
    ) -> fdo::Result<bool> {
        let effect = TriggerEffect::Machine {
            start_position,
            end_position,
            amplitude_a,
            amplitude_b,
            frequency,
            period,
        };
        self.apply(side, effect, controller_index).await
    }

    async fn has_device(&self) -> fdo::Result<bool> {
        let (sender, receiver) = oneshot::channel();
        self.tx
            .send(Command::HasDevice { sender })
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        receiver
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))
    }

    async fn list_devices(&self) -> fdo::Result<Vec<DeviceEntry>> {
        let (sender, receiver) = oneshot::channel();
        self.tx
            .send(Command::ListDevices { sender })
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        receiver
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))
    }
}
