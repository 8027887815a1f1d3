use clap::{Parser, Subcommand};

use crate::drivers::dualsense::effect::TriggerEffect;

#[derive(Parser, Debug)]
#[command(name = "triggerbridge", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file to use
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the DBus bridge daemon (the default)
    Daemon,
    /// List connected controllers
    Devices,
    /// Apply one trigger effect and exit
    Apply(ApplyArgs),
    /// Force both triggers off on every connected controller
    Reset,
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    /// Trigger side: "right"/"r", "left"/"l" or "both"/"b"
    #[arg(long, default_value = "both")]
    pub side: String,

    /// Controller to target
    #[arg(long, default_value_t = 0)]
    pub index: i32,

    #[command(subcommand)]
    pub effect: EffectCommand,
}

#[derive(Subcommand, Debug)]
pub enum EffectCommand {
    /// Turn the trigger effect off
    Off,
    /// Constant resistance from a position onward
    Feedback { position: u8, strength: u8 },
    /// Resistance between two positions that releases like a trigger pull
    Weapon {
        start_position: u8,
        end_position: u8,
        strength: u8,
    },
    /// Vibration from a position onward
    Vibration {
        position: u8,
        amplitude: u8,
        frequency: u8,
    },
    /// Per-zone resistance, one strength value for each of the 10 zones
    MultiplePositionFeedback {
        #[arg(num_args = 10)]
        strength: Vec<u8>,
    },
    /// Resistance ramping between two positions
    SlopeFeedback {
        start_position: u8,
        end_position: u8,
        start_strength: u8,
        end_strength: u8,
    },
    /// Per-zone vibration, one amplitude value for each of the 10 zones
    MultiplePositionVibration {
        frequency: u8,
        #[arg(num_args = 10)]
        amplitude: Vec<u8>,
    },
    /// Draw-and-snap effect between two positions
    Bow {
        start_position: u8,
        end_position: u8,
        strength: u8,
        snap_force: u8,
    },
    /// Alternating two-beat vibration between two positions
    Galloping {
        start_position: u8,
        end_position: u8,
        first_foot: u8,
        second_foot: u8,
        frequency: u8,
    },
    /// Dual-amplitude machine vibration between two positions
    Machine {
        start_position: u8,
        end_position: u8,
        amplitude_a: u8,
        amplitude_b: u8,
        frequency: u8,
        period: u8,
    },
}

impl EffectCommand {
    pub fn to_effect(&self) -> TriggerEffect {
        match self {
            EffectCommand::Off => TriggerEffect::Off,
            EffectCommand::Feedback { position, strength } => TriggerEffect::Feedback {
                position: *position,
                strength: *strength,
            },
            EffectCommand::Weapon {
                start_position,
                end_position,
                strength,
            } => TriggerEffect::Weapon {
                start_position: *start_position,
                end_position: *end_position,
                strength: *strength,
            },
            EffectCommand::Vibration {
                position,
                amplitude,
                frequency,
            } => TriggerEffect::Vibration {
                position: *position,
                amplitude: *amplitude,
                frequency: *frequency,
            },
            EffectCommand::MultiplePositionFeedback { strength } => {
                TriggerEffect::MultiplePositionFeedback {
                    strength: strength.clone(),
                }
            }
            EffectCommand::SlopeFeedback {
                start_position,
                end_position,
                start_strength,
                end_strength,
            } => TriggerEffect::SlopeFeedback {
                start_position: *start_position,
                end_position: *end_position,
                start_strength: *start_strength,
                end_strength: *end_strength,
            },
            EffectCommand::MultiplePositionVibration {
                frequency,
                amplitude,
            } => TriggerEffect::MultiplePositionVibration {
                frequency: *frequency,
                amplitude: amplitude.clone(),
            },
            EffectCommand::Bow {
                start_position,
                end_position,
                strength,
                snap_force,
            } => TriggerEffect::Bow {
                start_position: *start_position,
                end_position: *end_position,
                strength: *strength,
                snap_force: *snap_force,
            },
            EffectCommand::Galloping {
                start_position,
                end_position,
                first_foot,
                second_foot,
                frequency,
            } => TriggerEffect::Galloping {
                start_position: *start_position,
                end_position: *end_position,
                first_foot: *first_foot,
                second_foot: *second_foot,
                frequency: *frequency,
            },
            EffectCommand::Machine {
                start_position,
                end_position,
                amplitude_a,
                amplitude_b,
                frequency,
                period,
            } => TriggerEffect::Machine {
                start_position: *start_position,
                end_position: *end_position,
                amplitude_a: *amplitude_a,
                amplitude_b: *amplitude_b,
                frequency: *frequency,
                period: *period,
            },
        }
    }
}
