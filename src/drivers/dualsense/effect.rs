use std::str::FromStr;

/// Which trigger an effect targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Right,
    Left,
    Both,
}

impl FromStr for Side {
    type Err = String;

    /// Parse a side token. Tokens are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" | "r" => Ok(Side::Right),
            "left" | "l" => Ok(Side::Left),
            "both" | "b" => Ok(Side::Both),
            other => Err(other.to_string()),
        }
    }
}

/// One adaptive trigger effect with its parameters. Each variant maps to one
/// effect family understood by the trigger firmware; the numeric byte layout
/// is produced by an [EffectEncoder](super::generator::EffectEncoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEffect {
    Off,
    Feedback {
        position: u8,
        strength: u8,
    },
    Weapon {
        start_position: u8,
        end_position: u8,
        strength: u8,
    },
    Vibration {
        position: u8,
        amplitude: u8,
        frequency: u8,
    },
    /// Per-zone feedback strength. The table must have one entry for each of
    /// the 10 trigger zones.
    MultiplePositionFeedback {
        strength: Vec<u8>,
    },
    SlopeFeedback {
        start_position: u8,
        end_position: u8,
        start_strength: u8,
        end_strength: u8,
    },
    /// Per-zone vibration amplitude, 10 entries.
    MultiplePositionVibration {
        frequency: u8,
        amplitude: Vec<u8>,
    },
    Bow {
        start_position: u8,
        end_position: u8,
        strength: u8,
        snap_force: u8,
    },
    Galloping {
        start_position: u8,
        end_position: u8,
        first_foot: u8,
        second_foot: u8,
        frequency: u8,
    },
    Machine {
        start_position: u8,
        end_position: u8,
        amplitude_a: u8,
        amplitude_b: u8,
        frequency: u8,
        period: u8,
    },
}
