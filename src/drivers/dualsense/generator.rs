//! Encoding of [TriggerEffect] parameters into the 11-byte effect field of an
//! output report.
//!
//! Effect opcodes and zone packing follow the community documentation of the
//! trigger firmware. The trigger travel is divided into 10 zones; most
//! families pack an active-zone bitmask into the first two parameter bytes
//! and 3-bit force values into the following dword.

use super::effect::TriggerEffect;
use super::hid_report::{OUTPUT_REPORT_SIZE, TRIGGER_EFFECT_SIZE};

pub const EFFECT_OFF: u8 = 0x05;
pub const EFFECT_FEEDBACK: u8 = 0x21;
pub const EFFECT_BOW: u8 = 0x22;
pub const EFFECT_GALLOPING: u8 = 0x23;
pub const EFFECT_WEAPON: u8 = 0x25;
pub const EFFECT_VIBRATION: u8 = 0x26;
pub const EFFECT_MACHINE: u8 = 0x27;

/// Number of resistance zones along the trigger travel.
const ZONE_COUNT: usize = 10;

/// Contract for translating effect parameters into the trigger effect field
/// at a given report offset.
///
/// A successful encode writes exactly the 11 bytes starting at `offset` and
/// leaves every other byte of the report untouched. When the parameters are
/// rejected the encoder returns `false` without modifying the buffer at all.
pub trait EffectEncoder {
    fn encode(
        &self,
        buf: &mut [u8; OUTPUT_REPORT_SIZE],
        offset: usize,
        effect: &TriggerEffect,
    ) -> bool;
}

/// The stock encoder implementing all known effect families.
#[derive(Debug, Default)]
pub struct TriggerEffectGenerator;

impl EffectEncoder for TriggerEffectGenerator {
    fn encode(
        &self,
        buf: &mut [u8; OUTPUT_REPORT_SIZE],
        offset: usize,
        effect: &TriggerEffect,
    ) -> bool {
        match effect {
            TriggerEffect::Off => off(buf, offset),
            TriggerEffect::Feedback { position, strength } => {
                feedback(buf, offset, *position, *strength)
            }
            TriggerEffect::Weapon {
                start_position,
                end_position,
                strength,
            } => weapon(buf, offset, *start_position, *end_position, *strength),
            TriggerEffect::Vibration {
                position,
                amplitude,
                frequency,
            } => vibration(buf, offset, *position, *amplitude, *frequency),
            TriggerEffect::MultiplePositionFeedback { strength } => {
                multiple_position_feedback(buf, offset, strength)
            }
            TriggerEffect::SlopeFeedback {
                start_position,
                end_position,
                start_strength,
                end_strength,
            } => slope_feedback(
                buf,
                offset,
                *start_position,
                *end_position,
                *start_strength,
                *end_strength,
            ),
            TriggerEffect::MultiplePositionVibration {
                frequency,
                amplitude,
            } => multiple_position_vibration(buf, offset, *frequency, amplitude),
            TriggerEffect::Bow {
                start_position,
                end_position,
                strength,
                snap_force,
            } => bow(
                buf,
                offset,
                *start_position,
                *end_position,
                *strength,
                *snap_force,
            ),
            TriggerEffect::Galloping {
                start_position,
                end_position,
                first_foot,
                second_foot,
                frequency,
            } => galloping(
                buf,
                offset,
                *start_position,
                *end_position,
                *first_foot,
                *second_foot,
                *frequency,
            ),
            TriggerEffect::Machine {
                start_position,
                end_position,
                amplitude_a,
                amplitude_b,
                frequency,
                period,
            } => machine(
                buf,
                offset,
                *start_position,
                *end_position,
                *amplitude_a,
                *amplitude_b,
                *frequency,
                *period,
            ),
        }
    }
}

/// Zero the 11-byte effect window before writing a new effect into it.
fn clear_window(buf: &mut [u8; OUTPUT_REPORT_SIZE], offset: usize) {
    buf[offset..offset + TRIGGER_EFFECT_SIZE].fill(0);
}

fn write_zones(buf: &mut [u8; OUTPUT_REPORT_SIZE], offset: usize, zones: u16) {
    buf[offset + 1] = (zones & 0xFF) as u8;
    buf[offset + 2] = (zones >> 8) as u8;
}

fn off(buf: &mut [u8; OUTPUT_REPORT_SIZE], offset: usize) -> bool {
    clear_window(buf, offset);
    buf[offset] = EFFECT_OFF;
    true
}

fn feedback(buf: &mut [u8; OUTPUT_REPORT_SIZE], offset: usize, position: u8, strength: u8) -> bool {
    if position > 9 || strength > 8 || strength == 0 {
        return false;
    }
    let force = (strength - 1) & 0x07;
    let mut force_zones: u32 = 0;
    let mut active_zones: u16 = 0;
    for i in position as usize..ZONE_COUNT {
        force_zones |= (force as u32) << (3 * i);
        active_zones |= 1 << i;
    }

    clear_window(buf, offset);
    buf[offset] = EFFECT_FEEDBACK;
    write_zones(buf, offset, active_zones);
    buf[offset + 3..offset + 7].copy_from_slice(&force_zones.to_le_bytes());
    true
}

fn weapon(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    start_position: u8,
    end_position: u8,
    strength: u8,
) -> bool {
    if !(2..=7).contains(&start_position) || end_position > 8 || end_position <= start_position {
        return false;
    }
    if strength > 8 || strength == 0 {
        return false;
    }
    let zones: u16 = (1 << start_position) | (1 << end_position);

    clear_window(buf, offset);
    buf[offset] = EFFECT_WEAPON;
    write_zones(buf, offset, zones);
    buf[offset + 3] = strength - 1;
    true
}

fn vibration(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    position: u8,
    amplitude: u8,
    frequency: u8,
) -> bool {
    if position > 9 || amplitude > 8 || amplitude == 0 || frequency == 0 {
        return false;
    }
    let strength = (amplitude - 1) & 0x07;
    let mut amplitude_zones: u32 = 0;
    let mut active_zones: u16 = 0;
    for i in position as usize..ZONE_COUNT {
        amplitude_zones |= (strength as u32) << (3 * i);
        active_zones |= 1 << i;
    }

    clear_window(buf, offset);
    buf[offset] = EFFECT_VIBRATION;
    write_zones(buf, offset, active_zones);
    buf[offset + 3..offset + 7].copy_from_slice(&amplitude_zones.to_le_bytes());
    buf[offset + 9] = frequency;
    true
}

fn multiple_position_feedback(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    strength: &[u8],
) -> bool {
    if strength.len() != ZONE_COUNT || strength.iter().any(|s| *s > 8) {
        return false;
    }
    if strength.iter().all(|s| *s == 0) {
        return false;
    }
    let mut force_zones: u32 = 0;
    let mut active_zones: u16 = 0;
    for (i, s) in strength.iter().enumerate() {
        if *s > 0 {
            let force = (s - 1) & 0x07;
            force_zones |= (force as u32) << (3 * i);
            active_zones |= 1 << i;
        }
    }

    clear_window(buf, offset);
    buf[offset] = EFFECT_FEEDBACK;
    write_zones(buf, offset, active_zones);
    buf[offset + 3..offset + 7].copy_from_slice(&force_zones.to_le_bytes());
    true
}

fn slope_feedback(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    start_position: u8,
    end_position: u8,
    start_strength: u8,
    end_strength: u8,
) -> bool {
    if start_position > 8 || end_position > 9 || end_position <= start_position {
        return false;
    }
    if !(1..=8).contains(&start_strength) || !(1..=8).contains(&end_strength) {
        return false;
    }

    // Interpolate a per-zone strength table and reuse the multiple-position
    // packing. Zones past the end position hold the end strength.
    let slope = (end_strength as f32 - start_strength as f32)
        / (end_position as f32 - start_position as f32);
    let mut strength = [0u8; ZONE_COUNT];
    for i in start_position as usize..ZONE_COUNT {
        if i <= end_position as usize {
            let steps = (i - start_position as usize) as f32;
            strength[i] = (start_strength as f32 + slope * steps).round() as u8;
        } else {
            strength[i] = end_strength;
        }
    }

    multiple_position_feedback(buf, offset, &strength)
}

fn multiple_position_vibration(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    frequency: u8,
    amplitude: &[u8],
) -> bool {
    if frequency == 0 || amplitude.len() != ZONE_COUNT || amplitude.iter().any(|a| *a > 8) {
        return false;
    }
    if amplitude.iter().all(|a| *a == 0) {
        return false;
    }
    let mut amplitude_zones: u32 = 0;
    let mut active_zones: u16 = 0;
    for (i, a) in amplitude.iter().enumerate() {
        if *a > 0 {
            let strength = (a - 1) & 0x07;
            amplitude_zones |= (strength as u32) << (3 * i);
            active_zones |= 1 << i;
        }
    }

    clear_window(buf, offset);
    buf[offset] = EFFECT_VIBRATION;
    write_zones(buf, offset, active_zones);
    buf[offset + 3..offset + 7].copy_from_slice(&amplitude_zones.to_le_bytes());
    buf[offset + 9] = frequency;
    true
}

fn bow(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    start_position: u8,
    end_position: u8,
    strength: u8,
    snap_force: u8,
) -> bool {
    if start_position > 8 || end_position > 8 || end_position <= start_position {
        return false;
    }
    if !(1..=8).contains(&strength) || !(1..=8).contains(&snap_force) {
        return false;
    }
    let zones: u16 = (1 << start_position) | (1 << end_position);
    let force_pair = ((strength - 1) & 0x07) | (((snap_force - 1) & 0x07) << 3);

    clear_window(buf, offset);
    buf[offset] = EFFECT_BOW;
    write_zones(buf, offset, zones);
    buf[offset + 3] = force_pair;
    true
}

fn galloping(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    start_position: u8,
    end_position: u8,
    first_foot: u8,
    second_foot: u8,
    frequency: u8,
) -> bool {
    if start_position > 8 || end_position > 9 || end_position <= start_position {
        return false;
    }
    if first_foot > 6 || second_foot > 7 || second_foot <= first_foot || frequency == 0 {
        return false;
    }
    let zones: u16 = (1 << start_position) | (1 << end_position);
    let time_and_ratio = (second_foot & 0x07) | ((first_foot & 0x07) << 3);

    clear_window(buf, offset);
    buf[offset] = EFFECT_GALLOPING;
    write_zones(buf, offset, zones);
    buf[offset + 3] = time_and_ratio;
    buf[offset + 4] = frequency;
    true
}

#[allow(clippy::too_many_arguments)]
fn machine(
    buf: &mut [u8; OUTPUT_REPORT_SIZE],
    offset: usize,
    start_position: u8,
    end_position: u8,
    amplitude_a: u8,
    amplitude_b: u8,
    frequency: u8,
    period: u8,
) -> bool {
    if start_position > 8 || end_position > 9 || end_position <= start_position {
        return false;
    }
    if amplitude_a > 7 || amplitude_b > 7 || frequency == 0 {
        return false;
    }
    let zones: u16 = (1 << start_position) | (1 << end_position);
    let strength_pair = (amplitude_a & 0x07) | ((amplitude_b & 0x07) << 3);

    clear_window(buf, offset);
    buf[offset] = EFFECT_MACHINE;
    write_zones(buf, offset, zones);
    buf[offset + 3] = strength_pair;
    buf[offset + 4] = frequency;
    buf[offset + 5] = period;
    true
}
