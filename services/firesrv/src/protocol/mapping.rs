//! Flame percentage <-> hardware value mapping
//!
//! The device represents flame height as one byte in 0x80..=0xFF, 0x80 being
//! the lowest burning level. Off is a separate command, never a flame value.
//! The two conversions are approximate inverses; quantizing 101 percentages
//! onto 128 hardware steps loses up to 2 points on a round trip.

use super::constants::{FLAME_HW_MAX, FLAME_HW_MIN, FLAME_HW_SPAN, FLAME_PCT_MAX};

/// Convert 0-100% to a hardware flame value (0x80-0xFF)
///
/// Percentages at or below zero map to the minimum flame; above 100 saturates.
pub fn percentage_to_hardware(percentage: i32) -> u8 {
    if percentage <= 0 {
        return FLAME_HW_MIN;
    }

    let scaled = f64::from(percentage) / f64::from(FLAME_PCT_MAX) * FLAME_HW_SPAN;
    let value = f64::from(FLAME_HW_MIN) + scaled.round();
    value.clamp(f64::from(FLAME_HW_MIN), f64::from(FLAME_HW_MAX)) as u8
}

/// Convert a hardware flame value (0x80-0xFF) to 0-100%
pub fn hardware_to_percentage(value: u8) -> u8 {
    if value <= FLAME_HW_MIN {
        return 0;
    }

    let steps = f64::from(value - FLAME_HW_MIN);
    (steps / FLAME_HW_SPAN * f64::from(FLAME_PCT_MAX)).round() as u8
}
