// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point arithmetic shared by traces and decay LUTs
//!
//! Traces and LUT entries are unsigned 16-bit values with 11 fractional bits
//! (`1.0 == 2048`). Products are formed at 32-bit width, shifted back and
//! clamped to `u16::MAX`; nothing wraps.

/// Number of fractional bits in trace and LUT values
pub const STDP_FIXED_POINT: u32 = 11;

/// Fixed-point representation of 1.0 (one spike's worth of trace)
pub const STDP_FIXED_POINT_ONE: u16 = 1 << STDP_FIXED_POINT;

/// Multiply two fixed-point values, renormalizing by [`STDP_FIXED_POINT_ONE`]
///
/// # Example
/// ```
/// use stdp_core::fixed::{fixed_mul_16x16, STDP_FIXED_POINT_ONE};
///
/// let half = STDP_FIXED_POINT_ONE / 2;
/// assert_eq!(fixed_mul_16x16(STDP_FIXED_POINT_ONE, half), half);
/// assert_eq!(fixed_mul_16x16(u16::MAX, u16::MAX), u16::MAX); // Saturates
/// ```
#[inline]
pub fn fixed_mul_16x16(a: u16, b: u16) -> u16 {
    saturate_u16((a as u32 * b as u32) >> STDP_FIXED_POINT)
}

/// Saturating fixed-point addition
#[inline]
pub fn fixed_add(a: u16, b: u16) -> u16 {
    a.saturating_add(b)
}

/// Clamp a double-width intermediate back to the nominal 16-bit width
#[inline]
pub fn saturate_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

/// Convert a real value to fixed point (rounded, clamped to `[0, u16::MAX]`)
#[inline]
pub fn to_fixed(value: f64) -> u16 {
    let scaled = (value * STDP_FIXED_POINT_ONE as f64).round();
    scaled.clamp(0.0, u16::MAX as f64) as u16
}

/// Convert a fixed-point value back to a real value
#[inline]
pub fn from_fixed(value: u16) -> f64 {
    value as f64 / STDP_FIXED_POINT_ONE as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_is_identity() {
        for v in [0u16, 1, 100, 2048, 40_000, u16::MAX] {
            assert_eq!(fixed_mul_16x16(v, STDP_FIXED_POINT_ONE), v);
        }
    }

    #[test]
    fn test_mul_truncates_toward_zero() {
        // 3 * 0.5 = 1.5 units -> 1
        assert_eq!(fixed_mul_16x16(3, STDP_FIXED_POINT_ONE / 2), 1);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(fixed_add(u16::MAX - 1, 10), u16::MAX);
        assert_eq!(saturate_u16(u32::MAX), u16::MAX);
        assert_eq!(to_fixed(1e9), u16::MAX);
        assert_eq!(to_fixed(-3.0), 0);
    }

    #[test]
    fn test_conversion() {
        assert_eq!(to_fixed(1.0), STDP_FIXED_POINT_ONE);
        assert_eq!(to_fixed(0.25), 512);
        assert!((from_fixed(1024) - 0.5).abs() < 1e-12);
    }
}
