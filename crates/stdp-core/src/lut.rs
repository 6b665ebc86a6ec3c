// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Exponential decay lookup tables
//!
//! Runtime code never evaluates `exp()`. Each timing rule builds one table
//! per time constant at construction and looks elapsed times up in it:
//!
//! ```text
//! entry[i] = round(exp(-(i << shift) / tau) * scale)
//! ```
//!
//! Lookups past the end of the table saturate to the last entry, which is
//! the smallest value in the table.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, StdpError};
use crate::fixed::{fixed_mul_16x16, STDP_FIXED_POINT_ONE};
use crate::params::LutSpec;

/// Bytes per serialized LUT entry
pub const LUT_ENTRY_BYTES: usize = 2;

/// Generate a fixed-point exponential decay table
///
/// # Arguments
/// * `tau` - Time constant in ms (must be finite and > 0)
/// * `size` - Number of entries (must be > 0)
/// * `shift` - Each index covers `1 << shift` ms
/// * `scale` - Fixed-point unit, i.e. the value of entry 0 (1..=65535)
///
/// # Example
/// ```
/// use stdp_core::lut::generate_exp_decay_lut;
///
/// let table = generate_exp_decay_lut(20.0, 256, 0, 2048).unwrap();
/// assert_eq!(table.len(), 256);
/// assert_eq!(table[0], 2048);
/// assert_eq!(table[20], 753); // round(e^-1 * 2048)
/// ```
pub fn generate_exp_decay_lut(tau: f64, size: usize, shift: u32, scale: u32) -> Result<Vec<u16>> {
    if !tau.is_finite() || tau <= 0.0 {
        return Err(StdpError::InvalidParameter(format!(
            "tau must be finite and > 0 (got {})",
            tau
        )));
    }
    if size == 0 {
        return Err(StdpError::InvalidParameter(
            "LUT size must be > 0".to_string(),
        ));
    }
    if scale == 0 || scale > u16::MAX as u32 {
        return Err(StdpError::InvalidParameter(format!(
            "LUT scale must be in 1..=65535 (got {})",
            scale
        )));
    }
    if shift >= u32::BITS || ((size as u64 - 1) << shift) > u32::MAX as u64 {
        return Err(StdpError::InvalidParameter(format!(
            "LUT shift {} too large for {} entries",
            shift, size
        )));
    }

    let table = (0..size as u64)
        .map(|i| {
            let t = (i << shift) as f64;
            let v = ((-t / tau).exp() * scale as f64).round();
            v.clamp(0.0, scale as f64) as u16
        })
        .collect();

    Ok(table)
}

/// An immutable decay table for one time constant
#[derive(Debug, Clone, PartialEq)]
pub struct ExpDecayLut {
    /// `None` when the table was loaded from a parameter region
    tau: Option<f64>,
    shift: u32,
    values: Vec<u16>,
}

impl ExpDecayLut {
    /// Build the table for `tau` at the rule's fixed-point scale
    pub fn new(tau: f64, spec: LutSpec) -> Result<Self> {
        let values =
            generate_exp_decay_lut(tau, spec.size, spec.shift, STDP_FIXED_POINT_ONE as u32)?;
        Ok(Self {
            tau: Some(tau),
            shift: spec.shift,
            values,
        })
    }

    /// Read a table of `spec.size` little-endian entries from the front of `bytes`
    pub fn read_le(spec: LutSpec, bytes: &[u8]) -> Result<Self> {
        let needed = spec.size * LUT_ENTRY_BYTES;
        if spec.size == 0 {
            return Err(StdpError::InvalidParameter(
                "LUT size must be > 0".to_string(),
            ));
        }
        if bytes.len() < needed {
            return Err(StdpError::TruncatedParams {
                expected: needed,
                actual: bytes.len(),
            });
        }

        let values = bytes[..needed]
            .chunks_exact(LUT_ENTRY_BYTES)
            .map(LittleEndian::read_u16)
            .collect();

        Ok(Self {
            tau: None,
            shift: spec.shift,
            values,
        })
    }

    /// Append the table as little-endian u16 entries
    pub fn write_le(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + self.size_bytes(), 0);
        for (i, value) in self.values.iter().enumerate() {
            let offset = start + i * LUT_ENTRY_BYTES;
            LittleEndian::write_u16(&mut out[offset..offset + LUT_ENTRY_BYTES], *value);
        }
    }

    /// Saturating lookup of the decay factor after `elapsed_ms`
    #[inline]
    pub fn lookup(&self, elapsed_ms: u32) -> u16 {
        let index = (elapsed_ms >> self.shift) as usize;
        let last = self.values.len() - 1;
        self.values[index.min(last)]
    }

    /// Decay a fixed-point value over `elapsed_ms`
    #[inline]
    pub fn decay(&self, value: u16, elapsed_ms: u32) -> u16 {
        fixed_mul_16x16(value, self.lookup(elapsed_ms))
    }

    pub fn tau(&self) -> Option<f64> {
        self.tau
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn values(&self) -> &[u16] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialized size in the plastic parameter region
    pub fn size_bytes(&self) -> usize {
        self.values.len() * LUT_ENTRY_BYTES
    }

    pub fn spec(&self) -> LutSpec {
        LutSpec {
            size: self.values.len(),
            shift: self.shift,
        }
    }
}
