// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Plastic synapse row codec
//!
//! Binary layout of one row (little-endian, no padding):
//!
//! ```text
//! [0..4)    last_update_time  u32 (ms)
//! [4..6)    weight            u16 (raw)
//! [6..)     trace slots       u16 × trace_terms
//! ```
//!
//! Pair rows are 8 bytes, triplet rows 10 bytes.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, StdpError};
use crate::timing::TimingRule;
use crate::trace::{SynapseTrace, MAX_TRACE_TERMS};

/// Bytes of the time header
pub const TIME_FIELD_BYTES: usize = 4;
/// Bytes of the weight field
pub const WEIGHT_FIELD_BYTES: usize = 2;
/// Bytes per trace slot
pub const TRACE_SLOT_BYTES: usize = 2;

const WEIGHT_OFFSET: usize = TIME_FIELD_BYTES;
const TRACE_OFFSET: usize = TIME_FIELD_BYTES + WEIGHT_FIELD_BYTES;

/// Persistent plastic state of one synapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SynapseState {
    /// Time (ms) of the last event applied to this synapse
    pub last_update_time: u32,
    /// Raw weight, within the weight rule's raw bounds
    pub weight: u16,
    pub trace: SynapseTrace,
}

/// Row geometry for one timing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    trace_terms: usize,
}

impl RowLayout {
    /// # Errors
    /// `InvalidParameter` for zero or more than [`MAX_TRACE_TERMS`] terms.
    pub fn new(trace_terms: usize) -> Result<Self> {
        if trace_terms == 0 || trace_terms > MAX_TRACE_TERMS {
            return Err(StdpError::InvalidParameter(format!(
                "trace terms must be in 1..={} (got {})",
                MAX_TRACE_TERMS, trace_terms
            )));
        }
        Ok(Self { trace_terms })
    }

    /// Layout matching a timing rule's trace dimensionality
    pub fn for_rule(rule: &TimingRule) -> Self {
        Self {
            trace_terms: rule.trace_size(),
        }
    }

    pub fn trace_terms(&self) -> usize {
        self.trace_terms
    }

    #[inline]
    pub fn row_size_bytes(&self) -> usize {
        TRACE_OFFSET + self.trace_terms * TRACE_SLOT_BYTES
    }

    /// Write `state` into the front of `row`
    ///
    /// Trace slots beyond `trace_terms` are not stored.
    pub fn encode_into(&self, state: &SynapseState, row: &mut [u8]) -> Result<()> {
        let size = self.row_size_bytes();
        if row.len() < size {
            return Err(StdpError::TruncatedRow {
                expected: size,
                actual: row.len(),
            });
        }
        self.write_fields(state, row);
        Ok(())
    }

    pub fn encode(&self, state: &SynapseState) -> Vec<u8> {
        let mut row = vec![0u8; self.row_size_bytes()];
        self.write_fields(state, &mut row);
        row
    }

    /// `row` must hold at least `row_size_bytes()`
    fn write_fields(&self, state: &SynapseState, row: &mut [u8]) {
        LittleEndian::write_u32(&mut row[..WEIGHT_OFFSET], state.last_update_time);
        LittleEndian::write_u16(&mut row[WEIGHT_OFFSET..TRACE_OFFSET], state.weight);
        for (slot, value) in state.trace.0.iter().take(self.trace_terms).enumerate() {
            let offset = TRACE_OFFSET + slot * TRACE_SLOT_BYTES;
            LittleEndian::write_u16(&mut row[offset..offset + TRACE_SLOT_BYTES], *value);
        }
    }

    /// Read a state from the front of `row`; unstored trace slots are zero
    pub fn decode(&self, row: &[u8]) -> Result<SynapseState> {
        let size = self.row_size_bytes();
        if row.len() < size {
            return Err(StdpError::TruncatedRow {
                expected: size,
                actual: row.len(),
            });
        }
        let mut trace = SynapseTrace::ZERO;
        for slot in 0..self.trace_terms {
            let offset = TRACE_OFFSET + slot * TRACE_SLOT_BYTES;
            trace.0[slot] = LittleEndian::read_u16(&row[offset..offset + TRACE_SLOT_BYTES]);
        }
        Ok(SynapseState {
            last_update_time: LittleEndian::read_u32(&row[..WEIGHT_OFFSET]),
            weight: LittleEndian::read_u16(&row[WEIGHT_OFFSET..TRACE_OFFSET]),
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_row_sizes() {
        assert_eq!(RowLayout::new(1).unwrap().row_size_bytes(), 8);
        assert_eq!(RowLayout::new(2).unwrap().row_size_bytes(), 10);
        assert!(RowLayout::new(0).is_err());
        assert!(RowLayout::new(3).is_err());
    }

    #[test]
    fn test_field_order() {
        let layout = RowLayout::new(2).unwrap();
        let state = SynapseState {
            last_update_time: 0x0403_0201,
            weight: 0x0605,
            trace: SynapseTrace([0x0807, 0x0A09]),
        };
        assert_eq!(layout.encode(&state), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_pair_row_drops_auxiliary_slot() {
        let layout = RowLayout::new(1).unwrap();
        let state = SynapseState {
            last_update_time: 12,
            weight: 300,
            trace: SynapseTrace([77, 0]),
        };
        let bytes = layout.encode(&state);
        assert_eq!(bytes.len(), 8);
        assert_eq!(layout.decode(&bytes).unwrap(), state);
    }

    #[test]
    fn test_encode_into_matches_encode() {
        let layout = RowLayout::new(2).unwrap();
        let state = SynapseState {
            last_update_time: 99,
            weight: 1234,
            trace: SynapseTrace([55, 66]),
        };
        let mut row = [0xFFu8; 12];
        layout.encode_into(&state, &mut row).unwrap();
        assert_eq!(&row[..10], layout.encode(&state).as_slice());
        // Bytes past the row are untouched
        assert_eq!(&row[10..], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_truncated() {
        let layout = RowLayout::new(2).unwrap();
        assert_eq!(
            layout.decode(&[0u8; 9]).unwrap_err(),
            StdpError::TruncatedRow {
                expected: 10,
                actual: 9
            }
        );
        let mut short = [0u8; 4];
        assert!(layout
            .encode_into(&SynapseState::default(), &mut short)
            .is_err());
    }

    proptest! {
        #[test]
        fn prop_triplet_row_round_trip(
            time in any::<u32>(),
            weight in any::<u16>(),
            x in any::<u16>(),
            y in any::<u16>(),
        ) {
            let layout = RowLayout::new(2).unwrap();
            let state = SynapseState {
                last_update_time: time,
                weight,
                trace: SynapseTrace([x, y]),
            };
            prop_assert_eq!(layout.decode(&layout.encode(&state)).unwrap(), state);
        }
    }
}
