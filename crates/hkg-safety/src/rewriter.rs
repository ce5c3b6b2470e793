/*!
 * In-flight rewrite of the steering module's torque report (MDPS12).
 *
 * Every 345 MDPS12 frames, the last fifteen have their column torque
 * replaced by a ramp and their output torque pinned to a constant, then the
 * integrity byte is recomputed with whichever algorithm the vehicle uses.
 */

use hkg_protocol::ChecksumAlgorithm;

use crate::checksum::{self, INTEGRITY_INDEX};
use crate::frame::{Frame, MAX_PAYLOAD_LEN};

/// Steering module torque report.
pub const MDPS12: u32 = 593;

/// Length of one rewrite schedule, in MDPS12 frames.
pub const CYCLE_PERIOD: u32 = 345;
/// First rewritten cycle; every later cycle of the period is rewritten too.
pub const RAMP_START: u32 = 330;
/// Added to the decoded column torque on the first rewritten cycle.
pub const INITIAL_OFFSET: i32 = -164;
/// Added to the previous ramp value on each later cycle.
pub const RAMP_STEP: i32 = 34;
/// Value written into `CR_Mdps_OutTq` while rewriting.
pub const OUT_TQ_OVERRIDE: u32 = 2058;

/// One contiguous run of bits within a single payload byte.
///
/// Takes `num_bits` bits starting at `bit_offset` in `data[byte_index]` and
/// places them at `value_shift` in the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSpan {
    byte_index: usize,
    /// Lowest bit position within the byte (0..=7).
    bit_offset: u8,
    /// How many consecutive bits in this span (1..=8).
    num_bits: u8,
    /// Where these bits land in the raw value.
    value_shift: u8,
}

impl BitSpan {
    /// Panics (at compile time for the `const` layouts below) when the span
    /// does not fit inside one byte.
    pub const fn new(byte_index: usize, bit_offset: u8, num_bits: u8, value_shift: u8) -> Self {
        assert!(byte_index < MAX_PAYLOAD_LEN, "span byte out of range");
        assert!(num_bits >= 1 && bit_offset as u16 + num_bits as u16 <= 8, "span exceeds one byte");
        assert!(value_shift < 32, "value shift exceeds u32");
        Self {
            byte_index,
            bit_offset,
            num_bits,
            value_shift,
        }
    }

    fn mask(&self) -> u8 {
        ((1u16 << self.num_bits) - 1) as u8
    }
}

/// Mapping of one signal onto the payload bytes.
///
/// `extract` and `pack` walk the same spans, so they are inverses by
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct SignalLayout<const N: usize> {
    segments: [BitSpan; N],
}

impl<const N: usize> SignalLayout<N> {
    pub const fn new(segments: [BitSpan; N]) -> Self {
        Self { segments }
    }

    /// Raw unsigned value of the signal.
    pub fn extract(&self, data: &[u8; MAX_PAYLOAD_LEN]) -> u32 {
        let mut result = 0u32;
        for span in &self.segments {
            let mask = span.mask();
            let bits = (data[span.byte_index] >> span.bit_offset) & mask;
            result |= u32::from(bits) << span.value_shift;
        }
        result
    }

    /// Write `raw` into the signal's bits, leaving every other bit untouched.
    pub fn pack(&self, data: &mut [u8; MAX_PAYLOAD_LEN], raw: u32) {
        for span in &self.segments {
            let mask = span.mask();
            let bits = ((raw >> span.value_shift) as u8) & mask;
            data[span.byte_index] &= !(mask << span.bit_offset);
            data[span.byte_index] |= bits << span.bit_offset;
        }
    }
}

/// `CR_Mdps_StrColTq`: 11 bits, byte 0 plus the low three bits of byte 1.
pub const STR_COL_TQ: SignalLayout<2> = SignalLayout::new([
    BitSpan::new(0, 0, 8, 0),
    BitSpan::new(1, 0, 3, 8),
]);

/// `CR_Mdps_OutTq`: 12 bits, high nibble of byte 6 then all of byte 7.
pub const OUT_TQ: SignalLayout<2> = SignalLayout::new([
    BitSpan::new(6, 4, 4, 0),
    BitSpan::new(7, 0, 8, 4),
]);

const STR_COL_TQ_MASK: i32 = 0x7FF;

/// Cycle counter and ramp memory for the MDPS12 rewrite.
///
/// `cycle_counter` stays in `0..CYCLE_PERIOD`. The frame processed while the
/// counter reads `RAMP_START` reseeds `last_ramp_value` from its own column
/// torque; the 14 frames after it each add one step, so the value stays
/// within `-164..=2359`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TorqueRamp {
    cycle_counter: u32,
    last_ramp_value: i32,
    seeded: bool,
}

impl TorqueRamp {
    pub fn cycle_counter(&self) -> u32 {
        self.cycle_counter
    }

    pub fn last_ramp_value(&self) -> i32 {
        self.last_ramp_value
    }

    /// Advance the schedule for one MDPS12 frame and return the rewritten
    /// frame when this cycle is active.
    ///
    /// The frame is left alone when it is shorter than 8 bytes or when no
    /// checksum algorithm has been resolved yet.
    pub fn process(&mut self, frame: &Frame, algorithm: Option<ChecksumAlgorithm>) -> Option<Frame> {
        let cycle = self.cycle_counter;
        self.cycle_counter = (cycle + 1) % CYCLE_PERIOD;

        if cycle < RAMP_START {
            return None;
        }
        let first_active = cycle == RAMP_START;
        if first_active {
            self.seeded = false;
        }

        let algorithm = algorithm?;
        if frame.len() < MAX_PAYLOAD_LEN || !(first_active || self.seeded) {
            return None;
        }

        let mut data = frame.data();
        let torque = if first_active {
            STR_COL_TQ.extract(&data) as i32 + INITIAL_OFFSET
        } else {
            self.last_ramp_value + RAMP_STEP
        };
        self.last_ramp_value = torque;
        self.seeded = true;

        STR_COL_TQ.pack(&mut data, (torque & STR_COL_TQ_MASK) as u32);
        OUT_TQ.pack(&mut data, OUT_TQ_OVERRIDE);
        data[INTEGRITY_INDEX] = 0;
        data[INTEGRITY_INDEX] = checksum::compute(algorithm, &data, INTEGRITY_INDEX);

        Some(frame.with_data(data))
    }
}
