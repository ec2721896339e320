//! MAWG FPGA implementation constants.
//!
//! This module contains constants that define the characteristics of the
//! oscillator and chirp implementation in the FPGA.

/// Reference clock frequency of the FPGA design in Hz.
pub const CLOCK_FREQUENCY: f64 = 100e6;

/// Number of bits of the NCO phase accumulator and control word.
pub const PHASE_BITS: u8 = 32;

/// Largest phase word width supported by the conversion routines.
///
/// Control words are held in a `u64` and computed in `f64`, so wider words
/// would lose their LSBs.
pub const MAX_PHASE_BITS: u8 = 63;

/// Width of the chirp `div_rate` and `inc_rate` registers.
pub const RATE_BITS: u8 = 32;

/// Default tolerance of the chirp rate search.
///
/// This is an absolute tolerance on `div_rate / inc_rate`, which is measured
/// in clock cycles per control word LSB.
pub const RATE_TOLERANCE: f64 = 1e-6;

/// Width of the data word of a configuration command.
pub const DATA_BITS: u8 = 32;

/// Largest value of the divider control word of the legacy sine generator.
pub const MAX_DIVIDER: u64 = 1 << 16;

/// Maximum number of bits that index the samples of one period in the
/// legacy sine generator.
pub const MAX_DIVIDER_SAMPLE_BITS: u8 = 16;

/// Number of chirp lengths that the chirp delay register can hold.
pub const MAX_CHIRP_DELAY: u32 = (1 << 4) - 1;

/// Default value of the FM demodulator rate register.
pub const DEMOD_RATE: u32 = 0x1d;
