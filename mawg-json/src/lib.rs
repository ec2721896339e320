//! mawg-json contains the JSON schemas of the reports printed by `mawg
//! --json`.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// NCO values JSON schema.
///
/// This JSON schema corresponds to the output of `mawg nco-values`. It
/// contains the control word that programs the NCO for a requested frequency.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NcoValues {
    /// Requested frequency in Hz.
    pub frequency: f64,
    /// Reference clock frequency in Hz.
    pub clock: f64,
    /// Width of the phase control word in bits.
    pub phase_bits: u8,
    /// Phase control word.
    pub control_word: u64,
    /// Frequency actually produced by the control word, in Hz.
    pub actual_frequency: f64,
    /// Frequency resolution (one LSB of the control word) in Hz.
    pub resolution: f64,
    /// Whether the control word can be programmed into the hardware.
    pub valid: bool,
}

/// Rate pair JSON schema.
///
/// A pair of chirp rate registers. The chirp control word is incremented by
/// `inc_rate` every `div_rate` clock cycles.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RatePair {
    /// Clock cycles between control word updates.
    pub div_rate: u64,
    /// Control word increment per update.
    pub inc_rate: u64,
}

/// Chirp rate approximation JSON schema.
///
/// This contains one of the two candidate [`RatePair`]s of a chirp design
/// together with its quality.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct RateApproximation {
    /// Rate registers.
    pub rates: RatePair,
    /// Absolute error of `div_rate / inc_rate` with respect to the target
    /// ratio.
    pub error: f64,
    /// Chirp length obtained with these rate registers, in seconds.
    pub actual_length: f64,
}

/// Chirp values JSON schema.
///
/// This JSON schema corresponds to the output of `mawg chirp-values`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChirpValues {
    /// Minimum sweep frequency in Hz.
    pub min_frequency: f64,
    /// Maximum sweep frequency in Hz.
    pub max_frequency: f64,
    /// Requested chirp length in seconds.
    pub length: f64,
    /// Reference clock frequency in Hz.
    pub clock: f64,
    /// Control word at the start of the sweep.
    pub min_control_word: u64,
    /// Control word at the end of the sweep.
    pub max_control_word: u64,
    /// Target value for `div_rate / inc_rate`.
    pub target_ratio: f64,
    /// Rate pair that gives the smoothest sweep (`inc_rate` is 1).
    pub smooth: RateApproximation,
    /// Rate pair that gives the most accurate chirp length.
    pub accurate: RateApproximation,
    /// Requested tolerance for the accurate rate pair.
    pub tolerance: f64,
    /// Whether the accurate rate pair meets the tolerance.
    pub tolerance_met: bool,
    /// Warnings raised during the computation.
    pub warnings: Vec<String>,
}

/// Divider values JSON schema.
///
/// This JSON schema corresponds to the output of `mawg divider-values`, which
/// computes the sample clock divider of the legacy sine generator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DividerValues {
    /// Requested frequency in Hz.
    pub frequency: f64,
    /// Reference clock frequency in Hz.
    pub clock: f64,
    /// Number of bits that index the samples of one period.
    pub sample_bits: u8,
    /// Divider control word.
    pub control_word: u64,
    /// Whether the control word can be programmed into the hardware.
    pub valid: bool,
}

/// Configuration frame JSON schema.
///
/// A single command frame as sent over the serial link. This is the output
/// of the device commands when `--dry-run` is used together with `--json`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Frame {
    /// Command opcode.
    pub opcode: u8,
    /// 32-bit data word.
    pub data: u32,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Generator output.
///
/// This enum lists the signals that can be routed to the generator output.
pub enum Output {
    /// Modulating (message) signal.
    Message,
    /// FM modulated signal.
    Modulated,
    /// FM demodulated signal.
    Demodulated,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Modulating waveform.
///
/// This enum lists the waveforms that the message generator can produce.
pub enum Waveform {
    /// Sine wave.
    Sine,
    /// Linear frequency sweep.
    Chirp,
    /// Sawtooth wave.
    Sawtooth,
    /// Pulse wave.
    Pulse,
}

macro_rules! impl_str_conv {
    ($ty:ty, $($s:expr => $v:ident),*) => {
        impl std::str::FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                Ok(match s {
                    $(
                        $s => <$ty>::$v,
                    )*
                        _ => return Err(()),
                })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                write!(f, "{}", match self {
                    $(
                        <$ty>::$v => $s,
                    )*
                })
            }
        }
    }
}

impl_str_conv!(Output,
               "message" => Message,
               "modulated" => Modulated,
               "demodulated" => Demodulated);

impl_str_conv!(Waveform,
               "sine" => Sine,
               "chirp" => Chirp,
               "sawtooth" => Sawtooth,
               "pulse" => Pulse);
