//! NCO control words.
//!
//! This module converts between frequencies in Hz and the fixed-point phase
//! increments (control words) used by the numerically-controlled oscillator
//! of the FPGA design. The NCO adds the control word to a `W`-bit phase
//! accumulator every clock cycle, so a control word `c` produces a frequency
//! of `c * clk / 2^W`.

use crate::error::{Error, Result, Warning};

pub mod constants;

/// NCO phase control word.
///
/// A control word is only meaningful together with the width of the register
/// it is written to. Values outside `[1, 2^bits)` are kept as they were
/// computed and flagged as invalid by [`ControlWord::is_valid`]. They are
/// never clamped.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ControlWord {
    value: u64,
    bits: u8,
}

impl ControlWord {
    /// Creates a control word for a register of `bits` bits.
    pub fn new(value: u64, bits: u8) -> ControlWord {
        ControlWord { value, bits }
    }

    /// Returns the value of the control word.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns the register width in bits.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Returns `true` if the control word can be programmed into the
    /// hardware.
    ///
    /// A value of zero is representable but produces no oscillation, so it is
    /// also regarded as invalid.
    pub fn is_valid(&self) -> bool {
        (1..=self.max()).contains(&self.value)
    }

    /// Returns a warning if the control word is not valid.
    pub fn check(&self) -> Option<Warning> {
        if self.is_valid() {
            None
        } else {
            Some(Warning::OutOfRange {
                value: self.value,
                min: 1,
                max: self.max(),
            })
        }
    }

    fn max(&self) -> u64 {
        low_mask(self.bits)
    }
}

impl std::fmt::Display for ControlWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

fn low_mask(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn check_bits(bits: u8) -> Result<()> {
    if !(1..=constants::MAX_PHASE_BITS).contains(&bits) {
        return Err(Error::invalid(format!(
            "phase word width {bits} not in [1, {}]",
            constants::MAX_PHASE_BITS
        )));
    }
    Ok(())
}

fn check_clock(clock_hz: f64) -> Result<()> {
    if !clock_hz.is_finite() || clock_hz <= 0.0 {
        return Err(Error::invalid(format!(
            "clock frequency {clock_hz} is not a positive number"
        )));
    }
    Ok(())
}

/// Computes the control word for a frequency.
///
/// The control word is `round(freq_hz * 2^bits / clock_hz)`, rounding half
/// away from zero. A frequency of zero gives a control word of zero, which
/// disables the oscillator. Results outside `[1, 2^bits)` are returned as
/// they are, and the caller should check them with
/// [`ControlWord::is_valid`]. Negative frequencies saturate to zero.
///
/// An error is returned if the frequency or the clock are not finite, if the
/// clock is not positive, or if `bits` is not in `[1, 63]`.
pub fn freq_to_ctrl(freq_hz: f64, clock_hz: f64, bits: u8) -> Result<ControlWord> {
    check_bits(bits)?;
    check_clock(clock_hz)?;
    if !freq_hz.is_finite() {
        return Err(Error::invalid(format!("frequency {freq_hz} is not finite")));
    }
    let scaled = (freq_hz * 2f64.powi(bits.into()) / clock_hz).round();
    // float to integer casts saturate, so negative values become 0
    Ok(ControlWord::new(scaled as u64, bits))
}

/// Computes the frequency produced by a control word.
///
/// This is the exact inverse of [`freq_to_ctrl`], `ctrl * clock_hz / 2^bits`,
/// without any rounding.
pub fn ctrl_to_freq(ctrl: u64, clock_hz: f64, bits: u8) -> f64 {
    ctrl as f64 * clock_hz / 2f64.powi(bits.into())
}

/// NCO parameters.
///
/// Bundles the reference clock and the phase word width, so that conversions
/// for the same hardware can be done without repeating them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Nco {
    clock_hz: f64,
    phase_bits: u8,
}

impl Default for Nco {
    fn default() -> Nco {
        Nco {
            clock_hz: constants::CLOCK_FREQUENCY,
            phase_bits: constants::PHASE_BITS,
        }
    }
}

impl Nco {
    /// Creates an NCO description.
    ///
    /// Returns an error if the clock is not a positive finite number or if the
    /// phase word width is not supported.
    pub fn new(clock_hz: f64, phase_bits: u8) -> Result<Nco> {
        check_bits(phase_bits)?;
        check_clock(clock_hz)?;
        Ok(Nco {
            clock_hz,
            phase_bits,
        })
    }

    /// Returns the reference clock frequency in Hz.
    pub fn clock_hz(&self) -> f64 {
        self.clock_hz
    }

    /// Returns the phase word width.
    pub fn phase_bits(&self) -> u8 {
        self.phase_bits
    }

    /// Returns the control word for a frequency.
    ///
    /// See [`freq_to_ctrl`].
    pub fn control_word(&self, freq_hz: f64) -> Result<ControlWord> {
        freq_to_ctrl(freq_hz, self.clock_hz, self.phase_bits)
    }

    /// Returns the frequency produced by a control word.
    pub fn frequency(&self, ctrl: u64) -> f64 {
        ctrl_to_freq(ctrl, self.clock_hz, self.phase_bits)
    }

    /// Returns the frequency resolution (the frequency of one LSB) in Hz.
    pub fn resolution_hz(&self) -> f64 {
        self.frequency(1)
    }

    /// Returns the largest control word that the phase register can hold.
    pub fn max_control_word(&self) -> u64 {
        low_mask(self.phase_bits)
    }
}

/// Divider control word of the legacy sine generator.
///
/// The legacy generator steps through `2^samples` samples of a sine table,
/// advancing one sample every `divider` clock cycles. Its divider register
/// accepts values in `[1, 65536]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DividerWord {
    value: u64,
    sample_bits: u8,
}

impl DividerWord {
    /// Returns the divider value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns the number of bits that index the samples of one period.
    pub fn sample_bits(&self) -> u8 {
        self.sample_bits
    }

    /// Returns `true` if the divider fits the divider register.
    pub fn is_valid(&self) -> bool {
        (1..=constants::MAX_DIVIDER).contains(&self.value)
    }

    /// Returns a warning if the divider is not valid.
    pub fn check(&self) -> Option<Warning> {
        if self.is_valid() {
            None
        } else {
            Some(Warning::OutOfRange {
                value: self.value,
                min: 1,
                max: constants::MAX_DIVIDER,
            })
        }
    }
}

/// Computes the legacy divider control word for a frequency.
///
/// The divider is `round(clock_hz / (freq_hz * 2^sample_bits))`. The
/// frequency must be positive, and `sample_bits` must be in `[1, 16]`.
pub fn divider_word(freq_hz: f64, clock_hz: f64, sample_bits: u8) -> Result<DividerWord> {
    check_clock(clock_hz)?;
    if !freq_hz.is_finite() || freq_hz <= 0.0 {
        return Err(Error::invalid(format!(
            "frequency {freq_hz} is not a positive number"
        )));
    }
    if !(1..=constants::MAX_DIVIDER_SAMPLE_BITS).contains(&sample_bits) {
        return Err(Error::invalid(format!(
            "sample bits {sample_bits} not in [1, {}]",
            constants::MAX_DIVIDER_SAMPLE_BITS
        )));
    }
    let value = (clock_hz / (freq_hz * 2f64.powi(sample_bits.into()))).round() as u64;
    Ok(DividerWord { value, sample_bits })
}

#[cfg(test)]
mod test {
    use super::*;

    const CLK: f64 = 100e6;

    fn sweep() -> impl Iterator<Item = f64> {
        // logarithmic sweep from 0.01 Hz to ~50 MHz plus some awkward values
        (0..300)
            .map(|k| 0.01 * 10f64.powf(k as f64 * 0.0323))
            .chain([1.0, 440.0, 1234.5678, 1e6 / 3.0, 12_345_678.9, 49.9e6])
    }

    #[test]
    fn round_trip_bound() {
        for bits in [16, 32] {
            let half_lsb = CLK / 2f64.powi(bits as i32 + 1);
            for freq in sweep() {
                let ctrl = freq_to_ctrl(freq, CLK, bits).unwrap();
                let back = ctrl_to_freq(ctrl.value(), CLK, bits);
                assert!(
                    (back - freq).abs() <= half_lsb * (1.0 + 1e-9),
                    "freq {freq} bits {bits} ctrl {ctrl} back {back}"
                );
            }
        }
    }

    #[test]
    fn monotonic() {
        for bits in [16, 32] {
            let mut last = 0;
            for k in 0..20_000 {
                let freq = k as f64 * 2_500.0 + 0.37;
                let ctrl = freq_to_ctrl(freq, CLK, bits).unwrap().value();
                assert!(ctrl >= last);
                last = ctrl;
            }
        }
    }

    #[test]
    fn zero_frequency() {
        let ctrl = freq_to_ctrl(0.0, CLK, 32).unwrap();
        assert_eq!(ctrl.value(), 0);
        assert!(!ctrl.is_valid());
        assert_eq!(
            ctrl.check(),
            Some(Warning::OutOfRange {
                value: 0,
                min: 1,
                max: 0xffff_ffff
            })
        );
    }

    #[test]
    fn known_values() {
        // 1 kHz at 100 MHz: 1e3 * 2^32 / 1e8 = 42949.67296
        assert_eq!(freq_to_ctrl(1e3, CLK, 32).unwrap().value(), 42950);
        assert_eq!(freq_to_ctrl(25e6, CLK, 32).unwrap().value(), 1 << 30);
        assert_eq!(ctrl_to_freq(1 << 30, CLK, 32), 25e6);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 2^16 / 2^17 = 0.5 LSB at 16 bits
        let clk = 2f64.powi(17);
        assert_eq!(freq_to_ctrl(1.0, clk, 16).unwrap().value(), 1);
        assert_eq!(freq_to_ctrl(3.0, clk, 16).unwrap().value(), 2);
        assert_eq!(freq_to_ctrl(5.0, clk, 16).unwrap().value(), 3);
    }

    #[test]
    fn out_of_range_not_clamped() {
        let ctrl = freq_to_ctrl(CLK, CLK, 16).unwrap();
        assert_eq!(ctrl.value(), 1 << 16);
        assert!(!ctrl.is_valid());
        let ctrl = freq_to_ctrl(CLK - CLK / 65536.0, CLK, 16).unwrap();
        assert_eq!(ctrl.value(), 0xffff);
        assert!(ctrl.is_valid());
        let ctrl = freq_to_ctrl(-1e3, CLK, 32).unwrap();
        assert_eq!(ctrl.value(), 0);
        assert!(!ctrl.is_valid());
    }

    #[test]
    fn invalid_inputs() {
        assert!(freq_to_ctrl(f64::NAN, CLK, 32).is_err());
        assert!(freq_to_ctrl(f64::INFINITY, CLK, 32).is_err());
        assert!(freq_to_ctrl(1e3, 0.0, 32).is_err());
        assert!(freq_to_ctrl(1e3, CLK, 0).is_err());
        assert!(freq_to_ctrl(1e3, CLK, 64).is_err());
        assert!(Nco::new(-1.0, 32).is_err());
    }

    #[test]
    fn nco() {
        let nco = Nco::default();
        assert_eq!(nco.clock_hz(), CLK);
        assert_eq!(nco.phase_bits(), 32);
        assert_eq!(nco.max_control_word(), 0xffff_ffff);
        assert_eq!(nco.resolution_hz(), CLK / 2f64.powi(32));
        let ctrl = nco.control_word(440.0).unwrap();
        assert_eq!(ctrl.value(), 18898);
        assert!((nco.frequency(ctrl.value()) - 440.0).abs() < nco.resolution_hz());
    }

    #[test]
    fn divider() {
        // 1e8 / (1e3 * 1024) = 97.65625
        let div = divider_word(1e3, CLK, 10).unwrap();
        assert_eq!(div.value(), 98);
        assert!(div.is_valid());
        let div = divider_word(0.5, CLK, 1).unwrap();
        assert_eq!(div.value(), 100_000_000);
        assert!(!div.is_valid());
        assert!(div.check().is_some());
        assert!(divider_word(0.0, CLK, 10).is_err());
        assert!(divider_word(1e3, CLK, 17).is_err());
    }
}
