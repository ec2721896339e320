//! Chirp rate design.
//!
//! The chirp module of the FPGA sweeps the NCO control word from `min_ctrl`
//! to `max_ctrl`. It adds `inc_rate` to the control word every `div_rate`
//! clock cycles, so a sweep takes `div_rate * (max_ctrl - min_ctrl) /
//! inc_rate` clock cycles. To obtain a sweep of a given length, the ratio
//! `div_rate / inc_rate` must approximate
//!
//! ```text
//! target = length * clk / (max_ctrl - min_ctrl)
//! ```
//!
//! with both registers fitting in their hardware width. This module searches
//! for such a pair of integers.
//!
//! Two results are given. The *smooth* pair always has `inc_rate = 1`, which
//! gives the finest frequency steps, at the cost of an error in the chirp
//! length. The *accurate* pair is the best approximation found by the search,
//! which gives the most accurate length, at the cost of coarser frequency
//! steps.

use crate::error::{Error, Result, Warning};
use crate::nco::constants;

/// Chirp rate registers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RatePair {
    /// Clock cycles between control word updates.
    pub div_rate: u64,
    /// Control word increment per update.
    pub inc_rate: u64,
}

impl RatePair {
    /// Returns `div_rate / inc_rate`.
    ///
    /// Returns `None` if `inc_rate` is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.inc_rate == 0 {
            None
        } else {
            Some(self.div_rate as f64 / self.inc_rate as f64)
        }
    }
}

impl From<RatePair> for mawg_json::RatePair {
    fn from(rates: RatePair) -> mawg_json::RatePair {
        mawg_json::RatePair {
            div_rate: rates.div_rate,
            inc_rate: rates.inc_rate,
        }
    }
}

/// Rate pair together with its approximation error.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Approximation {
    /// Rate registers.
    pub rates: RatePair,
    /// Absolute error of `div_rate / inc_rate` with respect to the target.
    pub error: f64,
}

/// Selects which of the two designs of a [`ChirpConstants`] is used.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Optimize {
    /// Use `inc_rate = 1`, giving the smoothest sweep.
    #[default]
    Smoothness,
    /// Use the best approximation, giving the most accurate chirp length.
    Length,
}

/// Parameters of the rate search.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChirpOptions {
    /// Reference clock frequency in Hz.
    pub clock_hz: f64,
    /// The search stops once `|div_rate / inc_rate - target|` is below this
    /// value.
    pub tolerance: f64,
    /// Width of the `div_rate` and `inc_rate` registers.
    pub rate_bits: u8,
    /// Optional limit on the number of candidates tried after the first one.
    ///
    /// If `None`, the search is only bounded by the register width.
    pub max_iterations: Option<u64>,
}

impl Default for ChirpOptions {
    fn default() -> ChirpOptions {
        ChirpOptions {
            clock_hz: constants::CLOCK_FREQUENCY,
            tolerance: constants::RATE_TOLERANCE,
            rate_bits: constants::RATE_BITS,
            max_iterations: None,
        }
    }
}

/// Result of a chirp rate design.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChirpConstants {
    target: f64,
    span: u64,
    clock_hz: f64,
    tolerance: f64,
    rate_bits: u8,
    smooth: Approximation,
    accurate: Approximation,
    iterations: u64,
}

impl ChirpConstants {
    /// Returns the target value for `div_rate / inc_rate`.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Returns the smoothness-optimized design, which has `inc_rate = 1`.
    pub fn smooth(&self) -> Approximation {
        self.smooth
    }

    /// Returns the length-optimized design.
    ///
    /// Its error is never larger than the error of the smooth design.
    pub fn accurate(&self) -> Approximation {
        self.accurate
    }

    /// Returns one of the two designs.
    pub fn select(&self, optimize: Optimize) -> Approximation {
        match optimize {
            Optimize::Smoothness => self.smooth,
            Optimize::Length => self.accurate,
        }
    }

    /// Returns the tolerance that was requested.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns `true` if the accurate design fits the registers and meets the
    /// tolerance.
    ///
    /// An exact design always meets the tolerance, even if it is zero.
    pub fn tolerance_met(&self) -> bool {
        self.rates_fit() && (self.accurate.error < self.tolerance || self.accurate.error == 0.0)
    }

    /// Returns `true` if the rate pairs fit in the rate registers.
    ///
    /// This is only `false` for chirps so slow that `round(target)` overflows
    /// the `div_rate` register. In that case the smooth pair is returned
    /// as the accurate pair too, and it cannot be programmed.
    pub fn rates_fit(&self) -> bool {
        self.accurate.rates.div_rate <= self.max_rate()
    }

    fn max_rate(&self) -> u64 {
        (1u64 << self.rate_bits) - 1
    }

    /// Returns the number of candidates tried after the first one.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Returns the register values as `(div_rate_smooth, inc_rate_smooth,
    /// div_rate_accurate, inc_rate_accurate)`.
    pub fn registers(&self) -> (u64, u64, u64, u64) {
        (
            self.smooth.rates.div_rate,
            self.smooth.rates.inc_rate,
            self.accurate.rates.div_rate,
            self.accurate.rates.inc_rate,
        )
    }

    /// Returns the length in seconds of the chirp produced by a rate pair.
    pub fn chirp_length(&self, rates: RatePair) -> f64 {
        rates.div_rate as f64 * self.span as f64 / (rates.inc_rate as f64 * self.clock_hz)
    }

    /// Returns the warnings of this design.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if !self.rates_fit() {
            warnings.push(Warning::OutOfRange {
                value: self.accurate.rates.div_rate,
                min: 0,
                max: self.max_rate(),
            });
        }
        if !self.tolerance_met() {
            warnings.push(Warning::ToleranceNotMet {
                error: self.accurate.error,
                tolerance: self.tolerance,
            });
        }
        warnings
    }
}

/// Computes the chirp rate registers for a sweep.
///
/// The sweep goes between the control words `min_ctrl` and `max_ctrl` in
/// `length` seconds. Down chirps, where `max_ctrl < min_ctrl`, are designed
/// with the same rates as the equivalent up chirp.
///
/// The search starts with `inc_rate = 1` and increases `inc_rate` one by one,
/// setting `div_rate` to the nearest integer to `target * inc_rate`. It
/// stops when the best error is below the tolerance or zero, or when either
/// register would overflow `options.rate_bits`. In the latter case the best
/// pair found is still returned, and [`ChirpConstants::tolerance_met`] is
/// `false`. If not even `div_rate = round(target)` fits the registers, no
/// search is done and that pair is returned with
/// [`ChirpConstants::rates_fit`] set to `false`.
///
/// An error is returned if the control words are equal, if the length or the
/// clock are not positive finite numbers, or if the tolerance is negative or
/// NaN.
pub fn chirp_constants(
    min_ctrl: u64,
    max_ctrl: u64,
    length: f64,
    options: &ChirpOptions,
) -> Result<ChirpConstants> {
    let span = max_ctrl.abs_diff(min_ctrl);
    if span == 0 {
        return Err(Error::invalid("control-word range has zero width"));
    }
    if !length.is_finite() || length <= 0.0 {
        return Err(Error::invalid(format!(
            "chirp length {length} is not a positive number"
        )));
    }
    if !options.clock_hz.is_finite() || options.clock_hz <= 0.0 {
        return Err(Error::invalid(format!(
            "clock frequency {} is not a positive number",
            options.clock_hz
        )));
    }
    if options.tolerance.is_nan() || options.tolerance < 0.0 {
        return Err(Error::invalid(format!(
            "tolerance {} is negative",
            options.tolerance
        )));
    }
    if !(1..=63).contains(&options.rate_bits) {
        return Err(Error::invalid(format!(
            "rate register width {} not in [1, 63]",
            options.rate_bits
        )));
    }

    let target = length * options.clock_hz / span as f64;
    let limit = 1u64 << options.rate_bits;
    let div_rate = target.round();
    let fits = div_rate < limit as f64;
    let smooth = Approximation {
        rates: RatePair {
            div_rate: div_rate as u64,
            inc_rate: 1,
        },
        error: (div_rate - target).abs(),
    };

    let mut best = smooth;
    let mut inc_rate = 1u64;
    let mut iterations = 0u64;
    while fits && best.error >= options.tolerance && best.error > 0.0 {
        if inc_rate + 1 >= limit {
            break;
        }
        if options.max_iterations.is_some_and(|max| iterations >= max) {
            break;
        }
        inc_rate += 1;
        iterations += 1;
        let div_rate = (target * inc_rate as f64).round();
        if div_rate >= limit as f64 {
            break;
        }
        let error = (div_rate / inc_rate as f64 - target).abs();
        if error < best.error {
            best = Approximation {
                rates: RatePair {
                    div_rate: div_rate as u64,
                    inc_rate,
                },
                error,
            };
        }
    }

    tracing::debug!(
        target_ratio = target,
        iterations,
        div_rate = best.rates.div_rate,
        inc_rate = best.rates.inc_rate,
        error = best.error,
        "chirp rate search finished"
    );

    Ok(ChirpConstants {
        target,
        span,
        clock_hz: options.clock_hz,
        tolerance: options.tolerance,
        rate_bits: options.rate_bits,
        smooth,
        accurate: best,
        iterations,
    })
}
