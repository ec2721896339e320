//! FM deviation encoding.
//!
//! The FM modulator adds the message sample, scaled by a power of two, to
//! the control word of the carrier. The scaling is programmed as a shift
//! amount that must be large enough to cover the requested deviation.

use crate::error::Result;
use crate::nco::{ControlWord, Nco};

/// Returns the deviation shift for a deviation control word.
///
/// The shift is `floor(log2(dev_ctrl)) + 1`, the number of bits needed to
/// represent `dev_ctrl`, so that `2^shift > dev_ctrl`. A deviation of zero
/// gives a shift of zero.
pub fn deviation_shift(dev_ctrl: u64) -> u32 {
    match dev_ctrl.checked_ilog2() {
        Some(log) => log + 1,
        None => 0,
    }
}

/// FM settings expressed as hardware values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FmDesign {
    /// Control word of the carrier.
    pub center: ControlWord,
    /// Control word of the requested deviation.
    pub deviation: ControlWord,
    /// Value of the deviation shift register.
    pub shift: u32,
}

impl FmDesign {
    /// Computes the FM hardware values for a carrier and a deviation in Hz.
    pub fn new(nco: &Nco, center_hz: f64, deviation_hz: f64) -> Result<FmDesign> {
        let center = nco.control_word(center_hz)?;
        let deviation = nco.control_word(deviation_hz)?;
        Ok(FmDesign {
            center,
            deviation,
            shift: deviation_shift(deviation.value()),
        })
    }

    /// Returns the frequency range covered by the modulator.
    ///
    /// See [`deviation_bounds`].
    pub fn bounds(&self, nco: &Nco, steps: u64) -> (f64, f64) {
        deviation_bounds(nco, self.center.value(), steps, self.shift)
    }
}

/// Returns the lowest and highest frequency reached by the modulator.
///
/// The control word of the carrier is moved by `steps << shift` in each
/// direction. The result saturates at zero and at the largest control word of
/// the phase register.
pub fn deviation_bounds(nco: &Nco, center: u64, steps: u64, shift: u32) -> (f64, f64) {
    let offset = steps.checked_shl(shift).unwrap_or(u64::MAX);
    let low = center.saturating_sub(offset);
    let high = center
        .saturating_add(offset)
        .min(nco.max_control_word());
    (nco.frequency(low), nco.frequency(high))
}
