//! Reports of computed hardware values.
//!
//! This module contains the reports printed by the `*-values` commands. Each
//! report can be formatted as human-readable text through its `Display`
//! implementation or converted into its `mawg-json` schema.

use crate::chirp::{Approximation, ChirpConstants};
use crate::nco::{ControlWord, DividerWord, Nco};
use colored::Colorize;
use std::fmt;

/// Report of an NCO control word.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NcoReport {
    frequency: f64,
    nco: Nco,
    ctrl: ControlWord,
}

impl NcoReport {
    /// Computes the control word for `frequency` and builds its report.
    pub fn new(nco: Nco, frequency: f64) -> crate::error::Result<NcoReport> {
        let ctrl = nco.control_word(frequency)?;
        if let Some(warning) = ctrl.check() {
            tracing::warn!("{warning}");
        }
        Ok(NcoReport {
            frequency,
            nco,
            ctrl,
        })
    }

    /// Returns the control word.
    pub fn control_word(&self) -> ControlWord {
        self.ctrl
    }

    /// Returns the frequency produced by the control word in Hz.
    pub fn actual_frequency(&self) -> f64 {
        self.nco.frequency(self.ctrl.value())
    }

    /// Converts the report into its JSON schema.
    pub fn to_json(&self) -> mawg_json::NcoValues {
        mawg_json::NcoValues {
            frequency: self.frequency,
            clock: self.nco.clock_hz(),
            phase_bits: self.nco.phase_bits(),
            control_word: self.ctrl.value(),
            actual_frequency: self.actual_frequency(),
            resolution: self.nco.resolution_hz(),
            valid: self.ctrl.is_valid(),
        }
    }
}

impl fmt::Display for NcoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "NCO".bold())?;
        writeln!(f, "  frequency:        {} Hz", self.frequency)?;
        writeln!(f, "  clock:            {} Hz", self.nco.clock_hz())?;
        writeln!(
            f,
            "  control word:     {} ({:#x}, {} bits)",
            self.ctrl.to_string().green(),
            self.ctrl.value(),
            self.ctrl.bits()
        )?;
        writeln!(f, "  actual frequency: {} Hz", self.actual_frequency())?;
        write!(f, "  resolution:       {} Hz", self.nco.resolution_hz())?;
        if let Some(warning) = self.ctrl.check() {
            write!(f, "\n{}", format!("warning: {warning}").yellow())?;
        }
        Ok(())
    }
}

/// Report of a chirp rate design.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChirpReport {
    /// Minimum sweep frequency in Hz.
    pub min_frequency: f64,
    /// Maximum sweep frequency in Hz.
    pub max_frequency: f64,
    /// Requested chirp length in seconds.
    pub length: f64,
    /// Reference clock frequency in Hz.
    pub clock: f64,
    /// Control word at the start of the sweep.
    pub min_ctrl: ControlWord,
    /// Control word at the end of the sweep.
    pub max_ctrl: ControlWord,
    /// Rate design.
    pub constants: ChirpConstants,
}

impl ChirpReport {
    fn approximation(&self, approx: Approximation) -> mawg_json::RateApproximation {
        mawg_json::RateApproximation {
            rates: approx.rates.into(),
            error: approx.error,
            actual_length: self.constants.chirp_length(approx.rates),
        }
    }

    fn warnings(&self) -> Vec<String> {
        [self.min_ctrl.check(), self.max_ctrl.check()]
            .into_iter()
            .flatten()
            .chain(self.constants.warnings())
            .map(|w| w.to_string())
            .collect()
    }

    /// Converts the report into its JSON schema.
    pub fn to_json(&self) -> mawg_json::ChirpValues {
        mawg_json::ChirpValues {
            min_frequency: self.min_frequency,
            max_frequency: self.max_frequency,
            length: self.length,
            clock: self.clock,
            min_control_word: self.min_ctrl.value(),
            max_control_word: self.max_ctrl.value(),
            target_ratio: self.constants.target(),
            smooth: self.approximation(self.constants.smooth()),
            accurate: self.approximation(self.constants.accurate()),
            tolerance: self.constants.tolerance(),
            tolerance_met: self.constants.tolerance_met(),
            warnings: self.warnings(),
        }
    }
}

impl fmt::Display for ChirpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Chirp".bold())?;
        writeln!(
            f,
            "  sweep:    {} Hz to {} Hz in {} s",
            self.min_frequency, self.max_frequency, self.length
        )?;
        writeln!(
            f,
            "  min_ctrl: {} ({:#x})",
            self.min_ctrl.to_string().green(),
            self.min_ctrl.value()
        )?;
        writeln!(
            f,
            "  max_ctrl: {} ({:#x})",
            self.max_ctrl.to_string().green(),
            self.max_ctrl.value()
        )?;
        writeln!(f, "  target:   {}", self.constants.target())?;
        for (name, approx) in [
            ("smooth", self.constants.smooth()),
            ("accurate", self.constants.accurate()),
        ] {
            let json = self.approximation(approx);
            writeln!(
                f,
                "  {name:<9} div_rate = {}, inc_rate = {}, error = {:e}, length = {} s",
                json.rates.div_rate.to_string().green(),
                json.rates.inc_rate.to_string().green(),
                json.error,
                json.actual_length
            )?;
        }
        write!(f, "  iterations: {}", self.constants.iterations())?;
        for warning in self.warnings() {
            write!(f, "\n{}", format!("warning: {warning}").yellow())?;
        }
        Ok(())
    }
}

/// Report of a legacy divider control word.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DividerReport {
    /// Requested frequency in Hz.
    pub frequency: f64,
    /// Reference clock frequency in Hz.
    pub clock: f64,
    /// Divider control word.
    pub divider: DividerWord,
}

impl DividerReport {
    /// Converts the report into its JSON schema.
    pub fn to_json(&self) -> mawg_json::DividerValues {
        mawg_json::DividerValues {
            frequency: self.frequency,
            clock: self.clock,
            sample_bits: self.divider.sample_bits(),
            control_word: self.divider.value(),
            valid: self.divider.is_valid(),
        }
    }
}

impl fmt::Display for DividerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Divider".bold())?;
        writeln!(f, "  frequency:    {} Hz", self.frequency)?;
        writeln!(f, "  samples:      2^{}", self.divider.sample_bits())?;
        write!(
            f,
            "  control word: {}",
            self.divider.value().to_string().green()
        )?;
        if let Some(warning) = self.divider.check() {
            write!(f, "\n{}", format!("warning: {warning}").yellow())?;
        }
        Ok(())
    }
}

/// Formats a list of frames as text, one frame per line.
pub fn frames(frames: &[mawg_json::Frame]) -> String {
    frames
        .iter()
        .map(|frame| {
            format!(
                "{:#04x} {:#010x}  [{}]",
                frame.opcode,
                frame.data,
                crate::serial::encode_frame(frame.opcode, frame.data)
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chirp::{chirp_constants, ChirpOptions};
    use crate::nco::divider_word;

    fn no_colors() {
        colored::control::set_override(false);
    }

    #[test]
    fn nco() {
        no_colors();
        let report = NcoReport::new(Nco::default(), 1e3).unwrap();
        let json = report.to_json();
        assert_eq!(json.control_word, 42950);
        assert!(json.valid);
        assert_eq!(json.phase_bits, 32);
        let text = report.to_string();
        assert!(text.contains("control word:     42950 (0xa7c6, 32 bits)"));
        assert!(!text.contains("warning"));
    }

    #[test]
    fn nco_warning() {
        no_colors();
        let report = NcoReport::new(Nco::default(), 0.0).unwrap();
        assert!(!report.to_json().valid);
        assert!(report
            .to_string()
            .ends_with("warning: control word 0 (0x0) out of range [1, 4294967295]"));
    }

    #[test]
    fn chirp() {
        no_colors();
        let constants = chirp_constants(0, 1_000_000, 1.0, &ChirpOptions::default()).unwrap();
        let report = ChirpReport {
            min_frequency: 0.0,
            max_frequency: 23283.064365386963,
            length: 1.0,
            clock: 100e6,
            min_ctrl: ControlWord::new(0, 32),
            max_ctrl: ControlWord::new(1_000_000, 32),
            constants,
        };
        let json = report.to_json();
        assert_eq!(json.target_ratio, 100.0);
        assert_eq!(
            json.smooth.rates,
            mawg_json::RatePair {
                div_rate: 100,
                inc_rate: 1
            }
        );
        assert_eq!(json.accurate.actual_length, 1.0);
        assert!(json.tolerance_met);
        // min_ctrl is 0
        assert_eq!(json.warnings.len(), 1);
        let text = report.to_string();
        assert!(text.contains("smooth    div_rate = 100, inc_rate = 1"));
        assert!(text.contains("warning: control word 0"));
    }

    #[test]
    fn divider() {
        no_colors();
        let report = DividerReport {
            frequency: 1e3,
            clock: 100e6,
            divider: divider_word(1e3, 100e6, 10).unwrap(),
        };
        assert_eq!(report.to_json().control_word, 98);
        assert!(report.to_string().ends_with("control word: 98"));
    }

    #[test]
    fn frame_list() {
        let text = frames(&[
            mawg_json::Frame {
                opcode: 0x2,
                data: 42950,
            },
            mawg_json::Frame {
                opcode: 0xf,
                data: 0,
            },
        ]);
        assert_eq!(
            text,
            "0x02 0x0000a7c6  [02 00 00 a7 c6]\n0x0f 0x00000000  [0f 00 00 00 00]"
        );
    }
}
