//! Verilog instantiation templates.
//!
//! This module prints instantiations of the `nco` and `chirp` modules of the
//! FPGA design with their input ports tied to the computed constants.

use crate::chirp::RatePair;
use crate::nco::ControlWord;
use chrono::prelude::*;

const GENERATOR: &str = concat!("mawg v", env!("CARGO_PKG_VERSION"));

/// Formats a value as a sized Verilog hex literal.
///
/// # Examples
/// ```
/// assert_eq!(mawg::hdl::literal(0xabc, 16), "16'h0ABC");
/// ```
pub fn literal(value: u64, bits: u8) -> String {
    let digits = (usize::from(bits) + 3) / 4;
    format!("{bits}'h{value:0digits$X}")
}

fn header(datetime: DateTime<Utc>, description: &str) -> String {
    format!(
        "// Generated by {GENERATOR} on {}\n// {description}\n",
        datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Instantiation of the `nco` module.
#[derive(Debug, Clone, PartialEq)]
pub struct NcoInstance {
    /// Requested frequency in Hz.
    pub frequency: f64,
    /// Frequency produced by the control word in Hz.
    pub actual_frequency: f64,
    /// Phase control word.
    pub ctrl: ControlWord,
}

impl NcoInstance {
    /// Returns the Verilog code of the instantiation.
    pub fn to_verilog(&self, datetime: DateTime<Utc>) -> String {
        let bits = self.ctrl.bits();
        format!(
            "{}nco #(
    .PHASE_BITS({bits})
) nco_inst (
    .clk(clk),
    .ctrl({}),
    .out(nco_out)
);
",
            header(
                datetime,
                &format!(
                    "NCO at {} Hz (actual {} Hz)",
                    self.frequency, self.actual_frequency
                )
            ),
            literal(self.ctrl.value(), bits),
        )
    }
}

/// Instantiation of the `chirp` module.
#[derive(Debug, Clone, PartialEq)]
pub struct ChirpInstance {
    /// Control word at the start of the sweep.
    pub min_ctrl: ControlWord,
    /// Control word at the end of the sweep.
    pub max_ctrl: ControlWord,
    /// Rate registers.
    pub rates: RatePair,
    /// Width of the rate registers.
    pub rate_bits: u8,
    /// Requested chirp length in seconds.
    pub length: f64,
    /// Chirp length obtained with the rate registers in seconds.
    pub actual_length: f64,
}

impl ChirpInstance {
    /// Returns the Verilog code of the instantiation.
    pub fn to_verilog(&self, datetime: DateTime<Utc>) -> String {
        let phase_bits = self.min_ctrl.bits();
        format!(
            "{}chirp #(
    .PHASE_BITS({phase_bits}),
    .RATE_BITS({})
) chirp_inst (
    .clk(clk),
    .min_ctrl({}),
    .max_ctrl({}),
    .div_rate({}),
    .inc_rate({}),
    .out(chirp_out)
);
",
            header(
                datetime,
                &format!(
                    "chirp of {} s (actual {} s)",
                    self.length, self.actual_length
                )
            ),
            self.rate_bits,
            literal(self.min_ctrl.value(), phase_bits),
            literal(self.max_ctrl.value(), self.max_ctrl.bits()),
            literal(self.rates.div_rate, self.rate_bits),
            literal(self.rates.inc_rate, self.rate_bits),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn literals() {
        assert_eq!(literal(0, 32), "32'h00000000");
        assert_eq!(literal(42950, 32), "32'h0000A7C6");
        assert_eq!(literal(5, 3), "3'h5");
        assert_eq!(literal(0x1d, 6), "6'h1D");
    }

    #[test]
    fn nco() {
        let inst = NcoInstance {
            frequency: 1000.0,
            actual_frequency: 1000.0001,
            ctrl: ControlWord::new(42950, 32),
        };
        let expected = [
            "// Generated by ",
            GENERATOR,
            " on 2024-03-01T12:00:00Z\n",
            "// NCO at 1000 Hz (actual 1000.0001 Hz)\n",
            "nco #(\n",
            "    .PHASE_BITS(32)\n",
            ") nco_inst (\n",
            "    .clk(clk),\n",
            "    .ctrl(32'h0000A7C6),\n",
            "    .out(nco_out)\n",
            ");\n",
        ]
        .join("");
        assert_eq!(inst.to_verilog(datetime()), expected);
    }

    #[test]
    fn chirp() {
        let inst = ChirpInstance {
            min_ctrl: ControlWord::new(0x100000, 32),
            max_ctrl: ControlWord::new(0x200000, 32),
            rates: RatePair {
                div_rate: 390625,
                inc_rate: 4096,
            },
            rate_bits: 32,
            length: 1.0,
            actual_length: 1.0,
        };
        let verilog = inst.to_verilog(datetime());
        assert!(verilog.contains("// chirp of 1 s (actual 1 s)\n"));
        assert!(verilog.contains("    .min_ctrl(32'h00100000),\n"));
        assert!(verilog.contains("    .max_ctrl(32'h00200000),\n"));
        assert!(verilog.contains("    .div_rate(32'h0005F5E1),\n"));
        assert!(verilog.contains("    .inc_rate(32'h00001000),\n"));
        assert!(verilog.ends_with(");\n"));
    }
}
