//! Sinusoid look-up tables.
//!
//! This module generates the body of a Verilog `case` statement that holds
//! the samples of a sine or cosine. By default only the first quarter of the
//! period is generated, since the FPGA obtains the other three quarters by
//! symmetry.

use crate::error::{Error, Result};
use std::f64::consts::PI;

/// Sinusoid to tabulate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum Wave {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
}

impl Wave {
    fn eval(self, x: f64) -> f64 {
        match self {
            Wave::Sin => x.sin(),
            Wave::Cos => x.cos(),
        }
    }
}

/// Look-up table parameters.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LutSpec {
    /// Number of bits that index the samples of a full period.
    pub sample_bits: u8,
    /// Number of bits of each sample, including the sign bit for signed
    /// tables.
    pub resolution_bits: u8,
    /// Tabulated function.
    pub wave: Wave,
    /// Number of spaces at the start of each line.
    pub padding: usize,
    /// Name of the Verilog register that is assigned.
    pub name: String,
    /// Generate unsigned samples in `[0, 2^R - 1]` instead of two's
    /// complement samples in `[-(2^(R-1) - 1), 2^(R-1) - 1]`.
    pub unsigned: bool,
    /// Generate the full period instead of the first quarter.
    pub full: bool,
}

impl LutSpec {
    fn validate(&self) -> Result<()> {
        let min_sample_bits = if self.full { 1 } else { 2 };
        if !(min_sample_bits..=16).contains(&self.sample_bits) {
            return Err(Error::invalid(format!(
                "sample bits {} not in [{min_sample_bits}, 16]",
                self.sample_bits
            )));
        }
        if !(1..=128).contains(&self.resolution_bits) {
            return Err(Error::invalid(format!(
                "resolution bits {} not in [1, 128]",
                self.resolution_bits
            )));
        }
        Ok(())
    }

    fn num_samples(&self) -> usize {
        let period = 1usize << self.sample_bits;
        if self.full {
            period
        } else {
            period / 4
        }
    }
}

/// Computes the samples of a look-up table.
///
/// Samples are given as raw register contents, so negative samples appear in
/// two's complement.
pub fn lut_values(spec: &LutSpec) -> Result<Vec<u128>> {
    spec.validate()?;
    let period = (1u64 << spec.sample_bits) as f64;
    let bits = i32::from(spec.resolution_bits);
    Ok((0..spec.num_samples())
        .map(|s| {
            let y = spec.wave.eval(2.0 * PI * s as f64 / period);
            if spec.unsigned {
                ((2f64.powi(bits) - 1.0) * (y + 1.0) / 2.0).round() as u128
            } else {
                let v = ((2f64.powi(bits - 1) - 1.0) * y).round() as i128;
                to_signed(v, spec.resolution_bits)
            }
        })
        .collect())
}

/// Returns the two's complement representation of `x` in `bits` bits.
fn to_signed(x: i128, bits: u8) -> u128 {
    let mask = if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    };
    x as u128 & mask
}

/// Generates the Verilog `case` body of a look-up table.
///
/// Each line has the form
///
/// ```text
/// 8'h01 : value <= 16'h0324;
/// ```
///
/// where the address is `sample_bits - 2` bits wide for a quarter table and
/// `sample_bits` bits wide for a full table. The returned string has no
/// trailing newline.
pub fn create_lut(spec: &LutSpec) -> Result<String> {
    let values = lut_values(spec)?;
    let sample_bits = usize::from(spec.sample_bits);
    let resolution_bits = usize::from(spec.resolution_bits);
    let (addr_bits, addr_digits, value_digits) = if spec.full {
        (sample_bits, sample_bits / 4, resolution_bits / 4)
    } else {
        (
            sample_bits - 2,
            (sample_bits + 1) / 4,
            (resolution_bits + 3) / 4,
        )
    };
    let pad = " ".repeat(spec.padding);
    let lines = values
        .iter()
        .enumerate()
        .map(|(s, v)| {
            format!(
                "{pad}{addr_bits}'h{s:0addr_digits$X} : {} <= {resolution_bits}'h{v:0value_digits$X};",
                spec.name
            )
        })
        .collect::<Vec<_>>();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod test {
    use super::*;

    fn spec(sample_bits: u8, resolution_bits: u8, wave: Wave) -> LutSpec {
        LutSpec {
            sample_bits,
            resolution_bits,
            wave,
            padding: 0,
            name: "value".to_string(),
            unsigned: false,
            full: false,
        }
    }

    #[test]
    fn quarter_sine() {
        let lut = create_lut(&LutSpec {
            padding: 4,
            ..spec(4, 8, Wave::Sin)
        })
        .unwrap();
        let expected = [
            "    2'h0 : value <= 8'h00;",
            "    2'h1 : value <= 8'h31;",
            "    2'h2 : value <= 8'h5A;",
            "    2'h3 : value <= 8'h75;",
        ]
        .join("\n");
        assert_eq!(lut, expected);
    }

    #[test]
    fn full_cosine_signed() {
        let lut = create_lut(&LutSpec {
            full: true,
            name: "lut_value".to_string(),
            ..spec(2, 4, Wave::Cos)
        })
        .unwrap();
        let expected = [
            "2'h0 : lut_value <= 4'h7;",
            "2'h1 : lut_value <= 4'h0;",
            "2'h2 : lut_value <= 4'h9;",
            "2'h3 : lut_value <= 4'h0;",
        ]
        .join("\n");
        assert_eq!(lut, expected);
    }

    #[test]
    fn unsigned_values() {
        let values = lut_values(&LutSpec {
            unsigned: true,
            full: true,
            ..spec(2, 4, Wave::Sin)
        })
        .unwrap();
        assert_eq!(values, vec![8, 15, 8, 0]);
    }

    #[test]
    fn symmetric() {
        let values = lut_values(&LutSpec {
            full: true,
            ..spec(10, 16, Wave::Sin)
        })
        .unwrap();
        assert_eq!(values.len(), 1024);
        assert_eq!(values[256], 0x7fff);
        // sin(x + pi) = -sin(x)
        for s in 1..256 {
            assert_eq!(values[s] + values[s + 512], 1 << 16);
        }
    }

    #[test]
    fn two_complement() {
        assert_eq!(to_signed(-1, 8), 0xff);
        assert_eq!(to_signed(-127, 8), 0x81);
        assert_eq!(to_signed(5, 8), 5);
        assert_eq!(to_signed(-1, 128), u128::MAX);
    }

    #[test]
    fn wide_samples() {
        let values = lut_values(&LutSpec {
            full: true,
            ..spec(2, 128, Wave::Sin)
        })
        .unwrap();
        // 2^127 - 1 is not representable in f64, so the peaks saturate
        assert_eq!(values[1], i128::MAX as u128);
        assert_eq!(values[3], 1 << 127);
        let lut = create_lut(&LutSpec {
            full: true,
            ..spec(2, 128, Wave::Sin)
        })
        .unwrap();
        assert!(lut.contains("2'h1 : value <= 128'h7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF;"));
    }

    #[test]
    fn invalid() {
        assert!(create_lut(&spec(1, 8, Wave::Sin)).is_err());
        assert!(create_lut(&spec(17, 8, Wave::Sin)).is_err());
        assert!(create_lut(&spec(8, 0, Wave::Sin)).is_err());
        assert!(create_lut(&spec(8, 129, Wave::Sin)).is_err());
        assert!(create_lut(&LutSpec {
            full: true,
            ..spec(1, 8, Wave::Sin)
        })
        .is_ok());
    }
}
