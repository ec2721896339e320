//! mawg CLI arguments.
//!
//! This module contains the definition of the CLI arguments for the mawg
//! application.

use crate::lut::Wave;
use crate::nco::constants;
use crate::serial;
use clap::{Parser, Subcommand};
use mawg_json::{Output, Waveform};
use std::path::PathBuf;

/// mawg CLI arguments.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Reference clock frequency in Hz
    #[clap(short, long, global = true, default_value_t = constants::CLOCK_FREQUENCY)]
    pub clock: f64,
    /// Width of the NCO phase word in bits
    #[clap(
        long,
        global = true,
        default_value_t = constants::PHASE_BITS,
        value_parser = clap::value_parser!(u8).range(1..=i64::from(constants::MAX_PHASE_BITS))
    )]
    pub phase_bits: u8,
    /// Print reports and frames as JSON
    #[clap(long, global = true)]
    pub json: bool,
    /// Serial port connected to the MAWG
    #[clap(long, global = true, default_value = serial::SERIAL_PORT)]
    pub port: PathBuf,
    /// Baud rate of the serial port
    #[clap(long, global = true, default_value_t = serial::BAUD_RATE)]
    pub baud: u32,
    /// Print the command frames instead of sending them
    #[clap(long, global = true)]
    pub dry_run: bool,
    /// Command to run
    #[clap(subcommand)]
    pub command: Command,
}

/// mawg commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Compute the NCO control word for a frequency
    NcoValues {
        /// Frequency in Hz
        frequency: f64,
        /// Print an instantiation of the nco Verilog module
        #[clap(long)]
        verilog: bool,
    },
    /// Compute the chirp registers for a frequency sweep
    ChirpValues {
        /// Start frequency in Hz
        min_frequency: f64,
        /// End frequency in Hz
        max_frequency: f64,
        /// Chirp length in seconds
        length: f64,
        /// Tolerance of the div_rate / inc_rate search
        #[clap(long, default_value_t = constants::RATE_TOLERANCE)]
        tolerance: f64,
        /// Width of the rate registers in bits
        #[clap(
            long,
            default_value_t = constants::RATE_BITS,
            value_parser = clap::value_parser!(u8).range(1..=63)
        )]
        rate_bits: u8,
        /// Limit on the number of search iterations
        #[clap(long)]
        max_iterations: Option<u64>,
        /// Print an instantiation of the chirp Verilog module
        #[clap(long)]
        verilog: bool,
    },
    /// Compute the divider of the legacy sine generator
    DividerValues {
        /// Frequency in Hz
        frequency: f64,
        /// Number of bits that index the samples of one period
        #[clap(
            long,
            default_value_t = 8,
            value_parser = clap::value_parser!(u8)
                .range(1..=i64::from(constants::MAX_DIVIDER_SAMPLE_BITS))
        )]
        samples: u8,
    },
    /// Print a sinusoid look-up table as a Verilog case body
    GenerateLut {
        /// Number of bits that index the samples of a period
        sample_bits: u8,
        /// Number of bits of each sample
        resolution_bits: u8,
        /// Tabulated function
        #[clap(value_enum)]
        wave: Wave,
        /// Number of spaces at the start of each line
        #[clap(short, long, default_value_t = 0)]
        padding: usize,
        /// Name of the assigned register
        #[clap(short, long, default_value = "value")]
        name: String,
        /// Generate unsigned samples
        #[clap(short, long)]
        unsigned: bool,
        /// Generate the full period instead of the first quarter
        #[clap(short, long)]
        full: bool,
    },
    /// Select the output signal (message, modulated, demodulated)
    Select {
        /// Output signal
        #[clap(value_parser = parse_output)]
        output: Output,
    },
    /// Select the modulating waveform (sine, chirp, sawtooth, pulse)
    SetWave {
        /// Waveform
        #[clap(value_parser = parse_waveform)]
        wave: Waveform,
    },
    /// Set the NCO frequency
    SetFreq {
        /// Frequency in Hz
        frequency: f64,
    },
    /// Output a sine wave
    Sine {
        /// Frequency in Hz
        frequency: f64,
    },
    /// Output a chirp
    Chirp {
        /// Start frequency in Hz
        min_frequency: f64,
        /// End frequency in Hz
        max_frequency: f64,
        /// Chirp length in seconds
        length: f64,
        /// Number of chirp lengths to wait between chirps
        #[clap(
            short,
            long,
            default_value_t = 0,
            value_parser = clap::value_parser!(u32)
                .range(0..=i64::from(constants::MAX_CHIRP_DELAY))
        )]
        delay: u32,
        /// Use the most accurate length instead of the smoothest sweep
        #[clap(long)]
        accurate: bool,
        /// Sweep from the end frequency down to the start frequency
        #[clap(short, long)]
        reverse: bool,
        /// Tolerance of the div_rate / inc_rate search
        #[clap(long, default_value_t = constants::RATE_TOLERANCE)]
        tolerance: f64,
    },
    /// Output a sawtooth
    Sawtooth {
        /// Frequency in Hz (the current frequency is kept if omitted)
        frequency: Option<f64>,
    },
    /// Output a pulse wave
    Pulse {
        /// Frequency in Hz
        frequency: f64,
        /// Duty cycle, as a fraction in [0, 1] or a percentage ending in %
        #[clap(value_parser = parse_duty, default_value_t = 0.5)]
        duty: f64,
    },
    /// Output an FM modulated signal
    Fm {
        /// Carrier frequency in Hz
        center: f64,
        /// Frequency deviation in Hz
        deviation: f64,
        /// Demodulator rate register
        #[clap(long, default_value_t = constants::DEMOD_RATE, value_parser = parse_based_u32)]
        demod_rate: u32,
    },
    /// Reset the configuration registers
    Reset,
    /// Send a raw command
    Manual {
        /// Opcode
        #[clap(value_parser = parse_based_u8)]
        opcode: u8,
        /// 32-bit data word
        #[clap(value_parser = parse_based_u32)]
        data: u32,
    },
}

impl Command {
    /// Returns `true` if the command talks to the device.
    pub fn is_device_command(&self) -> bool {
        !matches!(
            self,
            Command::NcoValues { .. }
                | Command::ChirpValues { .. }
                | Command::DividerValues { .. }
                | Command::GenerateLut { .. }
        )
    }
}

/// Parses an integer with an optional base prefix.
///
/// `0x` selects hexadecimal, `0b` binary and a leading `0` octal. Underscores
/// are ignored.
pub fn parse_based_int(s: &str) -> Result<u64, String> {
    let s = s.trim().replace('_', "");
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or(s.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or(s.strip_prefix("0B")) {
        (bin, 2)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s.as_str(), 10)
    };
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid integer {s:?}: {e}"))
}

/// Parses a based integer that fits in a `u32`.
pub fn parse_based_u32(s: &str) -> Result<u32, String> {
    let value = parse_based_int(s)?;
    u32::try_from(value).map_err(|_| format!("{value} does not fit in 32 bits"))
}

/// Parses a based integer that fits in a `u8`.
pub fn parse_based_u8(s: &str) -> Result<u8, String> {
    let value = parse_based_int(s)?;
    u8::try_from(value).map_err(|_| format!("{value} does not fit in 8 bits"))
}

/// Parses an output name.
pub fn parse_output(s: &str) -> Result<Output, String> {
    s.to_lowercase()
        .parse()
        .map_err(|_| format!("unknown output {s:?}"))
}

/// Parses a waveform name.
pub fn parse_waveform(s: &str) -> Result<Waveform, String> {
    s.to_lowercase()
        .parse()
        .map_err(|_| format!("unknown waveform {s:?}"))
}

/// Parses a duty cycle.
pub fn parse_duty(s: &str) -> Result<f64, String> {
    let duty = match s.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().map(|x| x / 100.0),
        None => s.parse::<f64>(),
    }
    .map_err(|e| format!("invalid duty cycle {s:?}: {e}"))?;
    if !(0.0..=1.0).contains(&duty) {
        return Err(format!("duty cycle {s} not in [0, 1]"));
    }
    Ok(duty)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn based_ints() {
        assert_eq!(parse_based_int("29"), Ok(29));
        assert_eq!(parse_based_int("0x1d"), Ok(29));
        assert_eq!(parse_based_int("0X1D"), Ok(29));
        assert_eq!(parse_based_int("0b11101"), Ok(29));
        assert_eq!(parse_based_int("035"), Ok(29));
        assert_eq!(parse_based_int("0"), Ok(0));
        assert_eq!(parse_based_int("0xdead_beef"), Ok(0xdead_beef));
        assert!(parse_based_int("0x").is_err());
        assert!(parse_based_int("09").is_err());
        assert!(parse_based_int("-1").is_err());
        assert_eq!(parse_based_u32("0xffffffff"), Ok(u32::MAX));
        assert!(parse_based_u32("0x100000000").is_err());
        assert_eq!(parse_based_u8("0xf"), Ok(15));
        assert!(parse_based_u8("256").is_err());
    }

    #[test]
    fn names() {
        assert_eq!(parse_output("Modulated"), Ok(Output::Modulated));
        assert!(parse_output("carrier").is_err());
        assert_eq!(parse_waveform("SAWTOOTH"), Ok(Waveform::Sawtooth));
    }

    #[test]
    fn duty() {
        assert_eq!(parse_duty("0.25"), Ok(0.25));
        assert_eq!(parse_duty("50%"), Ok(0.5));
        assert!(parse_duty("150%").is_err());
        assert!(parse_duty("half").is_err());
    }

    #[test]
    fn command_line() {
        let args = Args::parse_from(["mawg", "--dry-run", "manual", "0xc", "0b101"]);
        assert!(args.dry_run);
        assert_eq!(args.clock, constants::CLOCK_FREQUENCY);
        assert_eq!(args.port, PathBuf::from(serial::SERIAL_PORT));
        assert_eq!(
            args.command,
            Command::Manual {
                opcode: 0xc,
                data: 5
            }
        );
        assert!(args.command.is_device_command());

        let args = Args::parse_from(["mawg", "nco-values", "1000", "--phase-bits", "24"]);
        assert_eq!(args.phase_bits, 24);
        assert!(!args.command.is_device_command());

        let args = Args::parse_from(["mawg", "pulse", "1000"]);
        assert_eq!(
            args.command,
            Command::Pulse {
                frequency: 1000.0,
                duty: 0.5
            }
        );

        assert!(Args::try_parse_from(["mawg", "chirp", "1", "2", "1", "--delay", "16"]).is_err());
        assert!(Args::try_parse_from(["mawg", "--phase-bits", "64", "reset"]).is_err());
    }

    #[test]
    fn verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
