//! mawg is a toolkit for the MAWG FPGA waveform generator. It computes the
//! fixed-point control words of the numerically-controlled oscillator, designs
//! the rate registers of the chirp module, generates Verilog look-up tables and
//! instantiation templates, and configures the generator through its serial
//! link.

#![warn(missing_docs)]

pub mod app;
pub mod args;
pub mod chirp;
pub mod error;
pub mod fm;
pub mod generator;
pub mod hdl;
pub mod lut;
pub mod nco;
pub mod report;
pub mod serial;

pub use error::{Error, Result, Warning};
