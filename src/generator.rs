//! MAWG waveform generator configuration.
//!
//! This module contains [`Generator`], which translates high level settings
//! (frequencies, chirp lengths, duty cycles) into the command sequences
//! understood by the MAWG and sends them through a [`ConfigSink`].

use crate::chirp::{self, ChirpConstants, ChirpOptions, Optimize};
use crate::fm::FmDesign;
use crate::nco::{constants, ControlWord, Nco};
use crate::serial::{ConfigSink, Opcode};
use anyhow::{Context, Result};
use mawg_json::{Output, Waveform};

/// Chirp settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChirpRequest {
    /// Frequency at the start of an up chirp, in Hz.
    pub min_freq: f64,
    /// Frequency at the end of an up chirp, in Hz.
    pub max_freq: f64,
    /// Length of the chirp in seconds.
    pub length: f64,
    /// Number of chirp lengths to wait between chirps.
    pub delay: u32,
    /// Rate pair to use.
    pub optimize: Optimize,
    /// Sweep from `max_freq` down to `min_freq`.
    pub reverse: bool,
    /// Tolerance of the rate search.
    pub tolerance: f64,
}

impl Default for ChirpRequest {
    fn default() -> ChirpRequest {
        ChirpRequest {
            min_freq: 0.0,
            max_freq: 0.0,
            length: 0.0,
            delay: 0,
            optimize: Optimize::default(),
            reverse: false,
            tolerance: constants::RATE_TOLERANCE,
        }
    }
}

/// MAWG waveform generator.
///
/// Every operation validates all its values before sending the first
/// command, so that a failed operation leaves the device untouched.
#[derive(Debug)]
pub struct Generator<S> {
    sink: S,
    nco: Nco,
}

impl<S: ConfigSink> Generator<S> {
    /// Creates a generator that sends commands to `sink`.
    ///
    /// The control words are computed for the NCO described by `nco`. Its
    /// phase word must fit in the 32-bit data word of the commands.
    pub fn new(sink: S, nco: Nco) -> Result<Generator<S>> {
        if nco.phase_bits() > constants::DATA_BITS {
            anyhow::bail!(
                "phase word width {} does not fit in a {}-bit command",
                nco.phase_bits(),
                constants::DATA_BITS
            );
        }
        Ok(Generator { sink, nco })
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the sink, consuming the generator.
    pub fn into_sink(self) -> S {
        self.sink
    }

    async fn send(&mut self, opcode: Opcode, data: u32) -> Result<()> {
        self.sink.send(opcode.into(), data).await
    }

    fn control_word(&self, freq_hz: f64) -> Result<u32> {
        let ctrl = self.nco.control_word(freq_hz)?;
        data_word(ctrl).with_context(|| format!("cannot produce {freq_hz} Hz"))
    }

    /// Selects the signal routed to the output.
    pub async fn select(&mut self, output: Output) -> Result<()> {
        tracing::info!(%output, "selecting output");
        let index = match output {
            Output::Message => 0,
            Output::Modulated => 1,
            Output::Demodulated => 2,
        };
        self.send(Opcode::Select, index).await
    }

    /// Selects the modulating waveform.
    pub async fn set_wave(&mut self, wave: Waveform) -> Result<()> {
        tracing::info!(%wave, "selecting waveform");
        let index = match wave {
            Waveform::Sine => 0,
            Waveform::Chirp => 1,
            Waveform::Sawtooth => 2,
            Waveform::Pulse => 3,
        };
        self.send(Opcode::Wave, index).await
    }

    /// Sets the NCO frequency.
    pub async fn set_frequency(&mut self, freq_hz: f64) -> Result<()> {
        let ctrl = self.control_word(freq_hz)?;
        tracing::info!(
            "setting frequency {} Hz (control word {:#010x}, actual {} Hz)",
            freq_hz,
            ctrl,
            self.nco.frequency(ctrl.into())
        );
        self.send(Opcode::Frequency, ctrl).await
    }

    /// Configures and outputs a sine wave.
    pub async fn sine(&mut self, freq_hz: f64) -> Result<()> {
        self.set_frequency(freq_hz).await?;
        self.set_wave(Waveform::Sine).await
    }

    /// Configures and outputs a chirp.
    ///
    /// Returns the rate design, so that the caller can report it.
    pub async fn chirp(&mut self, request: &ChirpRequest) -> Result<ChirpConstants> {
        if request.delay > constants::MAX_CHIRP_DELAY {
            anyhow::bail!(
                "chirp delay {} larger than {}",
                request.delay,
                constants::MAX_CHIRP_DELAY
            );
        }
        let min_ctrl = self.control_word(request.min_freq)?;
        let max_ctrl = self.control_word(request.max_freq)?;
        let design = chirp::chirp_constants(
            min_ctrl.into(),
            max_ctrl.into(),
            request.length,
            &ChirpOptions {
                clock_hz: self.nco.clock_hz(),
                tolerance: request.tolerance,
                ..ChirpOptions::default()
            },
        )?;
        for warning in design.warnings() {
            tracing::warn!("{warning}");
        }
        if !design.rates_fit() {
            anyhow::bail!(
                "chirp too slow: div_rate {} does not fit in the rate registers",
                design.accurate().rates.div_rate
            );
        }
        let rates = design.select(request.optimize).rates;
        if rates.div_rate == 0 {
            anyhow::bail!("chirp too fast: div_rate rounds to 0");
        }
        let div_rate = u32::try_from(rates.div_rate).context("div_rate overflow")?;
        let inc_rate = u32::try_from(rates.inc_rate).context("inc_rate overflow")?;
        tracing::info!(
            min_ctrl,
            max_ctrl,
            div_rate,
            inc_rate,
            "configuring chirp of {} s",
            design.chirp_length(rates)
        );

        self.send(Opcode::ChirpDirection, request.reverse.into())
            .await?;
        self.send(Opcode::ChirpDelay, request.delay).await?;
        self.send(Opcode::ChirpMin, min_ctrl).await?;
        self.send(Opcode::ChirpMax, max_ctrl).await?;
        self.send(Opcode::DivRate, div_rate).await?;
        self.send(Opcode::IncRate, inc_rate).await?;
        self.set_wave(Waveform::Chirp).await?;
        Ok(design)
    }

    /// Configures and outputs a sawtooth.
    ///
    /// The frequency is left unchanged if `freq_hz` is `None` or zero.
    pub async fn sawtooth(&mut self, freq_hz: Option<f64>) -> Result<()> {
        match freq_hz {
            Some(freq_hz) if freq_hz != 0.0 => self.set_frequency(freq_hz).await?,
            _ => (),
        }
        self.set_wave(Waveform::Sawtooth).await
    }

    /// Configures and outputs a pulse wave.
    ///
    /// The duty cycle must be in `[0, 1]`.
    pub async fn pulse(&mut self, freq_hz: f64, duty: f64) -> Result<()> {
        let duty_word = duty_word(duty)?;
        let ctrl = self.control_word(freq_hz)?;
        tracing::info!("setting duty cycle {duty} ({duty_word:#010x})");
        self.send(Opcode::Frequency, ctrl).await?;
        self.send(Opcode::PulseDuty, duty_word).await?;
        self.set_wave(Waveform::Pulse).await
    }

    /// Configures frequency modulation and routes the modulated signal to the
    /// output.
    pub async fn fm(&mut self, center_hz: f64, deviation_hz: f64, demod_rate: u32) -> Result<()> {
        let design = FmDesign::new(&self.nco, center_hz, deviation_hz)?;
        let center = data_word(design.center).context("invalid FM carrier")?;
        data_word(design.deviation).context("invalid FM deviation")?;
        let (low, high) = design.bounds(&self.nco, 1);
        tracing::info!(
            shift = design.shift,
            "configuring FM at {} Hz, covering {} Hz to {} Hz",
            center_hz,
            low,
            high
        );
        self.send(Opcode::DemodRate, demod_rate).await?;
        self.send(Opcode::FmDeviation, design.shift).await?;
        self.send(Opcode::FmCenter, center).await?;
        self.select(Output::Modulated).await
    }

    /// Resets all the configuration registers.
    pub async fn reset(&mut self) -> Result<()> {
        tracing::info!("resetting configuration");
        self.send(Opcode::Reset, 0).await
    }

    /// Sends an arbitrary command.
    pub async fn manual(&mut self, opcode: u8, data: u32) -> Result<()> {
        tracing::info!("sending command {opcode:#04x} with data {data:#010x}");
        self.sink.send(opcode, data).await
    }
}

/// Converts a control word into a command data word.
///
/// Zero is accepted, since it stops the oscillator. Only values that overflow
/// the register are rejected.
fn data_word(ctrl: ControlWord) -> Result<u32> {
    match ctrl.check() {
        Some(warning) if ctrl.value() != 0 => anyhow::bail!("{warning}"),
        _ => Ok(u32::try_from(ctrl.value())?),
    }
}

/// Encodes a duty cycle in `[0, 1]` as a 32-bit fraction.
pub fn duty_word(duty: f64) -> Result<u32> {
    if !(0.0..=1.0).contains(&duty) {
        anyhow::bail!("duty cycle {duty} not in [0, 1]");
    }
    Ok((duty * f64::from(u32::MAX)).round() as u32)
}
