//! mawg application.
//!
//! This module contains a top-level structure [`App`] that represents the whole
//! mawg application. It runs one of the commands given in the
//! [`Args`](crate::args::Args) and prints its results to stdout.

use crate::{
    args::{Args, Command},
    chirp::{self, ChirpOptions, Optimize},
    generator::{ChirpRequest, Generator},
    hdl::{ChirpInstance, NcoInstance},
    lut::{self, LutSpec},
    nco::{self, Nco},
    report::{self, ChirpReport, DividerReport, NcoReport},
    serial::{self, ConfigSink, Recorder},
};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

/// mawg application.
///
/// This struct owns the parsed arguments and the NCO description derived from
/// them.
#[derive(Debug)]
pub struct App {
    args: Args,
    nco: Nco,
}

impl App {
    /// Creates a new application.
    #[tracing::instrument(name = "App::new", level = "debug")]
    pub fn new(args: &Args) -> Result<App> {
        let nco = Nco::new(args.clock, args.phase_bits)?;
        Ok(App {
            args: args.clone(),
            nco,
        })
    }

    /// Runs the command.
    #[tracing::instrument(name = "App::run", level = "debug", skip_all)]
    pub async fn run(self) -> Result<()> {
        if !self.args.command.is_device_command() {
            return self.run_values();
        }
        if self.args.dry_run {
            let mut generator = Generator::new(Recorder::new(), self.nco)?;
            run_device(&self.args.command, &mut generator).await?;
            let frames = generator.sink().frames();
            if self.args.json {
                print_json(frames)?;
            } else {
                println!("{}", report::frames(frames));
            }
        } else {
            let transport = serial::open_serial(&self.args.port, self.args.baud).await?;
            let mut generator = Generator::new(transport, self.nco)?;
            run_device(&self.args.command, &mut generator).await?;
            tracing::info!(
                "sent {} frames",
                generator.into_sink().frames_sent()
            );
        }
        Ok(())
    }

    fn run_values(&self) -> Result<()> {
        match &self.args.command {
            Command::NcoValues { frequency, verilog } => {
                let report = NcoReport::new(self.nco, *frequency)?;
                if *verilog {
                    let inst = NcoInstance {
                        frequency: *frequency,
                        actual_frequency: report.actual_frequency(),
                        ctrl: report.control_word(),
                    };
                    print!("{}", inst.to_verilog(Utc::now()));
                } else if self.args.json {
                    print_json(&report.to_json())?;
                } else {
                    println!("{report}");
                }
            }
            Command::ChirpValues {
                min_frequency,
                max_frequency,
                length,
                tolerance,
                rate_bits,
                max_iterations,
                verilog,
            } => {
                let min_ctrl = self.nco.control_word(*min_frequency)?;
                let max_ctrl = self.nco.control_word(*max_frequency)?;
                let constants = chirp::chirp_constants(
                    min_ctrl.value(),
                    max_ctrl.value(),
                    *length,
                    &ChirpOptions {
                        clock_hz: self.nco.clock_hz(),
                        tolerance: *tolerance,
                        rate_bits: *rate_bits,
                        max_iterations: *max_iterations,
                    },
                )?;
                for warning in [min_ctrl.check(), max_ctrl.check()]
                    .into_iter()
                    .flatten()
                    .chain(constants.warnings())
                {
                    tracing::warn!("{warning}");
                }
                if *verilog {
                    let rates = constants.select(Optimize::Length).rates;
                    let inst = ChirpInstance {
                        min_ctrl,
                        max_ctrl,
                        rates,
                        rate_bits: *rate_bits,
                        length: *length,
                        actual_length: constants.chirp_length(rates),
                    };
                    print!("{}", inst.to_verilog(Utc::now()));
                    return Ok(());
                }
                let report = ChirpReport {
                    min_frequency: *min_frequency,
                    max_frequency: *max_frequency,
                    length: *length,
                    clock: self.nco.clock_hz(),
                    min_ctrl,
                    max_ctrl,
                    constants,
                };
                if self.args.json {
                    print_json(&report.to_json())?;
                } else {
                    println!("{report}");
                }
            }
            Command::DividerValues { frequency, samples } => {
                let divider = nco::divider_word(*frequency, self.nco.clock_hz(), *samples)?;
                if let Some(warning) = divider.check() {
                    tracing::warn!("{warning}");
                }
                let report = DividerReport {
                    frequency: *frequency,
                    clock: self.nco.clock_hz(),
                    divider,
                };
                if self.args.json {
                    print_json(&report.to_json())?;
                } else {
                    println!("{report}");
                }
            }
            Command::GenerateLut {
                sample_bits,
                resolution_bits,
                wave,
                padding,
                name,
                unsigned,
                full,
            } => {
                let spec = LutSpec {
                    sample_bits: *sample_bits,
                    resolution_bits: *resolution_bits,
                    wave: *wave,
                    padding: *padding,
                    name: name.clone(),
                    unsigned: *unsigned,
                    full: *full,
                };
                println!("{}", lut::create_lut(&spec)?);
            }
            _ => anyhow::bail!("not a values command"),
        }
        Ok(())
    }
}

async fn run_device<S: ConfigSink>(command: &Command, generator: &mut Generator<S>) -> Result<()> {
    match command {
        Command::Select { output } => generator.select(*output).await,
        Command::SetWave { wave } => generator.set_wave(*wave).await,
        Command::SetFreq { frequency } => generator.set_frequency(*frequency).await,
        Command::Sine { frequency } => generator.sine(*frequency).await,
        Command::Chirp {
            min_frequency,
            max_frequency,
            length,
            delay,
            accurate,
            reverse,
            tolerance,
        } => {
            let request = ChirpRequest {
                min_freq: *min_frequency,
                max_freq: *max_frequency,
                length: *length,
                delay: *delay,
                optimize: if *accurate {
                    Optimize::Length
                } else {
                    Optimize::Smoothness
                },
                reverse: *reverse,
                tolerance: *tolerance,
            };
            generator.chirp(&request).await.map(|_| ())
        }
        Command::Sawtooth { frequency } => generator.sawtooth(*frequency).await,
        Command::Pulse { frequency, duty } => generator.pulse(*frequency, *duty).await,
        Command::Fm {
            center,
            deviation,
            demod_rate,
        } => generator.fm(*center, *deviation, *demod_rate).await,
        Command::Reset => generator.reset().await,
        Command::Manual { opcode, data } => generator.manual(*opcode, *data).await,
        _ => anyhow::bail!("not a device command"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
