//! Serial configuration link.
//!
//! The MAWG is configured through a UART. Each command is a frame of five
//! bytes: an opcode byte followed by a 32-bit data word in big-endian order.
//! There is no reply from the device.

use anyhow::{Context, Result};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Default serial device.
pub const SERIAL_PORT: &str = "/dev/ttyUSB1";

/// Baud rate of the MAWG UART.
pub const BAUD_RATE: u32 = 62500;

/// Size in bytes of a command frame.
pub const FRAME_LEN: usize = 5;

/// Command opcodes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Output select (message, modulated, demodulated).
    Select = 0x0,
    /// Modulating waveform select.
    Wave = 0x1,
    /// NCO control word.
    Frequency = 0x2,
    /// Chirp direction (0 up, 1 down).
    ChirpDirection = 0x3,
    /// Delay between chirps, in chirp lengths.
    ChirpDelay = 0x4,
    /// Chirp start control word.
    ChirpMin = 0x5,
    /// Chirp end control word.
    ChirpMax = 0x6,
    /// Chirp `div_rate`.
    DivRate = 0x7,
    /// Chirp `inc_rate`.
    IncRate = 0x8,
    /// Pulse duty cycle.
    PulseDuty = 0x9,
    /// FM carrier control word.
    FmCenter = 0xa,
    /// FM deviation shift.
    FmDeviation = 0xb,
    /// FM demodulator rate.
    DemodRate = 0xc,
    /// Reset of all the configuration registers.
    Reset = 0xf,
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode as u8
    }
}

/// Encodes a command frame.
///
/// # Examples
/// ```
/// use mawg::serial::encode_frame;
/// assert_eq!(encode_frame(0x2, 0x0000a7c6), [0x02, 0x00, 0x00, 0xa7, 0xc6]);
/// ```
pub fn encode_frame(opcode: u8, data: u32) -> [u8; FRAME_LEN] {
    let [b3, b2, b1, b0] = data.to_be_bytes();
    [opcode, b3, b2, b1, b0]
}

/// Destination of configuration commands.
#[allow(async_fn_in_trait)]
pub trait ConfigSink {
    /// Sends a command to the device.
    async fn send(&mut self, opcode: u8, data: u32) -> Result<()>;
}

/// Command frame writer.
///
/// Encodes commands as frames and writes them to any asynchronous writer,
/// usually the serial device opened with [`open_serial`].
#[derive(Debug)]
pub struct Transport<W> {
    writer: W,
    frames_sent: usize,
}

impl<W: AsyncWrite + Unpin> Transport<W> {
    /// Creates a transport on top of a writer.
    pub fn new(writer: W) -> Transport<W> {
        Transport {
            writer,
            frames_sent: 0,
        }
    }

    /// Returns the number of frames written so far.
    pub fn frames_sent(&self) -> usize {
        self.frames_sent
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin> ConfigSink for Transport<W> {
    async fn send(&mut self, opcode: u8, data: u32) -> Result<()> {
        let frame = encode_frame(opcode, data);
        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        self.frames_sent += 1;
        tracing::debug!(opcode, data, "sent frame {:02x?}", frame);
        Ok(())
    }
}

/// Sink that records commands instead of sending them.
///
/// This is used for dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorder {
    frames: Vec<mawg_json::Frame>,
}

impl Recorder {
    /// Creates an empty recorder.
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// Returns the recorded frames.
    pub fn frames(&self) -> &[mawg_json::Frame] {
        &self.frames
    }
}

impl ConfigSink for Recorder {
    async fn send(&mut self, opcode: u8, data: u32) -> Result<()> {
        self.frames.push(mawg_json::Frame { opcode, data });
        Ok(())
    }
}

/// Opens a serial device for configuring the MAWG.
///
/// The device is put in raw 8N1 mode at the given baud rate. Arbitrary baud
/// rates are supported, since the default rate of 62500 baud is not one of
/// the standard rates.
pub async fn open_serial(path: &Path, baud: u32) -> Result<Transport<fs::File>> {
    let file = fs::OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)
        .await
        .with_context(|| format!("failed to open serial port {}", path.display()))?;
    configure_tty(file.as_raw_fd(), baud)
        .with_context(|| format!("failed to configure serial port {}", path.display()))?;
    tracing::info!("opened serial port {} at {} baud", path.display(), baud);
    Ok(Transport::new(file))
}

fn configure_tty(fd: RawFd, baud: u32) -> Result<()> {
    // SAFETY: termios2 is a plain C struct for which all zeros is valid
    let mut tio: libc::termios2 = unsafe { std::mem::zeroed() };
    unsafe { ioctl::tcgets2(fd, &mut tio) }.context("device is not a terminal")?;
    tio.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    tio.c_oflag &= !libc::OPOST;
    tio.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    tio.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB | libc::CBAUD);
    tio.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD | libc::BOTHER;
    tio.c_ispeed = baud;
    tio.c_ospeed = baud;
    unsafe { ioctl::tcsets2(fd, &tio) }?;
    Ok(())
}

mod ioctl {
    use nix::{ioctl_read_bad, ioctl_write_ptr_bad};

    ioctl_read_bad!(tcgets2, libc::TCGETS2, libc::termios2);
    ioctl_write_ptr_bad!(tcsets2, libc::TCSETS2, libc::termios2);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn frame() {
        assert_eq!(encode_frame(0xf, 0), [0x0f, 0, 0, 0, 0]);
        assert_eq!(
            encode_frame(Opcode::ChirpMax.into(), 0x1234_5678),
            [0x06, 0x12, 0x34, 0x56, 0x78]
        );
        assert_eq!(
            encode_frame(0xff, u32::MAX),
            [0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[tokio::test]
    async fn transport() {
        let mut transport = Transport::new(Vec::new());
        transport.send(Opcode::Frequency.into(), 42950).await.unwrap();
        transport.send(Opcode::Wave.into(), 0).await.unwrap();
        assert_eq!(transport.frames_sent(), 2);
        assert_eq!(
            transport.into_inner(),
            vec![0x02, 0x00, 0x00, 0xa7, 0xc6, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[tokio::test]
    async fn recorder() {
        let mut recorder = Recorder::new();
        recorder.send(0xc, 0x1d).await.unwrap();
        assert_eq!(
            recorder.frames(),
            &[mawg_json::Frame {
                opcode: 0xc,
                data: 0x1d
            }]
        );
    }

    #[tokio::test]
    async fn open_regular_file_fails() {
        let path = std::env::temp_dir().join(format!("mawg-serial-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();
        assert!(open_serial(&path, BAUD_RATE).await.is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
