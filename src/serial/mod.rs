//! # Serial Transport Module
//!
//! Line-oriented serial access to the IMU.
//!
//! This module handles:
//! - Opening the serial port at the configured baud rate (8N1)
//! - Buffered async line reads bounded by a small fixed timeout
//! - Distinguishing "no data this cycle" from real read failures
//!
//! The bounded-timeout read is what keeps the session loop responsive to the
//! calibration trigger and to shutdown without extra threads: a cycle with no
//! data returns `Ok(None)` and the loop proceeds as a no-op. Failed reads
//! also cost one full timeout period, so a dead port (unplugged sensor)
//! cannot spin the loop.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TiltStickError};

/// Serial connection to the orientation sensor.
///
/// Wraps the port in a [`BufReader`] so partially received lines survive
/// across read timeouts. The port is released on drop on every exit path.
///
/// Generic over the inner byte stream; production code uses the
/// [`tokio_serial::SerialStream`] default via [`TelemetrySerial::open`],
/// tests substitute an in-memory duplex.
pub struct TelemetrySerial<R: AsyncRead + Unpin = tokio_serial::SerialStream> {
    reader: BufReader<R>,
    /// Bytes of a line still being received; survives read timeouts.
    pending: Vec<u8>,
    device_path: String,
    read_timeout: Duration,
}

impl<R: AsyncRead + Unpin> std::fmt::Debug for TelemetrySerial<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySerial")
            .field("device_path", &self.device_path)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl TelemetrySerial {
    /// Opens the configured serial port with 8N1 framing.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated serial configuration (port, baud rate, timeout)
    ///
    /// # Errors
    ///
    /// [`TiltStickError::SerialPortNotFound`] if the port cannot be opened.
    /// This is fatal at startup; the loop is never entered without a port.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!(
            "Opening serial port {} at {} baud",
            config.port, config.baud_rate
        );

        let port = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                TiltStickError::SerialPortNotFound(format!("{}: {}", config.port, e))
            })?;

        info!("Opened sensor port {} at {} baud", config.port, config.baud_rate);

        Ok(Self::from_stream(
            port,
            config.port.clone(),
            Duration::from_millis(config.timeout_ms),
        ))
    }
}

impl<R: AsyncRead + Unpin> TelemetrySerial<R> {
    /// Wraps an already-open byte stream. [`TelemetrySerial::open`] is the
    /// production path; tests feed an in-memory stream here.
    fn from_stream(stream: R, device_path: String, read_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(stream),
            pending: Vec::new(),
            device_path,
            read_timeout,
        }
    }

    /// Reads one telemetry line, waiting at most the configured timeout.
    ///
    /// Bytes received before a timeout are kept and completed by a later
    /// call; a line is never torn by the timeout. Invalid UTF-8 is replaced
    /// rather than rejected (the parser will drop the line if the damage
    /// touches a field).
    ///
    /// # Returns
    ///
    /// * `Ok(Some(line))` - A complete line arrived (trailing newline included)
    /// * `Ok(None)` - Timeout with no complete line; the cycle is a no-op
    ///
    /// # Errors
    ///
    /// [`TiltStickError::Serial`] on I/O failure or when the port reports
    /// end-of-stream (device unplugged). Recoverable at the loop: it is
    /// logged and the loop keeps polling. A failing port reports instantly,
    /// so the error paths sleep out the timeout period before returning;
    /// every call costs at most one period, error or not. Incomplete bytes
    /// are discarded with the error.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let read = self.reader.read_until(b'\n', &mut self.pending);

        match tokio::time::timeout(self.read_timeout, read).await {
            // Partial bytes stay in self.pending for the next cycle
            Err(_elapsed) => Ok(None),
            Ok(Ok(0)) => {
                self.pending.clear();
                tokio::time::sleep(self.read_timeout).await;
                Err(TiltStickError::Serial(format!(
                    "{}: end of stream (device disconnected?)",
                    self.device_path
                )))
            }
            Ok(Ok(_)) => {
                let line = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                Ok(Some(line))
            }
            Ok(Err(e)) => {
                self.pending.clear();
                tokio::time::sleep(self.read_timeout).await;
                Err(TiltStickError::Serial(format!(
                    "{}: read failed: {}",
                    self.device_path, e
                )))
            }
        }
    }

    /// Device path of the opened port (e.g. "/dev/ttyUSB0").
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
