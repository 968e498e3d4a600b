//! # TiltStick
//!
//! Turn an IMU strapped to your foot into a virtual analog stick.
//!
//! Reads orientation telemetry lines from a serial port, maps tilt relative
//! to a calibrated neutral pose onto two stick axes, and drives a virtual
//! gamepad via uinput.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

mod config;
mod error;
mod gamepad;
mod mapping;
mod serial;
mod session;
mod telemetry;

use config::Config;
use gamepad::{StickSink, VirtualGamepad};
use mapping::MappedAxes;
use serial::TelemetrySerial;
use session::Session;

/// Number of accepted samples between status log messages
const LOG_INTERVAL_SAMPLES: u64 = 250;

/// Main entry point for TiltStick
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load and validate configuration (path from argv\[1\], defaults otherwise)
///    - Open the sensor serial port and create the virtual gamepad
///      (both fatal on failure, before the loop starts)
///
/// 2. **Session Loop** (one logical thread of control)
///    - Read one telemetry line, bounded by the configured timeout
///    - Parse it, update live orientation, run the calibration state machine
///    - While streaming, forward the mapped axes to the gamepad, skipping
///      the commit when the pair is unchanged
///    - React to the operator calibration trigger (Enter on stdin)
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop within one read-timeout of the signal
///    - Serial port and uinput device are released on drop on every exit path
///
/// # Errors
///
/// Returns error if the configuration is invalid, the serial port cannot be
/// opened, or the virtual gamepad cannot be created. Read errors and
/// malformed lines during the loop are absorbed and logged.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("TiltStick v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        None => {
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    let mut sensor = TelemetrySerial::open(&config.serial)?;
    info!("Reading telemetry from {}", sensor.device_path());

    let mut gamepad = VirtualGamepad::create(&config.gamepad.device_name)?;

    let mut session = Session::new(config.mapping.mode, config.mapping.max_angle_deg);
    let mut calibrate_rx = spawn_calibration_trigger();

    info!(
        "Session started ({:?} mode, {}° full deflection)",
        config.mapping.mode, config.mapping.max_angle_deg
    );
    if config.mapping.mode.auto_baseline() {
        info!("Hold your neutral pose; the first sample sets the baseline");
    } else {
        info!("Press Enter to capture the neutral pose; press again to re-zero");
    }
    info!("Press Ctrl+C to exit");

    let mut last_sent: Option<MappedAxes> = None;
    let mut last_log_count: u64 = 0;

    // Session loop
    loop {
        tokio::select! {
            // One read-parse-map-emit cycle; read is bounded by the timeout
            line = sensor.read_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => continue, // timeout, no data this cycle
                    Err(e) => {
                        warn!("Sensor read failed: {}", e);
                        continue;
                    }
                };

                if let Some(axes) = session.handle_line(&line) {
                    // Skip the commit when nothing changed
                    if last_sent != Some(axes) {
                        if let Err(e) = gamepad.set_stick(axes) {
                            warn!("Gamepad update failed: {}", e);
                            continue;
                        }
                        last_sent = Some(axes);
                    }
                }

                let accepted = session.samples_accepted();
                if accepted - last_log_count >= LOG_INTERVAL_SAMPLES {
                    info!("{}", session.snapshot().status_line());
                    last_log_count = accepted;
                }
            }

            // Operator calibration trigger
            Some(()) = calibrate_rx.recv() => {
                match session.calibrate() {
                    Ok(baseline) => {
                        // Center the stick immediately on re-zero
                        let axes = MappedAxes::default();
                        if last_sent != Some(axes) {
                            if let Err(e) = gamepad.set_stick(axes) {
                                warn!("Gamepad update failed: {}", e);
                            } else {
                                last_sent = Some(axes);
                            }
                        }
                        info!("Calibrated: {}", baseline.describe());
                    }
                    Err(e) => warn!("{}", e),
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Final state: {}", session.snapshot().status_line());
                break;
            }
        }
    }

    Ok(())
}

/// Spawns the stdin watcher that turns each Enter keypress into a
/// calibration trigger. Detached; it ends with the process.
fn spawn_calibration_trigger() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });

    rx
}
