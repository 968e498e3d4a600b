//! # Session Module
//!
//! The state machine tying sensor arrival to stick output.
//!
//! ## Phases
//!
//! ```text
//! AwaitingFirstSample ──valid sample──▶ AwaitingBaseline ──calibrate──▶ Streaming
//!          │                                                               ▲
//!          └──────valid sample (heading-pitch mode, auto baseline)─────────┘
//! ```
//!
//! - **AwaitingFirstSample**: nothing received yet. The first valid sample
//!   either auto-captures the baseline (heading-pitch mode) or parks the
//!   session waiting for the operator trigger (roll-pitch mode).
//! - **AwaitingBaseline**: live orientation updates on every valid sample,
//!   but no axes are produced until the operator calibrates.
//! - **Streaming**: every valid sample recomputes the mapped axes for
//!   forwarding. Recalibration re-zeros the neutral pose in place.
//!
//! The session itself is synchronous and single-writer; the async loop in
//! `main` drives it one line at a time and owns the collaborators.

use tracing::{debug, info};

use crate::error::{Result, TiltStickError};
use crate::mapping::{Baseline, MappedAxes, MappingMode};
use crate::telemetry::{parse_orientation_line, OrientationSample};

/// Where the session is in its calibration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No valid sample received yet.
    AwaitingFirstSample,
    /// Live orientation known, neutral pose not yet captured.
    AwaitingBaseline,
    /// Baseline set; every sample produces mapped axes.
    Streaming,
}

/// Read-only view of the session for an observation surface.
///
/// Safe to take at any rate; it is a copy, not a handle into live state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current: Option<OrientationSample>,
    pub baseline: Option<Baseline>,
    pub axes: MappedAxes,
    pub samples_accepted: u64,
    pub lines_rejected: u64,
}

impl SessionSnapshot {
    /// Human-readable one-line status for displays and logs.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.phase {
            SessionPhase::AwaitingFirstSample => "waiting for first orientation sample".to_string(),
            SessionPhase::AwaitingBaseline => {
                "orientation live, waiting for calibration trigger".to_string()
            }
            SessionPhase::Streaming => format!(
                "streaming: x={}, y={} ({} samples, {} rejected lines)",
                self.axes.x, self.axes.y, self.samples_accepted, self.lines_rejected
            ),
        }
    }
}

/// Orientation-to-stick session state machine.
///
/// Owns the live sample, the baseline, and the latest mapped axes. One
/// writer (the loop), any number of snapshot readers.
///
/// # Examples
///
/// ```
/// use tiltstick::mapping::MappingMode;
/// use tiltstick::session::Session;
///
/// let mut session = Session::new(MappingMode::RollPitch, 45.0);
///
/// // No output until the operator calibrates
/// assert!(session.handle_line("Orientation: 0.0, 5.0, 0.0").is_none());
/// session.calibrate().unwrap();
///
/// let axes = session.handle_line("Orientation: 0.0, 50.0, 0.0").unwrap();
/// assert_eq!(axes.x, 32767);
/// ```
#[derive(Debug)]
pub struct Session {
    mode: MappingMode,
    limit_deg: f64,
    current: Option<OrientationSample>,
    baseline: Option<Baseline>,
    axes: MappedAxes,
    samples_accepted: u64,
    lines_rejected: u64,
}

impl Session {
    /// Creates a session in `AwaitingFirstSample` with neutral axes.
    ///
    /// # Arguments
    ///
    /// * `mode` - Active mapping mode (see [`MappingMode`])
    /// * `limit_deg` - Full-deflection limit in degrees; validated as
    ///   strictly positive by [`Config::load`](crate::config::Config::load)
    #[must_use]
    pub fn new(mode: MappingMode, limit_deg: f64) -> Self {
        Self {
            mode,
            limit_deg,
            current: None,
            baseline: None,
            axes: MappedAxes::default(),
            samples_accepted: 0,
            lines_rejected: 0,
        }
    }

    /// Current phase of the calibration lifecycle.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.current, &self.baseline) {
            (None, _) => SessionPhase::AwaitingFirstSample,
            (Some(_), None) => SessionPhase::AwaitingBaseline,
            (Some(_), Some(_)) => SessionPhase::Streaming,
        }
    }

    /// Feeds one raw line through parse → state update → mapping.
    ///
    /// Returns the axes to forward to the sink when streaming, `None`
    /// otherwise. Malformed lines are counted and dropped silently. The
    /// auto-captured first sample of heading-pitch mode centers the stick
    /// and produces no output for that cycle.
    pub fn handle_line(&mut self, line: &str) -> Option<MappedAxes> {
        let Some(sample) = parse_orientation_line(line) else {
            if !line.trim().is_empty() {
                self.lines_rejected += 1;
                debug!("Dropped unrecognized line: {:?}", line.trim());
            }
            return None;
        };

        let first_sample = self.current.is_none();
        self.current = Some(sample);
        self.samples_accepted += 1;

        if first_sample && self.baseline.is_none() && self.mode.auto_baseline() {
            let baseline = self.mode.capture_baseline(&sample);
            info!("Baseline set automatically: {}", baseline.describe());
            self.baseline = Some(baseline);
            return None;
        }

        let baseline = self.baseline?;
        self.axes = baseline.map(&sample, self.limit_deg);
        Some(self.axes)
    }

    /// Captures the current sample as the new neutral pose.
    ///
    /// Overwrites any prior baseline; calibrating twice against the same
    /// live sample yields the same baseline. May be invoked any number of
    /// times during a session.
    ///
    /// # Errors
    ///
    /// [`TiltStickError::CalibrationUnavailable`] when no sample has been
    /// received yet; state is unchanged in that case.
    pub fn calibrate(&mut self) -> Result<Baseline> {
        let sample = self
            .current
            .as_ref()
            .ok_or(TiltStickError::CalibrationUnavailable)?;

        let baseline = self.mode.capture_baseline(sample);
        info!("Baseline set: {}", baseline.describe());
        self.baseline = Some(baseline);
        Ok(baseline)
    }

    /// Takes a point-in-time copy of the session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            current: self.current,
            baseline: self.baseline,
            axes: self.axes,
            samples_accepted: self.samples_accepted,
            lines_rejected: self.lines_rejected,
        }
    }

    /// Number of successfully parsed samples.
    #[must_use]
    pub fn samples_accepted(&self) -> u64 {
        self.samples_accepted
    }
}
