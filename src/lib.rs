//! # TiltStick Library
//!
//! Turn an IMU strapped to a foot (or any body part) into a virtual analog stick.
//!
//! This library provides the core functionality for reading orientation
//! telemetry over serial, calibrating a neutral pose, and mapping tilt away
//! from that pose onto a virtual gamepad's stick axes.

pub mod config;
pub mod error;
pub mod gamepad;
pub mod mapping;
pub mod serial;
pub mod session;
pub mod telemetry;
