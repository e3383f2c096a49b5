//! Synq device topology and calibration model.
//!
//! Describes a target quantum device independently of the compiler that
//! transpiles onto it: connectivity, native gate set, and calibration data.
//! Kept as its own crate so both `synq-compile` and `synq-cli` can share one
//! device description without either depending on the other's internals.

pub mod calibration;
pub mod device;
pub mod error;
pub mod topology;

pub use calibration::{Calibration, GateCalibKey, GateCalibration, QubitCalibration};
pub use device::DeviceTopology;
pub use error::{DeviceError, DeviceResult};
pub use topology::{BasisGates, CouplingMap};
