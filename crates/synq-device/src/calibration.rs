//! Per-qubit and per-gate calibration data.
//!
//! Richer per-(gate, physical-qubit-tuple) granularity than a flat
//! per-gate-name error map, matching how hardware calibration reports
//! actually come in, while keeping the discipline that every field the
//! vendor can omit is an `Option`, never silently treated as zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DeviceError, DeviceResult};

/// Per-qubit calibration: relaxation/dephasing times, frequency, readout error.
///
/// Every field is optional — a missing value means "unknown", never "zero".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QubitCalibration {
    /// T1 relaxation time, in microseconds.
    #[serde(default)]
    pub t1: Option<f64>,
    /// T2 dephasing time, in microseconds.
    #[serde(default)]
    pub t2: Option<f64>,
    /// Qubit frequency, in GHz.
    #[serde(default)]
    pub frequency: Option<f64>,
    /// Readout misclassification probability.
    #[serde(default)]
    pub readout_error: Option<f64>,
}

impl QubitCalibration {
    fn validate(&self) -> DeviceResult<()> {
        if let Some(t1) = self.t1 {
            if !(t1 > 0.0) {
                return Err(DeviceError::InvalidCalibration(format!(
                    "t1 must be > 0, got {t1}"
                )));
            }
        }
        if let Some(t2) = self.t2 {
            if !(t2 > 0.0) {
                return Err(DeviceError::InvalidCalibration(format!(
                    "t2 must be > 0, got {t2}"
                )));
            }
        }
        if let Some(ro) = self.readout_error {
            if !(0.0..=1.0).contains(&ro) {
                return Err(DeviceError::InvalidCalibration(format!(
                    "readout_error must be in [0,1], got {ro}"
                )));
            }
        }
        Ok(())
    }
}

/// Calibration for one gate kind applied to one specific tuple of physical
/// qubits (e.g. `("cx", [0, 1])`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateCalibration {
    /// Probability the gate's implemented unitary differs from its ideal
    /// one. `1.0` means "not operational" and is excluded from fidelity
    /// products (see [`GateCalibration::is_usable`]).
    #[serde(default)]
    pub gate_error: Option<f64>,
    /// Gate duration, in nanoseconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Calibrated pulse parameters, opaque to the cost model.
    #[serde(default)]
    pub parameters: Option<Vec<f64>>,
}

impl GateCalibration {
    /// Whether this calibration entry represents a usable gate: present and
    /// not reporting `gate_error == 1.0` (obsolete/disabled).
    pub fn is_usable(&self) -> bool {
        self.gate_error.is_some_and(|e| e < 1.0)
    }

    fn validate(&self) -> DeviceResult<()> {
        if let Some(e) = self.gate_error {
            if !(0.0..=1.0).contains(&e) {
                return Err(DeviceError::InvalidCalibration(format!(
                    "gate_error must be in [0,1], got {e}"
                )));
            }
        }
        if let Some(d) = self.duration {
            if d < 0.0 {
                return Err(DeviceError::InvalidCalibration(format!(
                    "duration must be >= 0, got {d}"
                )));
            }
        }
        Ok(())
    }
}

/// Key identifying a gate calibration entry: the gate's name (e.g. `"cx"`)
/// and the physical qubit tuple it was calibrated on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateCalibKey {
    /// Lowercase gate name, matching `GateKind::name()` in `synq-ir`.
    pub kind: String,
    /// Physical qubits the calibration applies to, in operand order.
    pub qubits: Vec<u32>,
}

impl GateCalibKey {
    /// Create a new calibration key.
    pub fn new(kind: impl Into<String>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            kind: kind.into(),
            qubits: qubits.into_iter().collect(),
        }
    }
}

/// Calibration data for a device: per-qubit and per-gate measurements.
///
/// Snapshotted at the start of a transpilation request: the pipeline clones
/// this value rather than re-reading a live source, so mid-request hardware
/// updates are never observed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Calibration {
    /// Per-physical-qubit calibration.
    #[serde(default)]
    pub qubits: BTreeMap<u32, QubitCalibration>,
    /// Per-(gate, qubit-tuple) calibration.
    #[serde(default)]
    pub gates: BTreeMap<GateCalibKey, GateCalibration>,
}

impl Calibration {
    /// Create an empty calibration (everything reported "unknown").
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every present value against its physical-plausibility bounds.
    pub fn validate(&self) -> DeviceResult<()> {
        for q in self.qubits.values() {
            q.validate()?;
        }
        for g in self.gates.values() {
            g.validate()?;
        }
        Ok(())
    }

    /// Set the calibration for a physical qubit.
    pub fn set_qubit(&mut self, qubit: u32, calib: QubitCalibration) {
        self.qubits.insert(qubit, calib);
    }

    /// Set the calibration for a gate applied to a specific qubit tuple.
    pub fn set_gate(&mut self, key: GateCalibKey, calib: GateCalibration) {
        self.gates.insert(key, calib);
    }

    /// T1 of a physical qubit, if known.
    pub fn t1(&self, qubit: u32) -> Option<f64> {
        self.qubits.get(&qubit).and_then(|q| q.t1)
    }

    /// T2 of a physical qubit, if known.
    pub fn t2(&self, qubit: u32) -> Option<f64> {
        self.qubits.get(&qubit).and_then(|q| q.t2)
    }

    /// Readout error of a physical qubit, if known.
    pub fn readout_error(&self, qubit: u32) -> Option<f64> {
        self.qubits.get(&qubit).and_then(|q| q.readout_error)
    }

    /// Raw gate-error reading for a gate on a qubit tuple (may be `1.0`).
    pub fn gate_error_raw(&self, kind: &str, qubits: &[u32]) -> Option<f64> {
        self.gates
            .get(&GateCalibKey::new(kind, qubits.iter().copied()))
            .and_then(|g| g.gate_error)
    }

    /// Duration of a gate on a qubit tuple, if known.
    pub fn gate_duration(&self, kind: &str, qubits: &[u32]) -> Option<f64> {
        self.gates
            .get(&GateCalibKey::new(kind, qubits.iter().copied()))
            .and_then(|g| g.duration)
    }

    /// Whether the calibration entry for a gate on a qubit tuple is usable:
    /// present and not `gate_error == 1.0`.
    pub fn is_gate_usable(&self, kind: &str, qubits: &[u32]) -> bool {
        self.gates
            .get(&GateCalibKey::new(kind, qubits.iter().copied()))
            .is_some_and(GateCalibration::is_usable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_calibration() {
        let cal = Calibration::new();
        assert_eq!(cal.t1(0), None);
        assert!(!cal.is_gate_usable("cx", &[0, 1]));
    }

    #[test]
    fn test_gate_calibration_roundtrip() {
        let mut cal = Calibration::new();
        cal.set_gate(
            GateCalibKey::new("cx", [0, 1]),
            GateCalibration {
                gate_error: Some(0.01),
                duration: Some(300.0),
                parameters: None,
            },
        );

        assert_eq!(cal.gate_error_raw("cx", &[0, 1]), Some(0.01));
        assert_eq!(cal.gate_duration("cx", &[0, 1]), Some(300.0));
        assert!(cal.is_gate_usable("cx", &[0, 1]));
    }

    #[test]
    fn test_obsolete_gate_not_usable() {
        let mut cal = Calibration::new();
        cal.set_gate(
            GateCalibKey::new("cx", [0, 1]),
            GateCalibration {
                gate_error: Some(1.0),
                duration: Some(300.0),
                parameters: None,
            },
        );

        assert!(!cal.is_gate_usable("cx", &[0, 1]));
        assert_eq!(cal.gate_error_raw("cx", &[0, 1]), Some(1.0));
    }

    #[test]
    fn test_validate_rejects_bad_t1() {
        let mut cal = Calibration::new();
        cal.set_qubit(
            0,
            QubitCalibration {
                t1: Some(-5.0),
                ..Default::default()
            },
        );
        assert!(cal.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_partial_data() {
        let mut cal = Calibration::new();
        cal.set_qubit(
            0,
            QubitCalibration {
                t1: Some(50.0),
                t2: None,
                frequency: None,
                readout_error: Some(0.02),
            },
        );
        assert!(cal.validate().is_ok());
    }
}
