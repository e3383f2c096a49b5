//! The complete description of a target device.

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::error::{DeviceError, DeviceResult};
use crate::topology::{BasisGates, CouplingMap};

/// A target device: its physical qubit count, connectivity, native gate set,
/// an optional structural hint for the Layout Planner, and calibration data.
///
/// Immutable once constructed; a transpilation request clones it rather than
/// reading through to a live source, so the whole pipeline sees one
/// consistent snapshot even if the underlying hardware is recalibrated
/// mid-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTopology {
    /// Number of physical qubits.
    pub n_q_phys: u32,
    /// Undirected connectivity graph between physical qubits.
    pub coupling_map: CouplingMap,
    /// Native gate set this device can execute without translation.
    pub basis_gates: BasisGates,
    /// Optional structural tag consumed by the Layout Planner, e.g.
    /// `"heavy-hex"`. Unrecognized tags are ignored, not rejected.
    #[serde(default)]
    pub layout_hint: Option<String>,
    /// Per-qubit and per-gate calibration measurements.
    #[serde(default)]
    pub calibration: Calibration,
}

impl DeviceTopology {
    /// Construct a device topology from its required fields, with no layout
    /// hint and empty calibration.
    pub fn new(n_q_phys: u32, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        Self {
            n_q_phys,
            coupling_map,
            basis_gates,
            layout_hint: None,
            calibration: Calibration::new(),
        }
    }

    /// Attach a structural layout hint.
    #[must_use]
    pub fn with_layout_hint(mut self, hint: impl Into<String>) -> Self {
        self.layout_hint = Some(hint.into());
        self
    }

    /// Attach calibration data.
    #[must_use]
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Validate internal consistency: coupling-map edges reference only
    /// qubits within `n_q_phys`, and calibration values are physically
    /// plausible.
    pub fn validate(&self) -> DeviceResult<()> {
        for &(a, b) in self.coupling_map.edges() {
            if a >= self.n_q_phys || b >= self.n_q_phys {
                return Err(DeviceError::QubitOutOfRange(a, b, self.n_q_phys));
            }
        }
        self.calibration.validate()
    }

    /// Whether the coupling map has the room to place a circuit with this
    /// many logical qubits under a trivial identity layout.
    pub fn can_host(&self, num_logical_qubits: u32) -> bool {
        num_logical_qubits <= self.n_q_phys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_topology_valid() {
        let device = DeviceTopology::new(5, CouplingMap::linear(5), BasisGates::ibm());
        assert!(device.validate().is_ok());
        assert!(device.can_host(5));
        assert!(!device.can_host(6));
    }

    #[test]
    fn test_device_topology_rejects_out_of_range_edge() {
        let mut coupling_map = CouplingMap::new(3);
        coupling_map.add_edge(0, 1);
        coupling_map.add_edge(1, 5);
        let device = DeviceTopology::new(3, coupling_map, BasisGates::ibm());
        assert!(matches!(
            device.validate(),
            Err(DeviceError::QubitOutOfRange(1, 5, 3))
        ));
    }

    #[test]
    fn test_device_topology_with_layout_hint() {
        let device = DeviceTopology::new(5, CouplingMap::linear(5), BasisGates::ibm())
            .with_layout_hint("heavy-hex");
        assert_eq!(device.layout_hint.as_deref(), Some("heavy-hex"));
    }
}
