//! Error types for the device model crate.

use thiserror::Error;

/// Errors that can occur while building or querying a device topology.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeviceError {
    /// A coupling-map edge referenced a qubit index outside `n_q_phys`.
    #[error("coupling map edge ({0}, {1}) references a qubit outside the device's {2} qubits")]
    QubitOutOfRange(u32, u32, u32),

    /// `shortest_path`/`coupled` was asked about an unreachable pair.
    #[error("qubits {0} and {1} are not connected in the coupling graph")]
    Disconnected(u32, u32),

    /// A basis gate name has no corresponding entry in the gate library.
    #[error("basis gate '{0}' is not a recognized gate kind")]
    UnknownBasisGate(String),

    /// A calibration value violated a physical-plausibility constraint
    /// (e.g. `T1 <= 0`, or a probability outside `[0, 1]`).
    #[error("invalid calibration value: {0}")]
    InvalidCalibration(String),
}

/// Result type for device-model operations.
pub type DeviceResult<T> = Result<T, DeviceError>;
