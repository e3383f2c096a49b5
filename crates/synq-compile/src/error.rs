//! Error types for the transpilation framework.

use synq_device::DeviceError;
use synq_ir::error::IrError;
use thiserror::Error;

/// Errors that can occur during transpilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A gate name in the input circuit is not recognized.
    #[error("unknown gate '{0}'")]
    UnknownGate(String),

    /// A gate was applied to the wrong number of qubits.
    #[error("gate '{gate_name}' requires {expected} qubits, got {got}")]
    InvalidArity {
        /// Name of the gate.
        gate_name: String,
        /// Expected qubit count.
        expected: u32,
        /// Qubit count actually supplied.
        got: u32,
    },

    /// A gate was given the wrong number of parameters.
    #[error("gate '{gate_name}' expects {expected} parameters, got {got}")]
    InvalidParamCount {
        /// Name of the gate.
        gate_name: String,
        /// Expected parameter count.
        expected: usize,
        /// Parameter count actually supplied.
        got: usize,
    },

    /// A gate cannot be expressed in the fixed decomposition basis.
    #[error("gate '{0}' has no known decomposition into the supported basis")]
    UnsupportedBasis(String),

    /// A pass that requires a coupling map ran without one set.
    #[error("pass '{0}' requires a coupling map, but none was set in the property set")]
    MissingCouplingMap(&'static str),

    /// A pass that requires a layout ran without one set.
    #[error("pass '{0}' requires a layout, but none was set in the property set")]
    MissingLayout(&'static str),

    /// A pass that requires a basis gate set ran without one set.
    #[error("pass '{0}' requires basis gates, but none were set in the property set")]
    MissingBasisGates(&'static str),

    /// The circuit has more logical qubits than the device has physical qubits.
    #[error("circuit requires {required} qubits but the device only has {available}")]
    CircuitTooLarge {
        /// Logical qubits the circuit needs.
        required: u32,
        /// Physical qubits the device offers.
        available: u32,
    },

    /// The Layout Planner could not find a feasible initial layout.
    #[error("no feasible layout exists for this circuit on this device")]
    NoFeasibleLayout,

    /// The Router needs to connect two qubits that live in different
    /// connected components of the coupling graph.
    #[error("qubits {qubit1} and {qubit2} are not reachable: device is disconnected")]
    DisconnectedDevice {
        /// First physical qubit.
        qubit1: u32,
        /// Second physical qubit.
        qubit2: u32,
    },

    /// The Router could not find a path to route a two-qubit operation.
    #[error("could not find a route between physical qubits {qubit1} and {qubit2}")]
    RoutingFailed {
        /// First physical qubit.
        qubit1: u32,
        /// Second physical qubit.
        qubit2: u32,
    },

    /// The post-routing equivalence check found a mismatch between the
    /// original and routed circuit's composed unitary. Indicates an internal
    /// defect in the Normalizer, Layout Planner, or Router, never a property
    /// of the input.
    #[error(
        "routed circuit's unitary does not match the original under the known layout permutation"
    )]
    RoutingUnitaryMismatch,

    /// A transpilation request was cancelled before it completed.
    #[error("transpilation was cancelled")]
    Cancelled,

    /// An error from the underlying circuit IR.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// An error from the device model.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result type for compilation and transpilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
