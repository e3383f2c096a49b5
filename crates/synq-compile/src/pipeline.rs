//! The Transpilation Pipeline: glues the Normalizer, Layout Planner, Router
//! and Cost Estimator into a single `transpile` call and returns a
//! `TranspilationResult`.
//!
//! Grounded on `manager::PassManagerBuilder::build`'s assembly shape for the
//! pass sequencing; the structural-metrics recomputation and optional
//! equivalence check are new, composing `cost::CostEstimator` and
//! `equivalence::check`.

use rustc_hash::FxHashSet;
use tracing::instrument;

use synq_device::DeviceTopology;
use synq_ir::dag::CircuitDag;
use synq_ir::instruction::InstructionKind;
use synq_ir::Circuit;

use crate::cancel::CancellationToken;
use crate::cost::{CostEstimator, Metrics};
use crate::equivalence;
use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{LayoutPlanner, LayoutStrategy, Normalizer, Router, RoutingStrategy};
use crate::property::{Layout, PropertySet};

/// A non-fatal finding attached to a `TranspilationResult`. Never aborts a
/// run; purely informational.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A gate in the routed circuit has no usable calibration entry — either
    /// the entry is absent or reports `gate_error == 1.0` (obsolete).
    CalibrationIncomplete { kind: String, qubits: Vec<u32> },
}

/// Depth/gate-count metrics recomputed before and after transpilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralMetrics {
    pub original_depth: usize,
    pub transpiled_depth: usize,
    pub original_gate_count: usize,
    pub transpiled_gate_count: usize,
    pub original_two_qubit_count: usize,
    pub transpiled_two_qubit_count: usize,
    pub swap_count: usize,
}

/// A circuit over physical qubits, together with the layout it ended up
/// under — which may differ from the initial layout after SWAP insertion.
#[derive(Clone)]
pub struct RoutedCircuit {
    pub circuit: Circuit,
    pub final_layout: Layout,
}

/// Everything a transpilation call produces.
#[derive(Clone)]
pub struct TranspilationResult {
    pub routed: RoutedCircuit,
    pub initial_layout: Layout,
    pub structural: StructuralMetrics,
    pub cost: Metrics,
    pub warnings: Vec<Warning>,
}

/// Configuration for a single `transpile` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub layout_strategy: LayoutStrategy,
    pub routing_strategy: RoutingStrategy,
    /// Run the permutation-aware equivalence check. Defaults to on,
    /// matching the "on by default in testing" posture; callers running in
    /// production disable it explicitly to skip the extra CPU-bound pass.
    /// `equivalence::check` itself skips the dense simulation above
    /// `n_q <= 10` active qubits regardless of this flag, since the check
    /// stops being affordable well before it stops being requested.
    pub check_equivalence: bool,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self {
            layout_strategy: LayoutStrategy::default(),
            routing_strategy: RoutingStrategy::default(),
            check_equivalence: true,
        }
    }

    #[must_use]
    pub fn with_layout_strategy(mut self, strategy: LayoutStrategy) -> Self {
        self.layout_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_routing_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.routing_strategy = strategy;
        self
    }

    #[must_use]
    pub fn without_equivalence_check(mut self) -> Self {
        self.check_equivalence = false;
        self
    }
}

fn two_qubit_count(dag: &CircuitDag) -> usize {
    dag.topological_ops().filter(|(_, inst)| inst.qubits.len() == 2).count()
}

fn calibration_warnings(dag: &CircuitDag, device: &DeviceTopology) -> Vec<Warning> {
    let mut seen = FxHashSet::default();
    let mut warnings = Vec::new();
    for (_, inst) in dag.topological_ops() {
        if !matches!(inst.kind, InstructionKind::Gate(_)) {
            continue;
        }
        let qubits: Vec<u32> = inst.qubits.iter().map(|q| q.0).collect();
        let name = inst.name().to_string();
        if !device.calibration.is_gate_usable(&name, &qubits) {
            let key = (name.clone(), qubits.clone());
            if seen.insert(key) {
                warnings.push(Warning::CalibrationIncomplete { kind: name, qubits });
            }
        }
    }
    warnings
}

/// Runs `normalize -> plan layout -> route -> estimate` on `circuit` against
/// `device`, returning the full `TranspilationResult`.
#[instrument(skip(circuit, device, options, token))]
pub fn transpile(
    circuit: &Circuit,
    device: &DeviceTopology,
    options: PipelineOptions,
    token: &CancellationToken,
) -> CompileResult<TranspilationResult> {
    if !device.can_host(circuit.num_qubits() as u32) {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits() as u32,
            available: device.n_q_phys,
        });
    }

    let original_dag = circuit.dag().clone();
    let original_depth = original_dag.depth();
    let original_gate_count = original_dag.num_ops();
    let original_two_qubit_count = two_qubit_count(&original_dag);

    let mut properties = PropertySet::new()
        .with_target(device.coupling_map.clone(), device.basis_gates.clone())
        .with_calibration(device.calibration.clone());

    let mut dag = original_dag.clone();

    Normalizer::new().run(&mut dag, &mut properties)?;
    if token.is_cancelled() {
        return Err(CompileError::Cancelled);
    }

    LayoutPlanner::new(options.layout_strategy).run(&mut dag, &mut properties)?;
    let initial_layout = properties.layout.clone().unwrap_or_default();
    if token.is_cancelled() {
        return Err(CompileError::Cancelled);
    }

    properties.insert(token.clone());
    Router::new(options.routing_strategy).run(&mut dag, &mut properties)?;
    let final_layout = properties.layout.clone().unwrap_or_default();
    if token.is_cancelled() {
        return Err(CompileError::Cancelled);
    }

    if options.check_equivalence {
        equivalence::check(&original_dag, &dag, &initial_layout, &final_layout, token)?;
    }

    let estimator = CostEstimator::new();
    let cost = estimator.estimate(&dag, &device.calibration);

    let swap_count = dag
        .topological_ops()
        .filter(|(_, inst)| inst.name() == "swap")
        .count();

    let structural = StructuralMetrics {
        original_depth,
        transpiled_depth: dag.depth(),
        original_gate_count,
        transpiled_gate_count: dag.num_ops(),
        original_two_qubit_count,
        transpiled_two_qubit_count: two_qubit_count(&dag),
        swap_count,
    };

    let warnings = calibration_warnings(&dag, device);

    let routed = RoutedCircuit {
        circuit: Circuit::from_dag(dag),
        final_layout,
    };

    Ok(TranspilationResult {
        routed,
        initial_layout,
        structural,
        cost,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use synq_device::topology::{BasisGates, CouplingMap};
    use synq_ir::QubitId;

    fn device() -> DeviceTopology {
        DeviceTopology::new(3, CouplingMap::linear(3), BasisGates::universal())
    }

    #[test]
    fn test_transpile_bell_circuit() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let result = transpile(&circuit, &device(), PipelineOptions::new(), &CancellationToken::new()).unwrap();

        assert_eq!(result.structural.original_two_qubit_count, 1);
        for (_, inst) in result.routed.circuit.dag().topological_ops() {
            if inst.qubits.len() == 2 {
                assert!(device().coupling_map.coupled(inst.qubits[0].0, inst.qubits[1].0));
            }
        }
    }

    #[test]
    fn test_oversized_circuit_is_rejected() {
        let circuit = Circuit::with_size("too_big", 10, 0);
        let err = transpile(&circuit, &device(), PipelineOptions::new(), &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, CompileError::CircuitTooLarge { .. }));
    }

    #[test]
    fn test_cancelled_token_aborts_before_routing() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let err = transpile(&circuit, &device(), PipelineOptions::new(), &token).unwrap_err();
        assert!(matches!(err, CompileError::Cancelled));
    }

    #[test]
    fn test_calibration_gap_produces_warning() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let result = transpile(&circuit, &device(), PipelineOptions::new(), &CancellationToken::new()).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::CalibrationIncomplete { kind, .. } if kind == "cx")));
    }
}
