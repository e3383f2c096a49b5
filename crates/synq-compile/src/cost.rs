//! The Cost Estimator: turns a routed circuit plus device calibration into
//! fidelity and execution-time metrics.
//!
//! Built on the `Option`-per-field, "missing means unknown, never zero"
//! discipline of `synq_device::Calibration`. All products are accumulated
//! in log-space and exponentiated back at the end to avoid underflow on
//! large circuits.

use rustc_hash::FxHashMap;

use synq_device::Calibration;
use synq_ir::dag::{CircuitDag, NodeIndex};
use synq_ir::instruction::{Instruction, InstructionKind};

/// Per-qubit detail the estimator reports alongside the aggregate metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QubitMetrics {
    /// Total time, in the calibration's duration unit, this qubit spends
    /// under an operation.
    pub active_time: f64,
    /// Combined T1/T2 decoherence error accrued over `active_time`.
    pub decoherence_error: f64,
    /// Readout error, if this qubit was measured.
    pub readout_error: Option<f64>,
}

/// Fidelity and timing metrics for a routed circuit on a calibrated device.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Product of per-gate fidelities, `Π (1 - gate_error(g))`.
    pub gate_fidelity: f64,
    /// Sum of per-gate errors — diverges from `1 - gate_fidelity` on large
    /// circuits and is reported separately for that reason.
    pub gate_error_sum: f64,
    /// Product of per-qubit decoherence fidelities.
    pub decoherence_fidelity: f64,
    /// Arithmetic mean decoherence error over qubits with nonzero active time.
    pub average_decoherence_error: f64,
    /// Product of per-qubit readout fidelities over measured qubits.
    pub readout_fidelity: f64,
    /// Sum of readout error over measured qubits.
    pub readout_error_sum: f64,
    /// Arithmetic mean readout error over measured qubits.
    pub average_readout_error: f64,
    /// `gate_fidelity * readout_fidelity * decoherence_fidelity`.
    pub total_fidelity: f64,
    /// `1 - total_fidelity`.
    pub effective_error: f64,
    /// Longest-path duration through the DAG's data dependencies.
    pub execution_time: f64,
    /// Per-physical-qubit detail.
    pub per_qubit: FxHashMap<u32, QubitMetrics>,
}

/// Estimates circuit cost against a device's calibration data.
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    /// Gate error assumed for a gate with no calibration entry, or whose
    /// calibrated error is `1.0` (obsolete). Defaults to `0.0` — a gate with
    /// unknown error is treated as perfect, so missing calibration never
    /// silently penalizes a circuit.
    fallback_gate_error: f64,
}

impl CostEstimator {
    /// Create an estimator with the default fallback gate error of `0.0`.
    pub fn new() -> Self {
        Self {
            fallback_gate_error: 0.0,
        }
    }

    /// Override the fallback gate error used when calibration is missing.
    #[must_use]
    pub fn with_fallback_gate_error(mut self, error: f64) -> Self {
        self.fallback_gate_error = error;
        self
    }

    fn qubits_of(inst: &Instruction) -> Vec<u32> {
        inst.qubits.iter().map(|q| q.0).collect()
    }

    fn gate_name(inst: &Instruction) -> Option<&str> {
        match &inst.kind {
            InstructionKind::Gate(_) => Some(inst.name()),
            _ => None,
        }
    }

    fn duration_of(&self, calibration: &Calibration, inst: &Instruction) -> f64 {
        calibration
            .gate_duration(inst.name(), &Self::qubits_of(inst))
            .unwrap_or(0.0)
    }

    fn gate_error_of(&self, calibration: &Calibration, inst: &Instruction) -> Option<f64> {
        let name = Self::gate_name(inst)?;
        let err = calibration
            .gate_error_raw(name, &Self::qubits_of(inst))
            .filter(|&e| e < 1.0)
            .unwrap_or(self.fallback_gate_error);
        Some(err)
    }

    /// Estimate fidelity and timing metrics for `routed` under `calibration`.
    pub fn estimate(&self, routed: &CircuitDag, calibration: &Calibration) -> Metrics {
        let mut gate_error_sum = 0.0f64;
        let mut gate_log_fidelity = 0.0f64;

        let mut active_time: FxHashMap<u32, f64> = FxHashMap::default();
        let mut readout_error: FxHashMap<u32, f64> = FxHashMap::default();
        let mut durations: FxHashMap<NodeIndex, f64> = FxHashMap::default();

        for (node, inst) in routed.topological_ops() {
            let duration = self.duration_of(calibration, inst);
            durations.insert(node, duration);

            for &qubit in &inst.qubits {
                *active_time.entry(qubit.0).or_insert(0.0) += duration;
            }

            if let Some(err) = self.gate_error_of(calibration, inst) {
                gate_error_sum += err;
                gate_log_fidelity += (1.0 - err).max(f64::EPSILON).ln();
            }

            if matches!(inst.kind, InstructionKind::Measure) {
                if let Some(&qubit) = inst.qubits.first() {
                    let err = calibration.readout_error(qubit.0).unwrap_or(0.0);
                    readout_error.insert(qubit.0, err);
                }
            }
        }

        let mut decoherence_log_fidelity = 0.0f64;
        let mut decoherence_sum = 0.0f64;
        let mut active_qubit_count = 0usize;
        let mut per_qubit: FxHashMap<u32, QubitMetrics> = FxHashMap::default();

        for (&qubit, &t_p) in &active_time {
            let t1 = calibration.t1(qubit);
            let t2 = calibration.t2(qubit);
            let rate = t1.map_or(0.0, |t1| 1.0 / t1) + t2.map_or(0.0, |t2| 1.0 / t2);
            let e_dec = if rate > 0.0 {
                1.0 - (-t_p * rate).exp()
            } else {
                0.0
            };
            if t_p > 0.0 {
                decoherence_sum += e_dec;
                active_qubit_count += 1;
            }
            decoherence_log_fidelity += (1.0 - e_dec).max(f64::EPSILON).ln();

            per_qubit.insert(
                qubit,
                QubitMetrics {
                    active_time: t_p,
                    decoherence_error: e_dec,
                    readout_error: readout_error.get(&qubit).copied(),
                },
            );
        }
        for (&qubit, &err) in &readout_error {
            per_qubit.entry(qubit).or_default().readout_error = Some(err);
        }

        let readout_error_sum: f64 = readout_error.values().sum();
        let readout_log_fidelity: f64 = readout_error
            .values()
            .map(|&e| (1.0 - e).max(f64::EPSILON).ln())
            .sum();
        let average_readout_error = if readout_error.is_empty() {
            0.0
        } else {
            readout_error_sum / readout_error.len() as f64
        };
        let average_decoherence_error = if active_qubit_count == 0 {
            0.0
        } else {
            decoherence_sum / active_qubit_count as f64
        };

        let gate_fidelity = gate_log_fidelity.exp();
        let decoherence_fidelity = decoherence_log_fidelity.exp();
        let readout_fidelity = readout_log_fidelity.exp();
        let total_fidelity = gate_fidelity * readout_fidelity * decoherence_fidelity;

        let execution_time = critical_path_duration(routed, &durations);

        Metrics {
            gate_fidelity,
            gate_error_sum,
            decoherence_fidelity,
            average_decoherence_error,
            readout_fidelity,
            readout_error_sum,
            average_readout_error,
            total_fidelity,
            effective_error: 1.0 - total_fidelity,
            execution_time,
            per_qubit,
        }
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest-path sum of per-op durations through the DAG's data dependencies
/// — the circuit's execution time, not the sum of every op's duration.
fn critical_path_duration(dag: &CircuitDag, durations: &FxHashMap<NodeIndex, f64>) -> f64 {
    let mut finish: FxHashMap<NodeIndex, f64> = FxHashMap::default();
    let mut longest = 0.0f64;
    for node in dag.topological_order() {
        let start = dag
            .predecessors(node)
            .iter()
            .map(|p| finish.get(p).copied().unwrap_or(0.0))
            .fold(0.0, f64::max);
        let end = start + durations.get(&node).copied().unwrap_or(0.0);
        finish.insert(node, end);
        longest = longest.max(end);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use synq_device::calibration::{GateCalibKey, GateCalibration, QubitCalibration};
    use synq_ir::gate::StandardGate;
    use synq_ir::{Circuit, Instruction, QubitId};

    fn calibrated_device() -> Calibration {
        let mut cal = Calibration::new();
        cal.set_qubit(
            0,
            QubitCalibration {
                t1: Some(100.0),
                t2: Some(80.0),
                frequency: None,
                readout_error: Some(0.01),
            },
        );
        cal.set_qubit(
            1,
            QubitCalibration {
                t1: Some(90.0),
                t2: Some(70.0),
                frequency: None,
                readout_error: Some(0.02),
            },
        );
        cal.set_gate(
            GateCalibKey::new("cx", [0, 1]),
            GateCalibration {
                gate_error: Some(0.01),
                duration: Some(0.3),
                parameters: None,
            },
        );
        cal
    }

    #[test]
    fn test_perfect_circuit_has_total_fidelity_one() {
        let circuit = Circuit::with_size("t", 2, 0);
        let dag = circuit.into_dag();
        let cal = Calibration::new();
        let metrics = CostEstimator::new().estimate(&dag, &cal);
        assert!((metrics.total_fidelity - 1.0).abs() < 1e-9);
        assert_eq!(metrics.execution_time, 0.0);
    }

    #[test]
    fn test_calibrated_cx_reduces_fidelity() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit
            .dag_mut()
            .apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
            .unwrap();
        let dag = circuit.into_dag();
        let metrics = CostEstimator::new().estimate(&dag, &calibrated_device());

        assert!(metrics.gate_fidelity < 1.0);
        assert!((metrics.gate_error_sum - 0.01).abs() < 1e-9);
        assert!(metrics.execution_time > 0.0);
        assert!(metrics.total_fidelity < 1.0);
    }

    #[test]
    fn test_measurement_contributes_readout_error() {
        let mut circuit = Circuit::with_size("t", 1, 1);
        circuit
            .dag_mut()
            .apply(Instruction::measure(QubitId(0), synq_ir::ClbitId(0)))
            .unwrap();
        let dag = circuit.into_dag();
        let metrics = CostEstimator::new().estimate(&dag, &calibrated_device());

        assert!((metrics.readout_error_sum - 0.01).abs() < 1e-9);
        assert!(metrics.readout_fidelity < 1.0);
    }
}
