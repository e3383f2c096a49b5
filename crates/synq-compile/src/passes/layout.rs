//! The Layout Planner: picks an initial logical-to-physical qubit mapping.
//!
//! A strategy-selectable planner offering `Trivial`, `Dense`, and
//! `Calibration`-weighted placement, all following the same "check the
//! coupling map exists, build a `Layout`, mark the DAG physical" shape.

use rustc_hash::FxHashMap;

use synq_device::Calibration;
use synq_ir::dag::CircuitDag;
use synq_ir::gate::{GateKind, StandardGate};
use synq_ir::QubitId;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Scales the decoherence contribution in the calibration-weighted strategy
/// so it lands in roughly the same range as a typical two-qubit gate error
/// (a few times `1e-2`) for microsecond-scale `T1`/`T2`.
const DECOHERENCE_ALPHA: f64 = 0.05;

/// Which placement heuristic the Layout Planner should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutStrategy {
    /// `L(i) = i`. Fails if the circuit has more logical qubits than the
    /// device has physical qubits.
    #[default]
    Trivial,
    /// Greedy placement by the logical interaction graph's weighted degree,
    /// ignoring calibration. Falls back to `Trivial` if it cannot complete.
    Dense,
    /// Like `Dense`, but the placement cost also penalizes high readout
    /// error and short `T1`/`T2` on the candidate physical qubit.
    Calibration,
}

/// Canonical ordering for an unordered logical-qubit pair, used as an
/// interaction-graph key.
fn edge_key(a: QubitId, b: QubitId) -> (QubitId, QubitId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

/// Weighted logical interaction graph: an edge between `i, j` with weight
/// equal to the number of two-qubit gates touching both.
fn interaction_graph(dag: &CircuitDag) -> FxHashMap<(QubitId, QubitId), u32> {
    let mut graph = FxHashMap::default();
    for (_, inst) in dag.topological_ops() {
        if inst.qubits.len() == 2 {
            *graph.entry(edge_key(inst.qubits[0], inst.qubits[1])).or_insert(0) += 1;
        }
    }
    graph
}

fn weighted_degrees(
    qubits: impl Iterator<Item = QubitId>,
    graph: &FxHashMap<(QubitId, QubitId), u32>,
) -> FxHashMap<QubitId, u32> {
    let mut degrees: FxHashMap<QubitId, u32> = qubits.map(|q| (q, 0)).collect();
    for (&(a, b), &weight) in graph {
        *degrees.entry(a).or_insert(0) += weight;
        *degrees.entry(b).or_insert(0) += weight;
    }
    degrees
}

/// `log(1 - gate_error)` for the best-known two-qubit gate calibration
/// between two physical qubits, or `0.0` (perfect) when nothing is known.
fn edge_quality(calibration: Option<&Calibration>, p: u32, q: u32) -> f64 {
    const CANDIDATE_KINDS: [&str; 3] = ["cx", "cz", "swap"];
    let gate_error = calibration
        .and_then(|cal| {
            CANDIDATE_KINDS.iter().find_map(|kind| {
                cal.gate_error_raw(kind, &[p, q])
                    .or_else(|| cal.gate_error_raw(kind, &[q, p]))
                    .filter(|&e| e < 1.0)
            })
        })
        .unwrap_or(0.0);
    (1.0 - gate_error).max(f64::EPSILON).ln()
}

/// `readout_error(p) + α/T1(p) + α/T2(p)`, the extra placement cost the
/// `Calibration` strategy subtracts.
fn decoherence_penalty(calibration: &Calibration, p: u32) -> f64 {
    let readout = calibration.readout_error(p).unwrap_or(0.0);
    let t1_term = calibration.t1(p).map_or(0.0, |t1| DECOHERENCE_ALPHA / t1);
    let t2_term = calibration.t2(p).map_or(0.0, |t2| DECOHERENCE_ALPHA / t2);
    readout + t1_term + t2_term
}

/// Picks an initial `Layout`.
#[derive(Debug)]
pub struct LayoutPlanner {
    strategy: LayoutStrategy,
}

impl LayoutPlanner {
    /// Create a planner using the given strategy.
    pub fn new(strategy: LayoutStrategy) -> Self {
        Self { strategy }
    }

    /// Shorthand for `LayoutPlanner::new(LayoutStrategy::Trivial)`.
    pub fn trivial() -> Self {
        Self::new(LayoutStrategy::Trivial)
    }

    /// Shorthand for `LayoutPlanner::new(LayoutStrategy::Dense)`.
    pub fn dense() -> Self {
        Self::new(LayoutStrategy::Dense)
    }

    /// Shorthand for `LayoutPlanner::new(LayoutStrategy::Calibration)`.
    pub fn calibration_weighted() -> Self {
        Self::new(LayoutStrategy::Calibration)
    }

    fn plan_trivial(dag: &CircuitDag, num_physical: u32) -> CompileResult<Layout> {
        let num_logical = dag.num_qubits() as u32;
        if num_logical > num_physical {
            return Err(CompileError::NoFeasibleLayout);
        }
        Ok(Layout::trivial(num_logical))
    }

    fn plan_greedy(
        dag: &CircuitDag,
        properties: &PropertySet,
        weight_calibration: bool,
    ) -> Option<Layout> {
        let coupling_map = properties.coupling_map.as_ref()?;
        let calibration = properties.calibration.as_ref();
        let num_physical = coupling_map.num_qubits();

        let graph = interaction_graph(dag);
        let degrees = weighted_degrees(dag.qubits(), &graph);
        if degrees.len() as u32 > num_physical {
            return None;
        }

        let mut order: Vec<QubitId> = degrees.keys().copied().collect();
        order.sort_by(|a, b| {
            degrees[b].cmp(&degrees[a]).then(a.0.cmp(&b.0))
        });
        let Some(&seed) = order.first() else {
            return Some(Layout::new());
        };

        let seed_physical = (0..num_physical)
            .max_by_key(|&p| {
                let conn = coupling_map.neighbors(p).count();
                (conn, std::cmp::Reverse(p))
            })
            .unwrap_or(0);

        let mut layout = Layout::new();
        layout.add(seed, seed_physical);
        let mut used_physical: std::collections::HashSet<u32> = [seed_physical].into_iter().collect();

        for &logical in &order[1..] {
            let mut candidates: Vec<u32> = used_physical
                .iter()
                .flat_map(|&placed| coupling_map.neighbors(placed))
                .filter(|p| !used_physical.contains(p))
                .collect();
            candidates.sort_unstable();
            candidates.dedup();

            if candidates.is_empty() {
                candidates = (0..num_physical).filter(|p| !used_physical.contains(p)).collect();
            }
            let best = candidates.into_iter().max_by(|&p1, &p2| {
                let score = |p: u32| -> f64 {
                    let mut s: f64 = graph
                        .iter()
                        .filter_map(|(&(a, b), _)| {
                            let other = if a == logical {
                                Some(b)
                            } else if b == logical {
                                Some(a)
                            } else {
                                None
                            };
                            other.and_then(|other| layout.get_physical(other))
                        })
                        .map(|placed_p| edge_quality(calibration, p, placed_p))
                        .sum();
                    if weight_calibration {
                        if let Some(cal) = calibration {
                            s -= decoherence_penalty(cal, p);
                        }
                    }
                    s
                };
                score(p1)
                    .partial_cmp(&score(p2))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(p2.cmp(&p1))
            })?;

            layout.add(logical, best);
            used_physical.insert(best);
        }

        Some(layout)
    }

    fn plan(&self, dag: &CircuitDag, properties: &PropertySet) -> CompileResult<Layout> {
        let num_physical = properties
            .coupling_map
            .as_ref()
            .map(synq_device::CouplingMap::num_qubits)
            .ok_or(CompileError::MissingCouplingMap("LayoutPlanner"))?;

        match self.strategy {
            LayoutStrategy::Trivial => Self::plan_trivial(dag, num_physical),
            LayoutStrategy::Dense => Ok(Self::plan_greedy(dag, properties, false)
                .unwrap_or(Self::plan_trivial(dag, num_physical)?)),
            LayoutStrategy::Calibration => Self::plan_greedy(dag, properties, true)
                .map_or_else(|| Self::plan_trivial(dag, num_physical), Ok),
        }
    }
}

impl Pass for LayoutPlanner {
    fn name(&self) -> &'static str {
        "LayoutPlanner"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let layout = self.plan(dag, properties)?;
        properties.layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none()
    }
}

/// Whether a gate kind is a two-qubit entangling gate (used by the
/// interaction graph and, indirectly, the Router's front layer).
pub(crate) fn is_two_qubit_entangler(kind: &GateKind) -> bool {
    matches!(
        kind,
        GateKind::Standard(StandardGate::CX | StandardGate::CZ | StandardGate::Swap)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use synq_device::CouplingMap;
    use synq_ir::{Circuit, Instruction};

    fn linear_circuit(n: u32) -> Circuit {
        let mut circuit = Circuit::with_size("t", n, 0);
        for i in 0..n - 1 {
            circuit
                .dag_mut()
                .apply(Instruction::two_qubit_gate(
                    StandardGate::CX,
                    QubitId(i),
                    QubitId(i + 1),
                ))
                .unwrap();
        }
        circuit
    }

    #[test]
    fn test_trivial_layout_succeeds_when_it_fits() {
        let circuit = linear_circuit(3);
        let mut props = PropertySet::new().with_target(CouplingMap::linear(5), synq_device::BasisGates::universal());
        let planner = LayoutPlanner::trivial();
        planner.run(&mut circuit.into_dag(), &mut props).unwrap();
        assert_eq!(props.layout.unwrap().len(), 3);
    }

    #[test]
    fn test_trivial_layout_fails_when_too_large() {
        let circuit = linear_circuit(6);
        let mut props = PropertySet::new().with_target(CouplingMap::linear(3), synq_device::BasisGates::universal());
        let planner = LayoutPlanner::trivial();
        let err = planner.run(&mut circuit.into_dag(), &mut props).unwrap_err();
        assert!(matches!(err, CompileError::NoFeasibleLayout));
    }

    #[test]
    fn test_dense_layout_places_every_logical_qubit() {
        let circuit = linear_circuit(4);
        let mut props = PropertySet::new().with_target(CouplingMap::linear(4), synq_device::BasisGates::universal());
        let planner = LayoutPlanner::dense();
        planner.run(&mut circuit.into_dag(), &mut props).unwrap();
        assert_eq!(props.layout.unwrap().len(), 4);
    }

    #[test]
    fn test_missing_coupling_map_errors() {
        let circuit = linear_circuit(2);
        let mut props = PropertySet::new();
        let planner = LayoutPlanner::trivial();
        let err = planner.run(&mut circuit.into_dag(), &mut props).unwrap_err();
        assert!(matches!(err, CompileError::MissingCouplingMap(_)));
    }
}
