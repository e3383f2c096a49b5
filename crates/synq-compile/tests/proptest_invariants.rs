//! Property-based tests for the transpiler's universally-quantified
//! invariants, generating small random circuits over the gate library.

use proptest::prelude::*;

use synq_compile::passes::{LayoutPlanner, LayoutStrategy, Normalizer, Router, RoutingStrategy};
use synq_compile::pipeline::{transpile, PipelineOptions};
use synq_compile::property::PropertySet;
use synq_compile::{CancellationToken, Pass};
use synq_device::{BasisGates, CouplingMap, DeviceTopology};
use synq_ir::gate::GateKind;
use synq_ir::{Circuit, QubitId};

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Y(u32),
    Z(u32),
    Rx(u32, f64),
    Cx(u32, u32),
    Cz(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            GateOp::H(q) => circuit.h(QubitId(q)).map(|_| ()),
            GateOp::X(q) => circuit.x(QubitId(q)).map(|_| ()),
            GateOp::Y(q) => circuit.y(QubitId(q)).map(|_| ()),
            GateOp::Z(q) => circuit.z(QubitId(q)).map(|_| ()),
            GateOp::Rx(q, theta) => circuit.rx(theta, QubitId(q)).map(|_| ()),
            GateOp::Cx(c, t) => circuit.cx(QubitId(c), QubitId(t)).map(|_| ()),
            GateOp::Cz(c, t) => circuit.cz(QubitId(c), QubitId(t)).map(|_| ()),
        };
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    if num_qubits < 2 {
        prop_oneof![
            (0..num_qubits).prop_map(GateOp::H),
            (0..num_qubits).prop_map(GateOp::X),
            (0..num_qubits).prop_map(GateOp::Y),
            (0..num_qubits).prop_map(GateOp::Z),
            (0..num_qubits, -3.2_f64..3.2).prop_map(|(q, t)| GateOp::Rx(q, t)),
        ]
        .boxed()
    } else {
        prop_oneof![
            (0..num_qubits).prop_map(GateOp::H),
            (0..num_qubits).prop_map(GateOp::X),
            (0..num_qubits).prop_map(GateOp::Y),
            (0..num_qubits).prop_map(GateOp::Z),
            (0..num_qubits, -3.2_f64..3.2).prop_map(|(q, t)| GateOp::Rx(q, t)),
            (0..num_qubits, 0..num_qubits)
                .prop_filter("control and target must differ", |(c, t)| c != t)
                .prop_map(|(c, t)| GateOp::Cx(c, t)),
            (0..num_qubits, 0..num_qubits)
                .prop_filter("control and target must differ", |(c, t)| c != t)
                .prop_map(|(c, t)| GateOp::Cz(c, t)),
        ]
        .boxed()
    }
}

/// A random circuit with `n_q <= 6`, small enough for dense unitary checks.
fn arb_small_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=6).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 0..=12).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", num_qubits, 0);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

fn linear_device(n: u32) -> DeviceTopology {
    DeviceTopology::new(n, CouplingMap::linear(n), BasisGates::universal())
}

/// A circuit touching every one of `n` qubits, used to pin down the exact
/// active-qubit count exercised by the `MAX_ACTIVE_QUBITS` boundary tests
/// below — `arb_small_circuit`'s random op selection can't guarantee every
/// qubit actually gets used.
fn full_width_circuit(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("boundary", n, 0);
    for q in 0..n {
        circuit.h(QubitId(q)).unwrap();
    }
    for q in 0..n.saturating_sub(1) {
        circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
    }
    circuit
}

/// The dense-unitary equivalence check runs at exactly `n_q == 10` active
/// qubits, the edge of `MAX_ACTIVE_QUBITS`.
#[test]
fn equivalence_check_runs_at_ten_active_qubits() {
    let device = linear_device(10);
    let circuit = full_width_circuit(10);
    let result = transpile(&circuit, &device, PipelineOptions::new(), &CancellationToken::new())
        .expect("equivalence-preserving transpilation must not fail at the n_q = 10 boundary");
    assert!(result.cost.total_fidelity > 0.0 && result.cost.total_fidelity <= 1.0);
}

/// One qubit past the boundary, the dense check is skipped entirely rather
/// than attempted and failing or timing out; transpilation must still
/// succeed.
#[test]
fn equivalence_check_skipped_above_ten_active_qubits() {
    let device = linear_device(11);
    let circuit = full_width_circuit(11);
    let result = transpile(&circuit, &device, PipelineOptions::new(), &CancellationToken::new())
        .expect("transpilation must not fail once the dense check is skipped above n_q = 10");
    assert!(result.cost.total_fidelity > 0.0 && result.cost.total_fidelity <= 1.0);
}

proptest! {
    /// Routing legality: every two-qubit op the Router produces operates on
    /// a pair the device's coupling map actually connects.
    #[test]
    fn routing_legality(circuit in arb_small_circuit()) {
        let n = circuit.num_qubits() as u32;
        let device = linear_device(n.max(1));
        if let Ok(result) = transpile(&circuit, &device, PipelineOptions::new(), &CancellationToken::new()) {
            for (_, inst) in result.routed.circuit.dag().topological_ops() {
                if inst.qubits.len() == 2 {
                    prop_assert!(device.coupling_map.coupled(inst.qubits[0].0, inst.qubits[1].0));
                }
            }
        }
    }

    /// Basis containment: every op the Normalizer produces is a member of
    /// the requested basis. Targets `iqm()` rather than `universal()` so the
    /// test can actually fail if the Normalizer ignores `basis_gates` and
    /// falls back to some hardcoded default — `universal()` recognizes
    /// nearly every gate name the generator can produce, so it would pass
    /// even if basis threading were completely broken.
    #[test]
    fn basis_containment(circuit in arb_small_circuit()) {
        let basis = BasisGates::iqm();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new().with_target(CouplingMap::full(6), basis.clone());
        Normalizer::new().run(&mut dag, &mut props).unwrap();

        for (_, inst) in dag.topological_ops() {
            if let synq_ir::InstructionKind::Gate(gate) = &inst.kind {
                if let GateKind::Standard(_) = &gate.kind {
                    prop_assert!(basis.contains(gate.name()));
                }
            }
        }
    }

    /// Normalization idempotence: running the Normalizer twice is the same
    /// as running it once.
    #[test]
    fn normalization_idempotence(circuit in arb_small_circuit()) {
        let basis = BasisGates::universal();
        let mut dag_once = circuit.clone().into_dag();
        let mut props = PropertySet::new().with_target(CouplingMap::full(6), basis.clone());
        Normalizer::new().run(&mut dag_once, &mut props).unwrap();

        let mut dag_twice = dag_once.clone();
        Normalizer::new().run(&mut dag_twice, &mut props).unwrap();

        let once: Vec<String> = dag_once.topological_ops().map(|(_, i)| format!("{i:?}")).collect();
        let twice: Vec<String> = dag_twice.topological_ops().map(|(_, i)| format!("{i:?}")).collect();
        prop_assert_eq!(once, twice);
    }

    /// Router determinism: fixed inputs and strategy produce the same op
    /// sequence on repeated calls.
    #[test]
    fn router_determinism(circuit in arb_small_circuit()) {
        let n = circuit.num_qubits() as u32;
        let device = linear_device(n.max(1));

        let mut props = PropertySet::new().with_target(device.coupling_map.clone(), BasisGates::universal());
        props.layout = Some(synq_compile::Layout::trivial(n.max(1)));

        let mut dag_a = circuit.clone().into_dag();
        Router::new(RoutingStrategy::Naive).run(&mut dag_a, &mut props).unwrap();

        let mut dag_b = circuit.into_dag();
        Router::new(RoutingStrategy::Naive).run(&mut dag_b, &mut props).unwrap();

        let a: Vec<String> = dag_a.topological_ops().map(|(_, i)| format!("{i:?}")).collect();
        let b: Vec<String> = dag_b.topological_ops().map(|(_, i)| format!("{i:?}")).collect();
        prop_assert_eq!(a, b);
    }

    /// Layout totality: every logical qubit touched by the circuit is in
    /// the domain of the returned layout.
    #[test]
    fn layout_totality(circuit in arb_small_circuit()) {
        let n = circuit.num_qubits() as u32;
        let device = linear_device(n);

        let mut dag = circuit.clone().into_dag();
        let mut props = PropertySet::new().with_target(device.coupling_map.clone(), BasisGates::universal());
        LayoutPlanner::new(LayoutStrategy::Trivial).run(&mut dag, &mut props).unwrap();

        let layout = props.layout.expect("layout pass must populate a layout");
        for (_, inst) in dag.topological_ops() {
            for q in &inst.qubits {
                prop_assert!(layout.get_physical(*q).is_some());
            }
        }
    }

    /// Numeric safety and semantics preservation: the routing-preserving
    /// equivalence check, on by default, must succeed for every generated
    /// circuit, and reported fidelities stay inside (0, 1]. `arb_small_circuit`
    /// only ever reaches 6 active qubits, well under the `MAX_ACTIVE_QUBITS`
    /// dense-check threshold of 10; `equivalence_check_runs_at_ten_active_qubits`
    /// and `equivalence_check_skipped_above_ten_active_qubits` above exercise
    /// that boundary directly.
    #[test]
    fn numeric_safety_and_semantics_preserved(circuit in arb_small_circuit()) {
        let n = circuit.num_qubits() as u32;
        let device = linear_device(n.max(1));
        let result = transpile(&circuit, &device, PipelineOptions::new(), &CancellationToken::new());

        let result = result.expect("equivalence-preserving transpilation must not fail");
        prop_assert!(result.cost.total_fidelity > 0.0 && result.cost.total_fidelity <= 1.0);
        prop_assert!(result.cost.effective_error >= 0.0 && result.cost.effective_error < 1.0);
    }
}
