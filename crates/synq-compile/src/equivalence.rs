//! Permutation-aware unitary equivalence check between a circuit and its
//! routed counterpart, used as an optional correctness gate in the
//! Transpilation Pipeline.
//!
//! Built on `crate::unitary::Unitary2x2`'s single-qubit matrix algebra (the
//! same gate-to-matrix table `passes::normalize` uses) extended to a dense
//! `2^n x 2^n` operator constructed by embedding each gate into the full
//! Hilbert space. Only practical for the small circuit sizes the pipeline
//! gates this check on.

use num_complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};

use synq_ir::dag::CircuitDag;
use synq_ir::gate::{GateKind, StandardGate};
use synq_ir::instruction::InstructionKind;

use crate::cancel::CancellationToken;
use crate::error::{CompileError, CompileResult};
use crate::passes::normalize::gate_to_unitary;
use crate::property::Layout;
use crate::unitary::Unitary2x2;

/// Tolerance for the final elementwise comparison.
const TOLERANCE: f64 = 1e-6;

/// Above this many active qubits, the dense simulation is too expensive to
/// be worth it as a diagnostic; the check is skipped rather than attempted.
const MAX_ACTIVE_QUBITS: usize = 10;

fn dense_identity(dim: usize) -> Vec<Complex64> {
    let mut matrix = vec![Complex64::new(0.0, 0.0); dim * dim];
    for i in 0..dim {
        matrix[i * dim + i] = Complex64::new(1.0, 0.0);
    }
    matrix
}

/// Left-multiplies `state` by a single-qubit gate embedded at `bit`.
fn apply_single_qubit(state: &mut [Complex64], dim: usize, bit: usize, gate: &Unitary2x2) {
    let mask = 1usize << bit;
    let mut updated = state.to_vec();
    for r in 0..dim {
        if r & mask == 0 {
            let r1 = r | mask;
            for c in 0..dim {
                let a = state[r * dim + c];
                let b = state[r1 * dim + c];
                updated[r * dim + c] = gate.data[0] * a + gate.data[1] * b;
                updated[r1 * dim + c] = gate.data[2] * a + gate.data[3] * b;
            }
        }
    }
    state.copy_from_slice(&updated);
}

/// Left-multiplies `state` by a CX with the given control/target bits.
fn apply_cx(state: &mut [Complex64], dim: usize, control: usize, target: usize) {
    let mut updated = vec![Complex64::new(0.0, 0.0); dim * dim];
    for r in 0..dim {
        let src = if (r >> control) & 1 == 1 { r ^ (1 << target) } else { r };
        updated[r * dim..(r + 1) * dim].copy_from_slice(&state[src * dim..(src + 1) * dim]);
    }
    state.copy_from_slice(&updated);
}

/// Left-multiplies `state` by a CZ on the given bit pair.
fn apply_cz(state: &mut [Complex64], dim: usize, a: usize, b: usize) {
    for r in 0..dim {
        if (r >> a) & 1 == 1 && (r >> b) & 1 == 1 {
            for c in 0..dim {
                state[r * dim + c] = -state[r * dim + c];
            }
        }
    }
}

/// Left-multiplies `state` by a SWAP on the given bit pair.
fn apply_swap(state: &mut [Complex64], dim: usize, a: usize, b: usize) {
    let mut updated = vec![Complex64::new(0.0, 0.0); dim * dim];
    for r in 0..dim {
        let bit_a = (r >> a) & 1;
        let bit_b = (r >> b) & 1;
        let src = if bit_a != bit_b { r ^ (1 << a) ^ (1 << b) } else { r };
        updated[r * dim..(r + 1) * dim].copy_from_slice(&state[src * dim..(src + 1) * dim]);
    }
    state.copy_from_slice(&updated);
}

/// Which qubits (by whatever id space the DAG uses) are touched by any
/// instruction, used both to size the dense operator and to restrict the
/// comparison to the subspace that actually does anything.
fn touched_qubits(dag: &CircuitDag) -> Vec<u32> {
    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    for (_, inst) in dag.topological_ops() {
        for q in &inst.qubits {
            if seen.insert(q.0) {
                order.push(q.0);
            }
        }
    }
    order.sort_unstable();
    order
}

/// Builds the dense `2^n x 2^n` operator for `dag`, with qubit `id` mapped
/// to bit position `bit_of[id]`.
fn build_dense_unitary(
    dag: &CircuitDag,
    bit_of: &FxHashMap<u32, usize>,
    token: &CancellationToken,
) -> CompileResult<Vec<Complex64>> {
    let dim = 1usize << bit_of.len();
    let mut state = dense_identity(dim);

    for (_, inst) in dag.topological_ops() {
        if token.is_cancelled() {
            return Err(CompileError::Cancelled);
        }
        let InstructionKind::Gate(gate) = &inst.kind else {
            continue; // Measure/Reset/Barrier have no unitary action to compare.
        };
        let GateKind::Standard(sg) = &gate.kind else {
            return Err(CompileError::UnsupportedBasis(gate.name().to_string()));
        };

        match inst.qubits.len() {
            1 => {
                let bit = bit_of[&inst.qubits[0].0];
                let matrix = gate_to_unitary(sg)
                    .ok_or_else(|| CompileError::UnsupportedBasis(sg.name().to_string()))?;
                apply_single_qubit(&mut state, dim, bit, &matrix);
            }
            2 => {
                let b0 = bit_of[&inst.qubits[0].0];
                let b1 = bit_of[&inst.qubits[1].0];
                match sg {
                    StandardGate::CX => apply_cx(&mut state, dim, b0, b1),
                    StandardGate::CZ => apply_cz(&mut state, dim, b0, b1),
                    StandardGate::Swap => apply_swap(&mut state, dim, b0, b1),
                    other => return Err(CompileError::UnsupportedBasis(other.name().to_string())),
                }
            }
            _ => return Err(CompileError::UnsupportedBasis(sg.name().to_string())),
        }
    }
    Ok(state)
}

/// Maps each original bit-pattern to the bit-pattern it becomes under a
/// per-bit relabeling.
fn permutation_of(bit_map: &[usize], dim: usize) -> Vec<usize> {
    (0..dim)
        .map(|idx| {
            let mut out = 0usize;
            for (i, &target_bit) in bit_map.iter().enumerate() {
                if (idx >> i) & 1 == 1 {
                    out |= 1 << target_bit;
                }
            }
            out
        })
        .collect()
}

/// Re-expresses `matrix` (indexed by physical bit order) in logical bit
/// order, reading rows through `row_perm` (the output/final mapping) and
/// columns through `col_perm` (the input/initial mapping).
fn relabel(matrix: &[Complex64], dim: usize, row_perm: &[usize], col_perm: &[usize]) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
    for r in 0..dim {
        for c in 0..dim {
            out[r * dim + c] = matrix[row_perm[r] * dim + col_perm[c]];
        }
    }
    out
}

fn equal_up_to_global_phase(expected: &[Complex64], got: &[Complex64]) -> bool {
    let Some(phase) = expected
        .iter()
        .zip(got.iter())
        .find(|(e, _)| e.norm() > TOLERANCE)
        .map(|(&e, &g)| g / e)
    else {
        return got.iter().all(|v| v.norm() < TOLERANCE);
    };
    if (phase.norm() - 1.0).abs() > TOLERANCE {
        return false;
    }
    expected
        .iter()
        .zip(got.iter())
        .all(|(&e, &g)| (g - phase * e).norm() < TOLERANCE)
}

/// Checks that `routed`, viewed through `initial_layout` on input and
/// `final_layout` on output, implements the same unitary as `original` up
/// to global phase. Silently returns `Ok(())` when the circuit is too large
/// to simulate densely (gated by the caller at `n_q <= 10`, but the routed
/// footprint — including any relay qubits SWAPs passed through — is
/// re-checked here against [`MAX_ACTIVE_QUBITS`]) or when the logical and
/// physical footprints don't line up 1:1.
pub fn check(
    original: &CircuitDag,
    routed: &CircuitDag,
    initial_layout: &Layout,
    final_layout: &Layout,
    token: &CancellationToken,
) -> CompileResult<()> {
    let logical_qubits = touched_qubits(original);
    let physical_qubits = touched_qubits(routed);

    if logical_qubits.len() != physical_qubits.len() {
        return Ok(()); // footprints don't align 1:1; inconclusive, not a failure.
    }
    if logical_qubits.len() > MAX_ACTIVE_QUBITS {
        return Ok(());
    }

    let logical_bit_of: FxHashMap<u32, usize> =
        logical_qubits.iter().enumerate().map(|(i, &q)| (q, i)).collect();
    let physical_bit_of: FxHashMap<u32, usize> =
        physical_qubits.iter().enumerate().map(|(i, &p)| (p, i)).collect();

    let dim = 1usize << logical_qubits.len();

    let u_original = build_dense_unitary(original, &logical_bit_of, token)?;
    if token.is_cancelled() {
        return Err(CompileError::Cancelled);
    }
    let u_routed = build_dense_unitary(routed, &physical_bit_of, token)?;

    let bit_map_out: Vec<usize> = logical_qubits
        .iter()
        .map(|&l| {
            let p = final_layout.get_physical(synq_ir::QubitId(l)).unwrap_or(l);
            physical_bit_of.get(&p).copied().unwrap_or(0)
        })
        .collect();
    let bit_map_in: Vec<usize> = logical_qubits
        .iter()
        .map(|&l| {
            let p = initial_layout.get_physical(synq_ir::QubitId(l)).unwrap_or(l);
            physical_bit_of.get(&p).copied().unwrap_or(0)
        })
        .collect();

    let row_perm = permutation_of(&bit_map_out, dim);
    let col_perm = permutation_of(&bit_map_in, dim);
    let u_view = relabel(&u_routed, dim, &row_perm, &col_perm);

    if equal_up_to_global_phase(&u_original, &u_view) {
        Ok(())
    } else {
        Err(CompileError::RoutingUnitaryMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synq_ir::gate::StandardGate;
    use synq_ir::{Circuit, Instruction, QubitId};

    #[test]
    fn test_bell_circuit_matches_itself() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.dag_mut().apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0))).unwrap();
        circuit.dag_mut().apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1))).unwrap();
        let dag = circuit.into_dag();

        let layout = Layout::trivial(2);
        let token = CancellationToken::new();
        check(&dag, &dag, &layout, &layout, &token).unwrap();
    }

    #[test]
    fn test_swap_permuted_circuit_is_equivalent() {
        let mut original = Circuit::with_size("t", 2, 0);
        original.dag_mut().apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0))).unwrap();
        let original_dag = original.into_dag();

        // Routed circuit: apply X on physical qubit 1 instead, with a
        // layout that maps logical 0 to physical 1 on both ends.
        let mut routed = Circuit::with_size("t", 2, 0);
        routed.dag_mut().apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1))).unwrap();
        let routed_dag = routed.into_dag();

        let mut layout = Layout::new();
        layout.add(QubitId(0), 1);
        layout.add(QubitId(1), 0);

        let token = CancellationToken::new();
        check(&original_dag, &routed_dag, &layout, &layout, &token).unwrap();
    }

    #[test]
    fn test_mismatched_circuit_is_rejected() {
        let mut original = Circuit::with_size("t", 1, 0);
        original.dag_mut().apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0))).unwrap();
        let original_dag = original.into_dag();

        let mut routed = Circuit::with_size("t", 1, 0);
        routed.dag_mut().apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0))).unwrap();
        let routed_dag = routed.into_dag();

        let layout = Layout::trivial(1);
        let token = CancellationToken::new();
        let err = check(&original_dag, &routed_dag, &layout, &layout, &token).unwrap_err();
        assert!(matches!(err, CompileError::RoutingUnitaryMismatch));
    }
}
