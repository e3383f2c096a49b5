//! The Router: inserts SWAPs so every two-qubit gate lands on a coupled pair.
//!
//! A shared front-layer/ready-set state machine (working mapping, ready set,
//! emitted buffer) rebuilding the DAG as it goes, offering `Naive`, `Basic`,
//! `Lookahead`, and `Sabre` strategies for picking which SWAP to insert when
//! nothing in the ready set can execute.

use rustc_hash::FxHashMap;

use synq_device::{Calibration, CouplingMap};
use synq_ir::dag::{CircuitDag, NodeIndex};
use synq_ir::gate::StandardGate;
use synq_ir::instruction::Instruction;
use synq_ir::CircuitLevel;
use synq_ir::QubitId;

use crate::cancel::CancellationToken;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// How many upcoming pending two-qubit ops the `Lookahead` and `Sabre`
/// strategies consider when scoring a candidate SWAP.
const LOOKAHEAD_WINDOW: usize = 20;

/// Which SWAP-selection heuristic the Router should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingStrategy {
    /// Pick the earliest pending two-qubit op (program order) and insert the
    /// path-step SWAP closest to its control qubit.
    #[default]
    Naive,
    /// Like `Naive`, but drains every currently-coupled ready op before
    /// inserting a SWAP.
    Basic,
    /// Scores each candidate SWAP by how much it reduces total distance
    /// across a window of upcoming pending two-qubit ops.
    Lookahead,
    /// Two-phase SABRE: a lookahead-scored forward pass, then a reverse
    /// pass over the reversed circuit seeded with the forward pass's final
    /// mapping, whose final mapping seeds the real forward emission.
    Sabre,
}

/// Count of SWAP gates the Router inserted, stored in the `PropertySet` so
/// the Cost Estimator and CLI reporting can read it back out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapCount(pub usize);

/// Inserts SWAPs to satisfy device connectivity.
#[derive(Debug)]
pub struct Router {
    strategy: RoutingStrategy,
}

impl Router {
    /// Create a router using the given strategy.
    pub fn new(strategy: RoutingStrategy) -> Self {
        Self { strategy }
    }

    /// Shorthand for `Router::new(RoutingStrategy::Naive)`.
    pub fn naive() -> Self {
        Self::new(RoutingStrategy::Naive)
    }

    /// Shorthand for `Router::new(RoutingStrategy::Basic)`.
    pub fn basic() -> Self {
        Self::new(RoutingStrategy::Basic)
    }

    /// Shorthand for `Router::new(RoutingStrategy::Lookahead)`.
    pub fn lookahead() -> Self {
        Self::new(RoutingStrategy::Lookahead)
    }

    /// Shorthand for `Router::new(RoutingStrategy::Sabre)`.
    pub fn sabre() -> Self {
        Self::new(RoutingStrategy::Sabre)
    }
}

impl Pass for Router {
    fn name(&self) -> &'static str {
        "Router"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let initial_layout = properties
            .layout
            .clone()
            .ok_or(CompileError::MissingLayout("Router"))?;
        let coupling_map = properties
            .coupling_map
            .clone()
            .ok_or(CompileError::MissingCouplingMap("Router"))?;
        let calibration = properties.calibration.clone();
        let token = properties.get::<CancellationToken>().cloned();

        let (routed, final_layout, swaps) = match self.strategy {
            RoutingStrategy::Sabre => {
                let refined_initial = refine_layout_sabre(
                    dag,
                    &coupling_map,
                    calibration.as_ref(),
                    initial_layout,
                    token.as_ref(),
                )?;
                run_forward_pass(dag, &coupling_map, calibration.as_ref(), refined_initial, self.strategy, token.as_ref())?
            }
            _ => run_forward_pass(dag, &coupling_map, calibration.as_ref(), initial_layout, self.strategy, token.as_ref())?,
        };

        *dag = routed;
        properties.layout = Some(final_layout);
        properties.insert(SwapCount(swaps));
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, properties: &PropertySet) -> bool {
        dag.level() == CircuitLevel::Logical && properties.layout.is_some()
    }
}

/// Indegree-tracked readiness: how many direct predecessors of each op node
/// have not yet been emitted.
fn build_indegrees(dag: &CircuitDag) -> FxHashMap<NodeIndex, usize> {
    dag.topological_order()
        .into_iter()
        .map(|n| (n, dag.predecessors(n).len()))
        .collect()
}

fn initial_ready(indegrees: &FxHashMap<NodeIndex, usize>) -> Vec<NodeIndex> {
    let mut ready: Vec<NodeIndex> = indegrees
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&n, _)| n)
        .collect();
    ready.sort_by_key(NodeIndex::index);
    ready
}

fn is_executable(inst: &Instruction, layout: &Layout, coupling_map: &CouplingMap) -> CompileResult<bool> {
    if inst.qubits.len() != 2 {
        return Ok(true);
    }
    let p0 = layout
        .get_physical(inst.qubits[0])
        .ok_or(CompileError::NoFeasibleLayout)?;
    let p1 = layout
        .get_physical(inst.qubits[1])
        .ok_or(CompileError::NoFeasibleLayout)?;
    Ok(coupling_map.coupled(p0, p1))
}

fn translate(inst: &Instruction, layout: &Layout) -> Instruction {
    let qubits = inst
        .qubits
        .iter()
        .map(|&q| QubitId(layout.get_physical(q).expect("layout covers every touched qubit")))
        .collect();
    Instruction {
        kind: inst.kind.clone(),
        qubits,
        clbits: inst.clbits.clone(),
    }
}

/// Emits the earliest ready op only as long as it stays executable under
/// `layout`, stopping the moment the front of `ready` is blocked rather than
/// scanning further for something else that could run. This is the `Naive`
/// strategy's "pick `ready[0]`" rule — it never pre-drains the rest of the
/// ready set the way `drain_ready` does.
fn drain_single_ready(
    source: &CircuitDag,
    out: &mut CircuitDag,
    layout: &Layout,
    coupling_map: &CouplingMap,
    indegrees: &mut FxHashMap<NodeIndex, usize>,
    ready: &mut Vec<NodeIndex>,
    emitted: &mut usize,
) -> CompileResult<()> {
    loop {
        ready.sort_by_key(NodeIndex::index);
        let Some(&node) = ready.first() else {
            return Ok(());
        };
        let inst = source
            .get_instruction(node)
            .expect("ready node has an instruction");
        if !is_executable(inst, layout, coupling_map)? {
            return Ok(());
        }
        out.apply(translate(inst, layout))?;
        *emitted += 1;
        ready.remove(0);
        for succ in source.successors(node) {
            let deg = indegrees.get_mut(&succ).expect("successor tracked");
            *deg -= 1;
            if *deg == 0 {
                ready.push(succ);
            }
        }
    }
}

/// Drains every ready op that's currently executable under `layout`,
/// emitting translated instructions into `out` and widening `ready` with
/// newly-unblocked successors. Runs to a fixpoint. Used by every strategy
/// except `Naive`, which only ever looks at `ready[0]` (see
/// `drain_single_ready`).
fn drain_ready(
    source: &CircuitDag,
    out: &mut CircuitDag,
    layout: &Layout,
    coupling_map: &CouplingMap,
    indegrees: &mut FxHashMap<NodeIndex, usize>,
    ready: &mut Vec<NodeIndex>,
    emitted: &mut usize,
) -> CompileResult<()> {
    loop {
        ready.sort_by_key(NodeIndex::index);
        let mut progressed = false;
        let mut i = 0;
        while i < ready.len() {
            let node = ready[i];
            let inst = source
                .get_instruction(node)
                .expect("ready node has an instruction");
            if is_executable(inst, layout, coupling_map)? {
                out.apply(translate(inst, layout))?;
                *emitted += 1;
                ready.remove(i);
                for succ in source.successors(node) {
                    let deg = indegrees.get_mut(&succ).expect("successor tracked");
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(succ);
                    }
                }
                progressed = true;
            } else {
                i += 1;
            }
        }
        if !progressed {
            return Ok(());
        }
    }
}

/// Current physical distance between the two qubits a pending op touches.
fn op_distance(inst: &Instruction, layout: &Layout, coupling_map: &CouplingMap) -> CompileResult<u32> {
    let p0 = layout
        .get_physical(inst.qubits[0])
        .ok_or(CompileError::NoFeasibleLayout)?;
    let p1 = layout
        .get_physical(inst.qubits[1])
        .ok_or(CompileError::NoFeasibleLayout)?;
    coupling_map
        .distance(p0, p1)
        .ok_or(CompileError::DisconnectedDevice { qubit1: p0, qubit2: p1 })
}

/// `log(1 - gate_error)` for a SWAP on a physical edge, or `0.0` when
/// calibration is unavailable.
fn swap_edge_quality(calibration: Option<&Calibration>, p0: u32, p1: u32) -> f64 {
    let gate_error = calibration
        .and_then(|cal| {
            cal.gate_error_raw("swap", &[p0, p1])
                .or_else(|| cal.gate_error_raw("swap", &[p1, p0]))
                .filter(|&e| e < 1.0)
        })
        .unwrap_or(0.0);
    (1.0 - gate_error).max(f64::EPSILON).ln()
}

/// Candidate SWAPs: every coupling-map edge touching a physical qubit
/// currently holding one of the pending op's endpoints, moving it one step
/// closer along a shortest path toward the other endpoint.
fn candidate_swaps_for(
    inst: &Instruction,
    layout: &Layout,
    coupling_map: &CouplingMap,
) -> CompileResult<Vec<(u32, u32)>> {
    let p0 = layout
        .get_physical(inst.qubits[0])
        .ok_or(CompileError::NoFeasibleLayout)?;
    let p1 = layout
        .get_physical(inst.qubits[1])
        .ok_or(CompileError::NoFeasibleLayout)?;
    let path = coupling_map
        .shortest_path(p0, p1)
        .ok_or(CompileError::DisconnectedDevice { qubit1: p0, qubit2: p1 })?;
    let mut swaps: Vec<(u32, u32)> = Vec::new();
    for window in path.windows(2) {
        let (a, b) = (window[0], window[1]);
        swaps.push(if a <= b { (a, b) } else { (b, a) });
    }
    Ok(swaps)
}

/// Total distance reduction a candidate SWAP gives across a set of pending
/// two-qubit ops, used by `Lookahead` and `Sabre` to score candidates.
fn lookahead_score(
    swap: (u32, u32),
    pending: &[&Instruction],
    layout: &Layout,
    coupling_map: &CouplingMap,
) -> CompileResult<i64> {
    let mut trial = layout.clone();
    trial.swap(swap.0, swap.1);
    let mut total = 0i64;
    for inst in pending.iter().take(LOOKAHEAD_WINDOW) {
        let before = op_distance(inst, layout, coupling_map)? as i64;
        let after = op_distance(inst, &trial, coupling_map)? as i64;
        total += before - after;
    }
    Ok(total)
}

/// Picks the SWAP to insert when nothing in `ready` is currently
/// executable. `ready` at this point holds only blocked two-qubit ops.
fn choose_swap(
    source: &CircuitDag,
    ready: &[NodeIndex],
    layout: &Layout,
    coupling_map: &CouplingMap,
    calibration: Option<&Calibration>,
    strategy: RoutingStrategy,
) -> CompileResult<(u32, u32)> {
    if ready.is_empty() {
        return Err(CompileError::RoutingFailed { qubit1: 0, qubit2: 0 });
    }

    match strategy {
        RoutingStrategy::Naive | RoutingStrategy::Basic => {
            // Same SWAP choice for both: the earliest pending op, nearest
            // path step. They differ in how much of `ready` got drained
            // before this was called (see `drain_single_ready`/`drain_ready`
            // in `run_forward_pass`), not in which SWAP to pick here.
            let node = ready[0];
            let inst = source.get_instruction(node).expect("ready node instruction");
            let candidates = candidate_swaps_for(inst, layout, coupling_map)?;
            candidates
                .into_iter()
                .next()
                .ok_or(CompileError::RoutingFailed {
                    qubit1: inst.qubits[0].0,
                    qubit2: inst.qubits.get(1).map_or(0, |q| q.0),
                })
        }
        RoutingStrategy::Lookahead | RoutingStrategy::Sabre => {
            let pending_insts: Vec<&Instruction> = ready
                .iter()
                .filter_map(|&n| source.get_instruction(n))
                .collect();
            let mut candidates: Vec<(u32, u32)> = Vec::new();
            for inst in &pending_insts {
                candidates.extend(candidate_swaps_for(inst, layout, coupling_map)?);
            }
            candidates.sort_unstable();
            candidates.dedup();
            let best = candidates
                .into_iter()
                .map(|swap| {
                    let score = lookahead_score(swap, &pending_insts, layout, coupling_map)?;
                    Ok::<_, CompileError>((score, swap_edge_quality(calibration, swap.0, swap.1), swap))
                })
                .collect::<CompileResult<Vec<_>>>()?
                .into_iter()
                .max_by(|a, b| {
                    a.0.cmp(&b.0)
                        .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                        .then(b.2.cmp(&a.2))
                })
                .map(|(_, _, swap)| swap);
            best.ok_or(CompileError::RoutingFailed { qubit1: 0, qubit2: 0 })
        }
    }
}

fn emit_swap(out: &mut CircuitDag, layout: &mut Layout, p0: u32, p1: u32) -> CompileResult<()> {
    out.apply(Instruction::two_qubit_gate(
        StandardGate::Swap,
        QubitId(p0),
        QubitId(p1),
    ))?;
    layout.swap(p0, p1);
    Ok(())
}

/// Runs the shared ready-set/SWAP-insertion state machine once, forward,
/// over `source`, starting from `initial_layout`. Returns the rebuilt
/// physical-level DAG, the final layout, and the SWAP count.
fn run_forward_pass(
    source: &CircuitDag,
    coupling_map: &CouplingMap,
    calibration: Option<&Calibration>,
    initial_layout: Layout,
    strategy: RoutingStrategy,
    token: Option<&CancellationToken>,
) -> CompileResult<(CircuitDag, Layout, usize)> {
    let mut out = CircuitDag::new();
    for p in 0..coupling_map.num_qubits() {
        out.add_qubit(QubitId(p));
    }
    for c in source.clbits() {
        out.add_clbit(c);
    }
    out.set_global_phase(source.global_phase());
    out.set_level(CircuitLevel::Physical);

    let mut layout = initial_layout;
    let mut indegrees = build_indegrees(source);
    let total_ops = indegrees.len();
    let mut ready = initial_ready(&indegrees);
    let mut emitted = 0usize;
    let mut swaps = 0usize;

    loop {
        if token.is_some_and(CancellationToken::is_cancelled) {
            return Err(CompileError::Cancelled);
        }
        match strategy {
            RoutingStrategy::Naive => drain_single_ready(
                source,
                &mut out,
                &layout,
                coupling_map,
                &mut indegrees,
                &mut ready,
                &mut emitted,
            )?,
            _ => drain_ready(
                source,
                &mut out,
                &layout,
                coupling_map,
                &mut indegrees,
                &mut ready,
                &mut emitted,
            )?,
        }
        if emitted >= total_ops {
            break;
        }
        let (p0, p1) = choose_swap(source, &ready, &layout, coupling_map, calibration, strategy)?;
        emit_swap(&mut out, &mut layout, p0, p1)?;
        swaps += 1;
    }

    Ok((out, layout, swaps))
}

/// Builds a copy of `source` with every wire direction reversed (successors
/// become predecessors), used by the `Sabre` reverse pass.
fn reversed_copy(source: &CircuitDag) -> CircuitDag {
    let mut reversed = CircuitDag::new();
    for q in source.qubits() {
        reversed.add_qubit(q);
    }
    for c in source.clbits() {
        reversed.add_clbit(c);
    }
    for node in source.topological_order().into_iter().rev() {
        let inst = source
            .get_instruction(node)
            .expect("topological node has an instruction")
            .clone();
        reversed.apply(inst).expect("reversed instruction is well-formed");
    }
    reversed
}

/// SABRE layout refinement: route the circuit forward with lookahead
/// scoring, then route the reversed circuit starting from the forward
/// pass's final mapping; the reverse pass's final mapping is the refined
/// initial layout for the real forward emission.
fn refine_layout_sabre(
    source: &CircuitDag,
    coupling_map: &CouplingMap,
    calibration: Option<&Calibration>,
    initial_layout: Layout,
    token: Option<&CancellationToken>,
) -> CompileResult<Layout> {
    let (_, forward_final, _) = run_forward_pass(
        source,
        coupling_map,
        calibration,
        initial_layout,
        RoutingStrategy::Lookahead,
        token,
    )?;
    let reversed = reversed_copy(source);
    let (_, reverse_final, _) = run_forward_pass(
        &reversed,
        coupling_map,
        calibration,
        forward_final,
        RoutingStrategy::Lookahead,
        token,
    )?;
    Ok(reverse_final)
}
