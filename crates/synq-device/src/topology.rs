//! Device connectivity graph and native gate set.
//!
//! Lives in its own crate so that both `synq-compile` and `synq-cli` can
//! depend on the device model without depending on the compiler's pass
//! infrastructure.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The undirected connectivity graph between physical qubits.
///
/// ## Performance
///
/// On construction, an all-pairs BFS distance matrix is precomputed, giving
/// O(1) `distance()` lookups. `shortest_path()` is recomputed per call by a
/// BFS that always expands neighbors in ascending qubit order and keeps, at
/// each node, the lexicographically smallest path reaching it — this
/// guarantees ties are broken by lexicographic order of the path's qubit
/// sequence, which a plain predecessor matrix does not.
///
/// ## Deserialization
///
/// After deserialization, call [`rebuild_caches()`](Self::rebuild_caches) to
/// recompute the adjacency list and distance matrix (both skipped during
/// serialization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMap {
    /// List of connected qubit pairs (bidirectional).
    edges: Vec<(u32, u32)>,
    /// Number of physical qubits.
    num_qubits: u32,
    /// Adjacency list, kept sorted ascending so BFS expansion order is
    /// deterministic (needed for the lexicographic tie-break).
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
    /// Precomputed all-pairs distance matrix. `dist_matrix[from][to]` is the
    /// shortest-path distance, or `u32::MAX` if unreachable.
    #[serde(skip)]
    dist_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Create a new coupling map with the given number of qubits and no edges.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            edges: vec![],
            num_qubits,
            adjacency: FxHashMap::default(),
            dist_matrix: vec![],
        }
    }

    /// Add an edge between two qubits (bidirectional).
    ///
    /// Duplicate edges (including reversed pairs) are silently ignored.
    pub fn add_edge(&mut self, q1: u32, q2: u32) {
        if self
            .edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
        {
            return;
        }
        self.edges.push((q1, q2));
        self.adjacency.entry(q1).or_default().push(q2);
        self.adjacency.entry(q2).or_default().push(q1);
        for neighbors in self.adjacency.values_mut() {
            neighbors.sort_unstable();
        }
    }

    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(src as u32);

            while let Some(current) = queue.pop_front() {
                let cur = current as usize;
                for &neighbor in self.adjacency.get(&current).into_iter().flatten() {
                    let nb = neighbor as usize;
                    if self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Rebuild the adjacency list and distance matrix from the edge list.
    /// Must be called after deserialization.
    pub fn rebuild_caches(&mut self) {
        self.adjacency.clear();
        for &(q1, q2) in &self.edges {
            self.adjacency.entry(q1).or_default().push(q2);
            self.adjacency.entry(q2).or_default().push(q1);
        }
        for neighbors in self.adjacency.values_mut() {
            neighbors.sort_unstable();
        }
        self.precompute_distances();
    }

    /// Whether two physical qubits are directly coupled.
    #[inline]
    pub fn coupled(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(&q1)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    /// Alias of [`coupled`](Self::coupled).
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.coupled(q1, q2)
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the coupling edges.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Get the neighbors of a qubit, in ascending order.
    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(&qubit)
            .map(|v| v.iter().copied())
            .into_iter()
            .flatten()
    }

    /// Whether the coupling graph is a single connected component.
    pub fn is_connected_graph(&self) -> bool {
        if self.num_qubits == 0 {
            return true;
        }
        self.dist_matrix
            .first()
            .is_some_and(|row| row.iter().all(|&d| d != u32::MAX))
    }

    /// Create a linear coupling map (0-1-2-3-...).
    pub fn linear(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            map.add_edge(i, i + 1);
        }
        map.precompute_distances();
        map
    }

    /// Create a fully connected coupling map.
    pub fn full(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                map.add_edge(i, j);
            }
        }
        map.precompute_distances();
        map
    }

    /// Create a star topology (center qubit connected to all others).
    pub fn star(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 1..n {
            map.add_edge(0, i);
        }
        map.precompute_distances();
        map
    }

    /// O(1) shortest-path distance lookup using the precomputed matrix.
    /// Falls back to BFS if the matrix has not been precomputed.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        if from == to {
            return Some(0);
        }

        let (f, t) = (from as usize, to as usize);
        if f < self.dist_matrix.len() && t < self.dist_matrix[f].len() {
            let d = self.dist_matrix[f][t];
            return if d == u32::MAX { None } else { Some(d) };
        }

        self.distance_bfs(from, to)
    }

    /// Shortest path from `from` to `to`, ties broken by lexicographic order
    /// of the path's qubit sequence.
    ///
    /// Computed by a BFS that expands each node's neighbors in ascending
    /// order and, for every node reached at a given distance, retains the
    /// lexicographically smallest path seen so far to reach it. Because
    /// qubits are expanded in ascending order and a node's recorded best
    /// path only improves monotonically, the final path at `to` is the
    /// lexicographically smallest among all shortest paths.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut best_path: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        let mut dist: FxHashMap<u32, u32> = FxHashMap::default();
        best_path.insert(from, vec![from]);
        dist.insert(from, 0);

        let mut queue = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let current_dist = dist[&current];
            let current_path = best_path[&current].clone();

            for neighbor in self.neighbors(current) {
                let candidate_dist = current_dist + 1;
                let mut candidate_path = current_path.clone();
                candidate_path.push(neighbor);

                match dist.get(&neighbor) {
                    None => {
                        dist.insert(neighbor, candidate_dist);
                        best_path.insert(neighbor, candidate_path);
                        queue.push_back(neighbor);
                    }
                    Some(&existing_dist) if existing_dist == candidate_dist => {
                        let existing_path = &best_path[&neighbor];
                        if candidate_path < *existing_path {
                            best_path.insert(neighbor, candidate_path);
                        }
                    }
                    Some(_) => {}
                }
            }
        }

        best_path.remove(&to)
    }

    fn distance_bfs(&self, from: u32, to: u32) -> Option<u32> {
        let mut visited = FxHashMap::default();
        let mut queue = VecDeque::new();
        queue.push_back((from, 0u32));
        visited.insert(from, 0u32);

        while let Some((current, dist)) = queue.pop_front() {
            for neighbor in self.neighbors(current) {
                if neighbor == to {
                    return Some(dist + 1);
                }
                if let std::collections::hash_map::Entry::Vacant(e) = visited.entry(neighbor) {
                    e.insert(dist + 1);
                    queue.push_back((neighbor, dist + 1));
                }
            }
        }

        None
    }
}

/// The native gate set a target device can execute directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisGates {
    /// List of gate names in the basis.
    gates: Vec<String>,
}

impl BasisGates {
    /// Create a new basis gate set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(std::convert::Into::into).collect(),
        }
    }

    /// Whether a gate name is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// The basis gate names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// IQM basis: PRX + CZ.
    pub fn iqm() -> Self {
        Self::new(["prx", "cz", "measure", "barrier"])
    }

    /// IBM basis: RZ + SX + X + CX.
    pub fn ibm() -> Self {
        Self::new(["rz", "sx", "x", "cx", "measure", "barrier", "id"])
    }

    /// IBM Heron basis: RZ + SX + X + CZ.
    pub fn heron() -> Self {
        Self::new([
            "rz", "sx", "x", "cz", "id", "rx", "rzz", "measure", "barrier",
        ])
    }

    /// Universal basis: the full recognized gate set, unrestricted.
    pub fn universal() -> Self {
        Self::new([
            "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p", "u",
            "cx", "cy", "cz", "ch", "swap", "iswap", "crx", "cry", "crz", "cp", "rxx", "ryy",
            "rzz", "ccx", "cswap", "measure", "reset", "barrier",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupling_map_linear() {
        let map = CouplingMap::linear(5);
        assert!(map.coupled(0, 1));
        assert!(map.coupled(1, 2));
        assert!(!map.coupled(0, 2));
        assert_eq!(map.distance(0, 4), Some(4));
    }

    #[test]
    fn test_coupling_map_star() {
        let map = CouplingMap::star(5);
        assert!(map.coupled(0, 1));
        assert!(map.coupled(0, 4));
        assert!(!map.coupled(1, 2));
        assert_eq!(map.distance(1, 2), Some(2));
    }

    #[test]
    fn test_shortest_path_linear() {
        let map = CouplingMap::linear(5);
        assert_eq!(map.shortest_path(0, 4), Some(vec![0, 1, 2, 3, 4]));
        assert_eq!(map.shortest_path(2, 2), Some(vec![2]));
    }

    #[test]
    fn test_shortest_path_lexicographic_tiebreak() {
        // Diamond: 0 connects to 1 and 2, both connect to 3. Two shortest
        // paths of length 2 exist from 0 to 3: [0,1,3] and [0,2,3].
        // The lexicographically smaller one must be chosen.
        let mut map = CouplingMap::new(4);
        map.add_edge(0, 1);
        map.add_edge(0, 2);
        map.add_edge(1, 3);
        map.add_edge(2, 3);
        map.rebuild_caches();

        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 3]));
    }

    #[test]
    fn test_disconnected_components() {
        let mut map = CouplingMap::new(4);
        map.add_edge(0, 1);
        map.add_edge(2, 3);
        map.rebuild_caches();

        assert_eq!(map.distance(0, 2), None);
        assert_eq!(map.shortest_path(0, 2), None);
        assert!(!map.is_connected_graph());
    }

    #[test]
    fn test_basis_gates() {
        let iqm = BasisGates::iqm();
        assert!(iqm.contains("prx"));
        assert!(iqm.contains("cz"));
        assert!(!iqm.contains("cx"));

        let ibm = BasisGates::ibm();
        assert!(ibm.contains("cx"));
        assert!(!ibm.contains("prx"));
    }
}
