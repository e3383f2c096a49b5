//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use synq_device::{BasisGates, Calibration, CouplingMap};
use synq_ir::CircuitDag;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{LayoutPlanner, LayoutStrategy, Normalizer, Router, RoutingStrategy};
use crate::property::PropertySet;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                // Avoid calling dag.depth() here — it performs a full topological
                // sort (O(V+E)) on every pass and is only used for debug logging.
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
///
/// Assembles the standard `Normalizer -> LayoutPlanner -> Router` sequence
/// out of whichever target information (coupling map, basis gates,
/// calibration) has been supplied. Passes for information that was never
/// set are simply omitted — `should_run` gives the same effect for a
/// dynamically-filled `PropertySet`, but omitting the pass entirely avoids
/// returning a `Missing*` error from a pass the caller never intended to
/// run.
pub struct PassManagerBuilder {
    /// Strategy the Layout Planner should use.
    layout_strategy: LayoutStrategy,
    /// Strategy the Router should use.
    routing_strategy: RoutingStrategy,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            layout_strategy: LayoutStrategy::default(),
            routing_strategy: RoutingStrategy::default(),
            properties: PropertySet::new(),
        }
    }

    /// Set the Layout Planner's strategy.
    #[must_use]
    pub fn with_layout_strategy(mut self, strategy: LayoutStrategy) -> Self {
        self.layout_strategy = strategy;
        self
    }

    /// Set the Router's strategy.
    #[must_use]
    pub fn with_routing_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.routing_strategy = strategy;
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Attach device calibration, consulted by the `Calibration` layout
    /// strategy and left in the property set for the Cost Estimator.
    #[must_use]
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.properties.calibration = Some(calibration);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.properties.basis_gates.is_some() {
            pm.add_pass(Normalizer::new());
        }

        if self.properties.coupling_map.is_some() {
            pm.add_pass(LayoutPlanner::new(self.layout_strategy));
            pm.add_pass(Router::new(self.routing_strategy));
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synq_ir::{Circuit, QubitId};

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let mut dag = circuit.into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.num_ops(), 2);
    }

    #[test]
    fn test_pass_manager_builder() {
        let (pm, props) = PassManagerBuilder::new()
            .with_layout_strategy(LayoutStrategy::Dense)
            .with_routing_strategy(RoutingStrategy::Lookahead)
            .with_target(CouplingMap::linear(5), BasisGates::iqm())
            .build();

        assert!(!pm.is_empty());
        assert!(props.coupling_map.is_some());
        assert!(props.basis_gates.is_some());
    }

    #[test]
    fn test_pass_manager_builder_runs_end_to_end() {
        let (pm, mut props) = PassManagerBuilder::new()
            .with_target(CouplingMap::linear(3), BasisGates::universal())
            .build();

        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(2)).unwrap();

        let mut dag = circuit.into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        let coupling_map = props.coupling_map.unwrap();
        for (_, inst) in dag.topological_ops() {
            if inst.qubits.len() == 2 {
                assert!(coupling_map.coupled(inst.qubits[0].0, inst.qubits[1].0));
            }
        }
    }
}
