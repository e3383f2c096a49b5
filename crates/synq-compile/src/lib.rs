//! Synq Compilation and Transpilation Framework
//!
//! This crate provides the compilation infrastructure for transforming
//! quantum circuits to run on target hardware. It implements a pass-based
//! architecture similar to LLVM, enabling modular and extensible compilation.
//!
//! # Overview
//!
//! The compilation process transforms an input circuit through a series of
//! passes that:
//! 1. **Normalize**: Decompose every gate into the device's basis
//! 2. **Layout**: Map logical qubits to physical qubits on the target device
//! 3. **Route**: Insert SWAP gates to satisfy connectivity constraints
//! 4. **Estimate**: Compute fidelity and execution-time metrics from calibration
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (coupling map, basis gates, calibration, layout)
//! └─────────────┘
//!       │
//!       ├── Normalizer
//!       ├── LayoutPlanner (trivial / dense / calibration-weighted)
//!       └── Router (naive / basic / lookahead / sabre)
//!       │
//!       ▼
//! Routed Circuit (hardware-compatible) ──► CostEstimator ──► Metrics
//! ```
//!
//! The [`pipeline`] module wires the whole sequence together behind a single
//! [`pipeline::transpile`] call and adds the recomputed structural metrics
//! and optional equivalence check that make up a `TranspilationResult`.
//!
//! # Example: Basic Compilation
//!
//! ```rust
//! use synq_compile::{PassManagerBuilder};
//! use synq_device::{CouplingMap, BasisGates};
//! use synq_ir::Circuit;
//!
//! // Create a circuit
//! let circuit = Circuit::bell().unwrap();
//!
//! // Build pass manager for IQM target
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(CouplingMap::star(5), BasisGates::iqm())
//!     .build();
//!
//! // Compile the circuit
//! let mut dag = circuit.into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//!
//! let compiled = Circuit::from_dag(dag);
//! println!("Compiled depth: {}", compiled.depth());
//! ```
//!
//! # Example: End-to-end Transpilation
//!
//! ```rust
//! use synq_compile::pipeline::{transpile, PipelineOptions};
//! use synq_compile::CancellationToken;
//! use synq_device::{DeviceTopology, CouplingMap, BasisGates};
//! use synq_ir::Circuit;
//!
//! let circuit = Circuit::bell().unwrap();
//! let device = DeviceTopology::new(2, CouplingMap::linear(2), BasisGates::universal());
//!
//! let result = transpile(&circuit, &device, PipelineOptions::new(), &CancellationToken::new()).unwrap();
//! assert_eq!(result.structural.swap_count, 0);
//! ```
//!
//! # Built-in Passes
//!
//! ## Normalization
//! - [`passes::Normalizer`]: Decompose every gate into the device's basis gates
//!
//! ## Layout
//! - [`passes::LayoutPlanner`]: Trivial / Dense sub-graph / Calibration-weighted
//!   initial placement of logical qubits onto physical qubits
//!
//! ## Routing
//! - [`passes::Router`]: Naive / Basic / Lookahead / SABRE SWAP insertion for
//!   connectivity
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use synq_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use synq_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         // Your pass logic here
//!         Ok(())
//!     }
//! }
//! ```

pub mod cancel;
pub mod cost;
pub mod equivalence;
pub mod error;
pub mod manager;
pub mod pass;
pub mod pipeline;
pub mod property;
pub mod unitary;

// Built-in passes
pub mod passes;

pub use cancel::CancellationToken;
pub use cost::{CostEstimator, Metrics, QubitMetrics};
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{AnalysisPass, Pass, PassKind, TransformationPass};
pub use pipeline::{PipelineOptions, RoutedCircuit, StructuralMetrics, TranspilationResult, Warning};
pub use property::{Layout, PropertySet};
