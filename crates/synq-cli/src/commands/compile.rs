//! Compile command implementation.

use anyhow::Result;
use console::style;
use std::path::Path;

use synq_compile::pipeline::{transpile, PipelineOptions, Warning};
use synq_compile::passes::{LayoutStrategy, RoutingStrategy};
use synq_compile::CancellationToken;

use super::common::{get_device, load_circuit, save_circuit};

/// Execute the compile command.
pub async fn execute(
    input: &str,
    output: Option<&str>,
    target: &str,
    layout_strategy: &str,
    routing_strategy: &str,
    check_equivalence: bool,
) -> Result<()> {
    println!(
        "{} Compiling {} for target {}",
        style("→").cyan().bold(),
        style(input).green(),
        style(target).yellow()
    );

    let circuit = load_circuit(input)?;
    println!(
        "  Loaded: {} qubits, depth {}",
        circuit.num_qubits(),
        circuit.depth()
    );

    let device = get_device(target)?;
    let options = PipelineOptions::new()
        .with_layout_strategy(parse_layout_strategy(layout_strategy)?)
        .with_routing_strategy(parse_routing_strategy(routing_strategy)?);
    let options = if check_equivalence {
        options
    } else {
        options.without_equivalence_check()
    };

    let result = transpile(&circuit, &device, options, &CancellationToken::new())
        .map_err(|e| anyhow::anyhow!("Compilation error: {e}"))?;

    println!("{} Compilation complete", style("✓").green().bold());
    println!(
        "  Depth: {} → {}  |  Gates: {} → {}  |  SWAPs inserted: {}",
        result.structural.original_depth,
        result.structural.transpiled_depth,
        result.structural.original_gate_count,
        result.structural.transpiled_gate_count,
        result.structural.swap_count,
    );
    println!(
        "  Estimated fidelity: {:.4}  |  Critical-path time: {:.1}",
        1.0 - result.cost.effective_error,
        result.cost.execution_time,
    );

    for warning in &result.warnings {
        let Warning::CalibrationIncomplete { kind, qubits } = warning;
        println!(
            "  {} no calibration for '{kind}' on {qubits:?}",
            style("warning:").yellow().bold()
        );
    }

    let output_path = output
        .map(str::to_string)
        .unwrap_or_else(|| default_output_path(input));

    save_circuit(&result.routed.circuit, &output_path)?;
    println!("  Output: {}", style(&output_path).green());

    Ok(())
}

fn default_output_path(input: &str) -> String {
    let p = Path::new(input);
    let stem = p.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}_compiled.synq")
}

fn parse_layout_strategy(s: &str) -> Result<LayoutStrategy> {
    match s.to_lowercase().as_str() {
        "trivial" => Ok(LayoutStrategy::Trivial),
        "dense" => Ok(LayoutStrategy::Dense),
        "calibration" => Ok(LayoutStrategy::Calibration),
        other => anyhow::bail!("Unknown layout strategy: '{other}' (expected trivial, dense, calibration)"),
    }
}

fn parse_routing_strategy(s: &str) -> Result<RoutingStrategy> {
    match s.to_lowercase().as_str() {
        "naive" => Ok(RoutingStrategy::Naive),
        "basic" => Ok(RoutingStrategy::Basic),
        "lookahead" => Ok(RoutingStrategy::Lookahead),
        "sabre" => Ok(RoutingStrategy::Sabre),
        other => anyhow::bail!("Unknown routing strategy: '{other}' (expected naive, basic, lookahead, sabre)"),
    }
}
