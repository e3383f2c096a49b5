//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Hardware-aware quantum circuit transpiler",
        style("Synq").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  synq-ir       Circuit intermediate representation");
    println!("  synq-device   Target device topology and calibration model");
    println!("  synq-compile  Normalization, layout, routing and cost estimation");
    println!("  synq-asm      SYNQASM textual assembly parser and emitter");
    println!("  synq-cli      Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/synq-rs/synq").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
