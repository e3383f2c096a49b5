//! Devices command implementation.

use anyhow::Result;
use console::style;

use super::common::DEVICE_PROFILES;

/// Execute the devices command: list the built-in device profiles.
pub async fn execute() -> Result<()> {
    println!(
        "{} Built-in device profiles:\n",
        style("Synq").cyan().bold()
    );

    for profile in DEVICE_PROFILES {
        println!("  {} {}", style(profile.name).green().bold(), profile.description);
    }

    println!();
    println!("Pass a profile name to `synq compile --target <name>`.");

    Ok(())
}
