//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use synq_device::{BasisGates, CouplingMap, DeviceTopology};
use synq_ir::Circuit;

/// Load a circuit from a SYNQASM or JSON file, dispatching on extension.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "json" => synq_asm::from_json(&source).map_err(|e| anyhow::anyhow!("Parse error: {e}")),
        _ => synq_asm::parse(&source).map_err(|e| anyhow::anyhow!("Parse error: {e}")),
    }
}

/// Save a circuit to a file, dispatching on extension (`.json` for the JSON
/// program representation, SYNQASM text otherwise).
pub fn save_circuit(circuit: &Circuit, path: &str) -> Result<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let content = match ext.to_lowercase().as_str() {
        "json" => synq_asm::to_json(circuit).map_err(|e| anyhow::anyhow!("Emit error: {e}"))?,
        _ => synq_asm::emit(circuit).map_err(|e| anyhow::anyhow!("Emit error: {e}"))?,
    };

    fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;

    Ok(())
}

/// A named built-in device profile.
pub struct DeviceProfile {
    pub name: &'static str,
    pub description: &'static str,
}

/// The built-in device profiles `devices` lists and `compile --target`
/// accepts, mirroring the teacher CLI's `get_target_properties` table.
pub const DEVICE_PROFILES: &[DeviceProfile] = &[
    DeviceProfile { name: "iqm", description: "IQM 5-qubit star topology, native PRX/CZ basis" },
    DeviceProfile { name: "iqm20", description: "IQM 20-qubit star topology, native PRX/CZ basis" },
    DeviceProfile { name: "ibm", description: "IBM 5-qubit linear chain, native basis" },
    DeviceProfile { name: "ibm27", description: "IBM 27-qubit linear chain, native basis" },
    DeviceProfile { name: "ibm-heron", description: "IBM Heron-class (torino/fez/marrakesh), 133 qubits" },
    DeviceProfile { name: "simulator", description: "All-to-all connectivity, universal basis, 20 qubits" },
    DeviceProfile { name: "linear-n", description: "Generic n-qubit linear chain (pass as linear-<n>)" },
    DeviceProfile { name: "star-n", description: "Generic n-qubit star topology (pass as star-<n>)" },
    DeviceProfile { name: "full-n", description: "Generic n-qubit all-to-all device (pass as full-<n>)" },
];

/// Resolve a named target into a [`DeviceTopology`].
///
/// Accepts the fixed profiles in [`DEVICE_PROFILES`] plus the parametric
/// `linear-<n>` / `star-<n>` / `full-<n>` forms.
pub fn get_device(target: &str) -> Result<DeviceTopology> {
    let lower = target.to_lowercase();

    if let Some(rest) = lower.strip_prefix("linear-") {
        let n: u32 = rest
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid linear device size: '{rest}'"))?;
        return Ok(DeviceTopology::new(
            n,
            CouplingMap::linear(n),
            BasisGates::universal(),
        ));
    }
    if let Some(rest) = lower.strip_prefix("star-") {
        let n: u32 = rest
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid star device size: '{rest}'"))?;
        return Ok(DeviceTopology::new(
            n,
            CouplingMap::star(n),
            BasisGates::universal(),
        ));
    }
    if let Some(rest) = lower.strip_prefix("full-") {
        let n: u32 = rest
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid full device size: '{rest}'"))?;
        return Ok(DeviceTopology::new(
            n,
            CouplingMap::full(n),
            BasisGates::universal(),
        ));
    }

    match lower.as_str() {
        "iqm" | "iqm5" => Ok(DeviceTopology::new(5, CouplingMap::star(5), BasisGates::iqm())),
        "iqm20" => Ok(DeviceTopology::new(20, CouplingMap::star(20), BasisGates::iqm())),
        "ibm" | "ibm5" => Ok(DeviceTopology::new(5, CouplingMap::linear(5), BasisGates::ibm())),
        "ibm27" => Ok(DeviceTopology::new(27, CouplingMap::linear(27), BasisGates::ibm())),
        "ibm-heron" | "ibm_torino" | "ibm_fez" | "ibm_marrakesh" => Ok(DeviceTopology::new(
            133,
            CouplingMap::linear(133),
            BasisGates::heron(),
        )),
        "simulator" | "sim" => Ok(DeviceTopology::new(
            20,
            CouplingMap::full(20),
            BasisGates::universal(),
        )),
        other => {
            anyhow::bail!(
                "Unknown target: '{other}'. Run `synq devices` to list built-in profiles, \
                 or use linear-<n>/star-<n>/full-<n> for a generic topology."
            );
        }
    }
}
