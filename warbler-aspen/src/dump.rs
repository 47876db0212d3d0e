use std::{fs, path::Path};

use warbler::Bank;

/// Reads a bank written by `aspen build`.
pub fn load(path: &Path) -> Result<Bank, String> {
    let source = fs::read_to_string(path)
        .map_err(|_| format!("Could not read bank '{}'", path.display()))?;
    serde_json::from_str(&source).map_err(|e| format!("Could not parse bank '{}': {}", path.display(), e))
}

pub fn dump(path: &Path) -> Result<(), String> {
    let bank = load(path)?;
    println!("{}", bank);
    Ok(())
}
