use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::info;
use warbler::{
    compiler::{Compilation, Compiler, Entry},
    Bank,
};

use crate::{dump::load, manifest::Manifest, status::Status, TARGET};

/// The contents of an entry file.
#[derive(Deserialize, Debug)]
struct Entries {
    #[serde(default, rename = "entry")]
    entries: Vec<Definition>,
}

#[derive(Deserialize, Debug)]
struct Definition {
    name: String,
    text: String,
}

/// Parses the `[[entry]]` tables of an entry file, in order.
pub fn parse_entries(source: &str, origin: &str) -> Result<Vec<Entry>, String> {
    let parsed: Entries = toml::from_str(source)
        .map_err(|e| format!("Could not parse entry file '{}': {}", origin, e))?;

    Ok(parsed
        .entries
        .into_iter()
        .map(|definition| Entry::from((definition.name, definition.text)))
        .collect())
}

fn read_entries(file: &Path) -> Result<Vec<Entry>, String> {
    let source = fs::read_to_string(file)
        .map_err(|_| format!("Could not read entry file '{}'", file.display()))?;
    parse_entries(&source, &file.display().to_string())
}

/// Compiles a whole package, reporting unresolved references.
pub fn compile(path: &Path) -> Result<(Manifest, PathBuf, Compilation), String> {
    let (manifest, root) = Manifest::package(path)?;
    let root = root.to_path_buf();

    let linked = manifest
        .compiler
        .link
        .iter()
        .map(|bank| load(&root.join(bank)))
        .collect::<Result<Vec<Bank>, String>>()?;
    if !linked.is_empty() {
        Status::info().log(&format!("Linking against {} bank(s)", linked.len()));
    }

    let mut entries = vec![];
    for file in manifest.sources(&root)? {
        entries.append(&mut read_entries(&file)?);
    }

    let mut compiler = Compiler::new(manifest.config()?);
    let mut compilation = Compilation::default();
    for step in compiler.steps(entries, &linked, &mut compilation) {
        let name = step.map_err(|e| e.to_string())?;
        info!(entry = %name, "compiled");
    }

    if !compilation.unresolved_names.is_empty() {
        Status::warn().list("Unresolved macro names:", compilation.unresolved_names.iter());
    }
    if !compilation.unresolved_ids.is_empty() {
        Status::warn().list(
            "Unresolved macro ids:",
            compilation.unresolved_ids.iter().map(|id| format!("{:#010x}", id)),
        );
    }

    Ok((manifest, root, compilation))
}

fn summary(compilation: &Compilation) -> String {
    let stats = &compilation.stats;
    format!(
        "{} macro(s), {} string(s), {} literal(s) reused",
        stats.macros, stats.strings, stats.reused
    )
}

pub fn build(path: PathBuf) -> Result<(), String> {
    let (manifest, root, compilation) = compile(&path)?;

    let target = root.join(TARGET);
    fs::create_dir_all(&target).map_err(|_| "Could not create target directory")?;

    let file = target.join(format!("{}.bank.json", manifest.package.name));
    let json = serde_json::to_string_pretty(&compilation.bank)
        .map_err(|e| format!("Could not serialize bank: {}", e))?;
    fs::write(&file, json).map_err(|_| format!("Could not write bank '{}'", file.display()))?;

    Status::success().log(&format!("Wrote {} ({})", file.display(), summary(&compilation)));
    Ok(())
}

pub fn check(path: PathBuf) -> Result<(), String> {
    let (manifest, _, compilation) = compile(&path)?;

    if manifest.compiler.deny_unresolved && !compilation.is_resolved() {
        return Err(format!(
            "{} unresolved reference(s), and the manifest denies them",
            compilation.unresolved_names.len() + compilation.unresolved_ids.len()
        ));
    }

    if !compilation.is_resolved() {
        Status::note().log("Unresolved references are allowed, set `deny_unresolved` to reject them");
    }

    Status::success().log(&format!("Checked '{}': {}", manifest.package.name, summary(&compilation)));
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn package(manifest: &str, entries: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(crate::MANIFEST), manifest).unwrap();
        fs::create_dir(dir.path().join(crate::SOURCE)).unwrap();
        fs::write(dir.path().join(crate::SOURCE).join("lines.toml"), entries).unwrap();
        dir
    }

    const ENTRIES: &str = r#"
[[entry]]
name = "greet"
text = "Hello {who}"
"#;

    #[test]
    fn builds_a_bank() {
        let dir = package(
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\nauthors = []\n\n\
             [[shorthand]]\nkind = \"macro\"\nopen = \"{\"\nclose = \"}\"\n",
            ENTRIES,
        );

        build(dir.path().to_path_buf()).unwrap();
        let bank = load(&dir.path().join(TARGET).join("demo.bank.json")).unwrap();
        assert_eq!(bank.macros.len(), 1);
        assert_eq!(bank.strings, vec!["Hello ".to_string()]);
    }

    #[test]
    fn check_denies_unresolved() {
        let dir = package(
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\nauthors = []\n\n\
             [compiler]\ndeny_unresolved = true\n\n\
             [[shorthand]]\nkind = \"macro\"\nopen = \"{\"\nclose = \"}\"\n",
            ENTRIES,
        );

        assert!(check(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn syntax_errors_fail_the_build() {
        let dir = package(
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\nauthors = []\n",
            "[[entry]]\nname = \"broken\"\ntext = \"?(if a)never closed\"\n",
        );

        let error = build(dir.path().to_path_buf()).unwrap_err();
        assert!(error.contains("Unclosed conditional"));
    }
}
