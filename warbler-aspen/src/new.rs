use std::{
    fs,
    path::{Path, PathBuf},
};

use warbler::Compiler;

use crate::{
    build::parse_entries,
    manifest::Manifest,
    status::{Kind, Status},
    ENTRYPOINT, MANIFEST, SOURCE,
};

/// Starter entries, written against the shorthands of `Manifest::new`:
/// `{name}` pastes a macro and `[A|B]` toggles on `friend`.
const STARTER: &str = r#"# Entries are compiled in the order they appear,
# so a macro must be defined before it is referenced.

[[entry]]
name = "name"
text = "Wren"

[[entry]]
name = "greeting"
text = "Hello, [{name}|stranger]!"
"#;

/// Compiles the starter entries once under `manifest`,
/// so a scaffolded package always builds cleanly.
fn validate(manifest: &Manifest) -> Result<(), String> {
    let entries = parse_entries(STARTER, ENTRYPOINT)?;
    let compilation = Compiler::new(manifest.config()?)
        .compile(entries, &[])
        .map_err(|e| format!("The starter entries do not compile: {}", e))?;

    if !compilation.is_resolved() {
        return Err("The starter entries reference undefined macros".to_string());
    }
    Ok(())
}

/// Writes `contents` to `path` unless something is already there.
fn write_once(path: &Path, what: &str, contents: &str) -> Result<(), String> {
    if path.exists() {
        Status::warn().log(&format!("The {} ({}) already exists", what, path.display()));
        return Ok(());
    }
    fs::write(path, contents).map_err(|_| format!("Could not write the {}", what))
}

pub fn new(package: PathBuf) -> Result<(), String> {
    let name = package
        .file_name()
        .ok_or("Can not determine directory name")?
        .to_str()
        .ok_or("Directory name is not representable")?
        .to_owned();

    let manifest = Manifest::new(name.clone());
    validate(&manifest)?;

    fs::create_dir_all(package.join(SOURCE)).map_err(|_| "Unable to create package directory")?;

    let rendered =
        toml::to_string_pretty(&manifest).map_err(|_| "Could not generate manifest file")?;
    write_once(&package.join(MANIFEST), "manifest file", &rendered)?;
    write_once(&package.join(SOURCE).join(ENTRYPOINT), "starter entries", STARTER)?;

    Status(Kind::Success, "Finished").log(&format!("The package '{}' was created successfully", name));
    Ok(())
}
