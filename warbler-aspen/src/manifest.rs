use std::{
    fs,
    path::{Path, PathBuf},
};

use semver::Version;
use serde::{Deserialize, Serialize};
use warbler::compiler::{
    rule::{branch_rule, conditional_rule, macro_rule, toggle_rule, Delimiters, RegexRule},
    Config,
};

use crate::{MANIFEST, SOURCE};

#[derive(Serialize, Deserialize, Debug)]
pub struct Manifest {
    pub package: Package,
    #[serde(default)]
    pub compiler: Compiler,
    #[serde(default, rename = "replace", skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<Replace>,
    #[serde(default, rename = "regex", skip_serializing_if = "Vec::is_empty")]
    pub regexes: Vec<Regex>,
    #[serde(default, rename = "shorthand", skip_serializing_if = "Vec::is_empty")]
    pub shorthands: Vec<Shorthand>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Package {
    // required keys
    pub name: String,         // package name, also names the bank
    pub version: String,      // package version, using semver
    pub authors: Vec<String>, // package authors

    // optional keys
    pub readme: Option<String>,     // path to package's readme
    pub license: Option<String>,    // path to package's license
    pub repository: Option<String>, // URL to package's repository
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Compiler {
    /// Macros provided by the runtime.
    #[serde(default)]
    pub recognized: Vec<String>,
    /// Entry files in `src/`, in compilation order.
    /// Every `.toml` file, sorted by name, when empty.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Banks to resolve references against.
    #[serde(default)]
    pub link: Vec<PathBuf>,
    #[serde(default)]
    pub deny_unresolved: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Replace {
    pub from: String,
    pub to: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Regex {
    pub find: String,
    pub replace: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShorthandKind {
    Macro,
    Conditional,
    Toggle,
    Branch,
}

impl ShorthandKind {
    /// How many variables the shorthand tests.
    fn variables(&self) -> usize {
        match self {
            ShorthandKind::Macro => 0,
            ShorthandKind::Conditional | ShorthandKind::Toggle => 1,
            ShorthandKind::Branch => 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Shorthand {
    pub kind: ShorthandKind,
    pub open: char,
    pub close: char,
    pub prefix: Option<String>,
    #[serde(default)]
    pub variables: Vec<String>,
}

impl Shorthand {
    pub fn rule(&self) -> Result<RegexRule, String> {
        if self.variables.len() != self.kind.variables() {
            return Err(format!(
                "A {:?} shorthand takes {} variable(s), found {}",
                self.kind,
                self.kind.variables(),
                self.variables.len(),
            ));
        }

        let delimiters = match &self.prefix {
            Some(prefix) => Delimiters::prefixed(prefix, self.open, self.close),
            None => Delimiters::new(self.open, self.close),
        };
        let variable = |index: usize| self.variables[index].as_str();

        match self.kind {
            ShorthandKind::Macro => macro_rule(&delimiters),
            ShorthandKind::Conditional => conditional_rule(&delimiters, variable(0)),
            ShorthandKind::Toggle => toggle_rule(&delimiters, variable(0)),
            ShorthandKind::Branch => branch_rule(&delimiters, variable(0), variable(1)),
        }
        .map_err(|e| format!("Invalid shorthand delimiters: {}", e))
    }
}

impl Manifest {
    /// A fresh manifest with a `{name}` macro shorthand,
    /// and an `[A|B]` toggle on the runtime-provided `friend`.
    pub fn new(name: String) -> Manifest {
        Manifest {
            package: Package {
                name,
                version: format!("{}", Version::new(0, 0, 0)),
                authors: vec![],
                readme: None,
                license: None,
                repository: None,
            },
            compiler: Compiler {
                recognized: vec!["friend".to_string()],
                ..Compiler::default()
            },
            replacements: vec![],
            regexes: vec![],
            shorthands: vec![
                Shorthand {
                    kind: ShorthandKind::Macro,
                    open: '{',
                    close: '}',
                    prefix: None,
                    variables: vec![],
                },
                Shorthand {
                    kind: ShorthandKind::Toggle,
                    open: '[',
                    close: ']',
                    prefix: None,
                    variables: vec!["friend".to_string()],
                },
            ],
        }
    }

    /// Searches up from `path` for a manifest,
    /// returning it along with the package root.
    pub fn package(mut path: &Path) -> Result<(Manifest, &Path), String> {
        let source = loop {
            match fs::read_to_string(path.join(MANIFEST)) {
                Ok(source) => break source,
                Err(_) => {
                    path = path
                        .parent()
                        .ok_or("The manifest file could not be found")?;
                },
            }
        };

        Ok((Manifest::parse(&source)?, path))
    }

    pub fn parse(source: &str) -> Result<Manifest, String> {
        let manifest: Manifest = toml::from_str(source)
            .map_err(|e| format!("Could not parse the manifest file: {}", e))?;

        Version::parse(&manifest.package.version).map_err(|e| {
            format!(
                "The package version '{}' is not valid semver: {}",
                manifest.package.version, e
            )
        })?;

        Ok(manifest)
    }

    /// Builds the compiler configuration described by the manifest.
    /// Replacements run before regexes, and regexes before shorthands.
    pub fn config(&self) -> Result<Config, String> {
        let mut config = Config::new();

        for name in self.compiler.recognized.iter() {
            config = config.recognize(name);
        }
        for replace in self.replacements.iter() {
            config = config.replace(&replace.from, &replace.to);
        }
        for regex in self.regexes.iter() {
            let rule = RegexRule::new(&regex.find, &regex.replace)
                .map_err(|e| format!("Invalid regex '{}': {}", regex.find, e))?;
            config = config.regex(rule);
        }
        for shorthand in self.shorthands.iter() {
            config = config.regex(shorthand.rule()?);
        }

        Ok(config)
    }

    /// The entry files to compile, in order.
    pub fn sources(&self, root: &Path) -> Result<Vec<PathBuf>, String> {
        let source = root.join(SOURCE);

        if !self.compiler.sources.is_empty() {
            return Ok(self
                .compiler
                .sources
                .iter()
                .map(|file| source.join(file))
                .collect());
        }

        let mut files = fs::read_dir(&source)
            .map_err(|_| format!("Could not read the source directory ({}/)", SOURCE))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "toml"))
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }
}
