use std::fmt;

use crate::compiler::rule::{RegexRule, Replacement};

/// A hook that may rewrite a template arbitrarily.
pub type Hook = Box<dyn Fn(&mut String)>;

/// Everything a session needs to know besides the entries themselves.
///
/// ```
/// use warbler::compiler::{config::Config, rule::{toggle_rule, Delimiters}};
///
/// let config = Config::new()
///     .recognize("player")
///     .replace("...", "…")
///     .regex(toggle_rule(&Delimiters::new('[', ']'), "friend").unwrap());
/// ```
#[derive(Default)]
pub struct Config {
    /// Macros defined outside of any compiled entry, e.g. by the runtime.
    pub recognized: Vec<String>,
    pub pre_hook: Option<Hook>,
    pub post_hook: Option<Hook>,
    pub replacements: Vec<Replacement>,
    pub rules: Vec<RegexRule>,
}

impl Config {
    pub fn new() -> Config {
        Default::default()
    }

    /// Pre-declares a macro name, so references to it always resolve.
    pub fn recognize(mut self, name: &str) -> Self {
        self.recognized.push(name.to_string());
        self
    }

    pub fn replace(mut self, from: &str, to: &str) -> Self {
        self.replacements.push(Replacement::new(from, to));
        self
    }

    pub fn regex(mut self, rule: RegexRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Runs before any replacement.
    pub fn pre_hook(mut self, hook: impl Fn(&mut String) + 'static) -> Self {
        self.pre_hook = Some(Box::new(hook));
        self
    }

    /// Runs after every regex rule.
    pub fn post_hook(mut self, hook: impl Fn(&mut String) + 'static) -> Self {
        self.post_hook = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("recognized", &self.recognized)
            .field("pre_hook", &self.pre_hook.is_some())
            .field("post_hook", &self.post_hook.is_some())
            .field("replacements", &self.replacements)
            .field("rules", &self.rules)
            .finish()
    }
}
