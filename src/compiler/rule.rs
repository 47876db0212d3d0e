use regex::Regex;
use tracing::trace;

use crate::compiler::config::Config;

/// An exact substring replacement, applied to every occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: &str, to: &str) -> Replacement {
        Replacement {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        // an empty pattern would match between every character
        if self.from.is_empty() {
            return text.to_string();
        }
        text.replace(&self.from, &self.to)
    }
}

/// A regex find and replacement template pass.
/// The template may refer to capture groups as `$1` or `${1}`,
/// and writes a literal `$` as `$$`.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pub find: Regex,
    pub replace: String,
}

impl RegexRule {
    /// Builds a rule, failing if the pattern is not a valid regex.
    pub fn new(find: &str, replace: &str) -> Result<RegexRule, regex::Error> {
        Ok(RegexRule {
            find: Regex::new(find)?,
            replace: replace.to_string(),
        })
    }

    pub fn apply(&self, text: &str) -> String {
        self.find
            .replace_all(text, self.replace.as_str())
            .into_owned()
    }
}

/// The characters that surround a shorthand group,
/// and an optional literal that must come right before the opening one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
    pub prefix: Option<String>,
}

impl Delimiters {
    pub fn new(open: char, close: char) -> Delimiters {
        Delimiters {
            open,
            close,
            prefix: None,
        }
    }

    /// Delimiters that only match after `prefix`,
    /// so that several shorthand families can share the same brackets.
    pub fn prefixed(prefix: &str, open: char, close: char) -> Delimiters {
        Delimiters {
            open,
            close,
            prefix: Some(prefix.to_string()),
        }
    }

    /// The escaped prefix and opening delimiter.
    fn opening(&self) -> String {
        let prefix = self.prefix.as_deref().map(regex::escape).unwrap_or_default();
        format!("{}{}", prefix, regex::escape(&self.open.to_string()))
    }

    fn closing(&self) -> String {
        regex::escape(&self.close.to_string())
    }

    /// A lazy capture group of anything but the delimiters and `|`.
    /// With `name` set, whitespace is excluded too and the group can't be empty.
    fn group(&self, name: bool) -> String {
        let excluded = format!(
            "{}{}\\|",
            regex::escape(&self.open.to_string()),
            regex::escape(&self.close.to_string()),
        );
        match name {
            true => format!("([^\\s{}]+?)", excluded),
            false => format!("([^{}]*?)", excluded),
        }
    }

    /// Builds a pattern of `groups` groups separated by `|`.
    fn pattern(&self, groups: usize, name: bool) -> String {
        let inner = vec![self.group(name); groups].join("\\|");
        format!("{}{}{}", self.opening(), inner, self.closing())
    }
}

/// Variable names are pasted into a replacement template.
fn template_escape(variable: &str) -> String {
    variable.replace('$', "$$")
}

fn build(pattern: String, replace: String) -> Result<RegexRule, regex::Error> {
    RegexRule::new(&pattern, &replace)
}

/// `{NAME}` becomes `$(NAME)`.
pub fn macro_rule(delimiters: &Delimiters) -> Result<RegexRule, regex::Error> {
    build(delimiters.pattern(1, true), "$$(${1})".to_string())
}

/// `[A]` includes `A` only when `variable` is true.
pub fn conditional_rule(delimiters: &Delimiters, variable: &str) -> Result<RegexRule, regex::Error> {
    build(
        delimiters.pattern(1, false),
        format!("?(if {})${{1}}?(endif)", template_escape(variable)),
    )
}

/// `[A|B]` picks `A` when `variable` is true, `B` otherwise.
pub fn toggle_rule(delimiters: &Delimiters, variable: &str) -> Result<RegexRule, regex::Error> {
    build(
        delimiters.pattern(2, false),
        format!(
            "?(if {})${{1}}?(else)${{2}}?(endif)",
            template_escape(variable),
        ),
    )
}

/// `[A|B|C]` picks `A` when `first` is true, then `B` when `second` is,
/// and `C` otherwise.
pub fn branch_rule(
    delimiters: &Delimiters,
    first: &str,
    second: &str,
) -> Result<RegexRule, regex::Error> {
    build(
        delimiters.pattern(3, false),
        format!(
            "?(if {})${{1}}?(elif {})${{2}}?(else)${{3}}?(endif)",
            template_escape(first),
            template_escape(second),
        ),
    )
}

/// Rewrites raw template text into canonical directive syntax:
/// the pre hook, then every replacement, then every regex rule,
/// then the post hook, each pass over the whole text.
pub fn expand(config: &Config, text: &str) -> String {
    let mut text = text.to_string();

    if let Some(hook) = &config.pre_hook {
        hook(&mut text);
    }

    for replacement in config.replacements.iter() {
        text = replacement.apply(&text);
    }

    for rule in config.rules.iter() {
        text = rule.apply(&text);
    }

    if let Some(hook) = &config.post_hook {
        hook(&mut text);
    }

    trace!(expanded = %text, "expanded template");
    text
}
