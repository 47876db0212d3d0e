///! Snippet tests for the warbler compiler pipeline as a whole.
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

use warbler::{
    common::source::Source,
    compiler::{
        lex::Lexer,
        rule::{branch_rule, conditional_rule, macro_rule, toggle_rule, Delimiters},
    },
    Compiler, Config,
};

/// Represents specific success/failure modes of a snippet test.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Syntax,
}

impl Outcome {
    pub fn parse(outcome: &str) -> Outcome {
        match outcome {
            "success" => Outcome::Success,
            "syntax" => Outcome::Syntax,
            invalid => {
                println!("invalid: '{}'", invalid);
                panic!("invalid outcome in strat heading");
            },
        }
    }
}

/// Represents what part of the compiler a snippet tests.
#[derive(Debug)]
pub enum Action {
    Lex,
    Compile,
}

impl Action {
    pub fn parse(action: &str) -> Action {
        match action {
            "lex" => Action::Lex,
            "compile" => Action::Compile,
            invalid => {
                println!("invalid: '{}'", invalid);
                panic!("invalid action in strat heading");
            },
        }
    }
}

/// Represents a test strategy for executing a snippet,
/// Found at the top of each file.
#[derive(Debug)]
pub struct TestStrat {
    /// How to run the test.
    action: Action,
    /// The expected outcome.
    outcome: Outcome,
    /// Names expected to be left unresolved.
    /// Should only be used with Action::Compile
    unresolved: Option<BTreeSet<String>>,
    /// Macros the compiler should already know about.
    recognized: Vec<String>,
}

impl TestStrat {
    /// Uses a heading to construct a test strat
    pub fn heading(heading: HashMap<String, String>) -> TestStrat {
        let mut outcome = None;
        let mut action = None;
        let mut unresolved = None;
        let mut recognized = vec![];

        for (strat, result) in heading.iter() {
            match strat.as_str() {
                "outcome" => outcome = Some(Outcome::parse(result)),
                "action" => action = Some(Action::parse(result)),
                "unresolved" => {
                    unresolved = Some(result.split_whitespace().map(String::from).collect())
                },
                "recognize" => recognized = result.split_whitespace().map(String::from).collect(),
                invalid => {
                    println!("invalid: '{}'", invalid);
                    panic!("invalid strat in strat heading");
                },
            }
        }

        TestStrat {
            outcome: outcome.expect("no outcome provided"),
            action: action.expect("no action provided"),
            unresolved,
            recognized,
        }
    }

    /// Splits a snippet into its test strat and its template.
    pub fn snippet(contents: &str) -> (TestStrat, String) {
        let mut heading = HashMap::new();
        let mut lines = contents.lines().peekable();

        // build up a list of key-value pairs
        while let Some(line) = lines.peek() {
            if line.len() <= 2 || &line[0..2] != "--" {
                break;
            };

            let spliced = line[2..].trim().split(':').collect::<Vec<&str>>();
            if spliced.len() <= 1 {
                panic!("Missing colon in test strat heading")
            }

            let strat = spliced[0];
            let result = spliced[1..].join(":");
            if heading
                .insert(strat.trim().to_string(), result.trim().to_string())
                .is_some()
            {
                panic!("Key present twice in test strat heading");
            }
            lines.next();
        }

        let template = lines.collect::<Vec<_>>().join("\n");
        (TestStrat::heading(heading), template)
    }
}

/// The shorthand every snippet may use.
fn config(recognized: &[String]) -> Config {
    let mut config = Config::new()
        .replace("<br>", "\n")
        .regex(macro_rule(&Delimiters::new('{', '}')).unwrap())
        .regex(branch_rule(&Delimiters::new('[', ']'), "first", "second").unwrap())
        .regex(toggle_rule(&Delimiters::new('[', ']'), "toggle").unwrap())
        .regex(conditional_rule(&Delimiters::prefixed("!", '[', ']'), "maybe").unwrap());

    for name in recognized {
        config = config.recognize(name);
    }
    config
}

fn test_snippet(path: &Path, strat: TestStrat, template: String) {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .expect("Snippet has no name");

    let actual_outcome = match strat.action {
        Action::Lex => match Lexer::lex(Source::new(&template, name)) {
            Ok(_) => Outcome::Success,
            Err(e) => {
                println!("{}", e);
                Outcome::Syntax
            },
        },

        Action::Compile => {
            let mut compiler = Compiler::new(config(&strat.recognized));
            match compiler.compile([(name, template.as_str())], &[]) {
                Ok(compilation) => {
                    if let Some(expected) = &strat.unresolved {
                        if expected != &compilation.unresolved_names {
                            println!("Unresolved: {:?}", compilation.unresolved_names);
                            println!("Expected: {:?}", expected);
                            panic!("Unresolved names do not match")
                        }
                    }
                    Outcome::Success
                },
                Err(e) => {
                    println!("{}", e);
                    Outcome::Syntax
                },
            }
        },
    };

    if actual_outcome != strat.outcome {
        println!("expected outcome {:?}", strat.outcome);
        println!("actual outcome {:?}", actual_outcome);
        panic!("test failed, outcomes are not the same");
    }
}

#[test]
fn test_snippets() {
    let paths = fs::read_dir("./tests/snippets")
        .expect("You must be in the base warbler directory, snippets in ./tests/snippets");

    let mut to_run: Vec<PathBuf> = vec![];
    for path in paths {
        to_run.push(path.expect("Could not read path").path())
    }

    let mut counter = 0;
    println!("\nRunning {} snippet test(s)...", to_run.len());

    while let Some(path) = to_run.pop() {
        println!("test {}: {}...", counter, path.display());

        let contents = fs::read_to_string(&path).expect("Could not read snippet");
        let (strat, template) = TestStrat::snippet(&contents);

        test_snippet(&path, strat, template);
        counter += 1;
    }

    println!("All tests passed!\n");
}
