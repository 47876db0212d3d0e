use warbler::{
    common::{bank::Bank, hash::Fnv1a, opcode::Instruction},
    compiler::{
        driver::Compilation,
        rule::{toggle_rule, Delimiters},
    },
    Compiler, Config, MacroHasher,
};

fn h(name: &str) -> u32 {
    Fnv1a.hash(name)
}

fn instructions(compilation: &Compilation, name: &str) -> Vec<Instruction> {
    compilation
        .bank
        .get(h(name))
        .expect("macro was not compiled")
        .instructions
        .clone()
}

fn literal<'a>(compilation: &'a Compilation, instruction: &Instruction) -> &'a str {
    match instruction {
        Instruction::AppendLiteral(index) => compilation.bank.literal(*index).expect("no literal"),
        other => panic!("expected a literal, found {:?}", other),
    }
}

#[test]
fn plain_text() {
    let text = "A line without a single directive.";
    let compilation = Compiler::new(Config::new())
        .compile([("line", text)], &[])
        .unwrap();

    let line = instructions(&compilation, "line");
    assert_eq!(line.len(), 1);
    assert_eq!(literal(&compilation, &line[0]), text);
}

#[test]
fn shared_literals() {
    let compilation = Compiler::new(Config::new())
        .compile(
            [
                ("a", "Well?(if x)Well?(endif)"),
                ("b", "Well"),
                ("c", "Hmm"),
            ],
            &[],
        )
        .unwrap();

    assert_eq!(compilation.bank.strings, vec!["Well".to_string(), "Hmm".to_string()]);
    assert_eq!(compilation.stats.reused, 2);
    assert_eq!(compilation.stats.strings, 2);
}

#[test]
fn greeting() {
    let rule = toggle_rule(&Delimiters::new('[', ']'), "friend").unwrap();
    let compilation = Compiler::new(Config::new().regex(rule))
        .compile([("greet", "Hello [friend|stranger]")], &[])
        .unwrap();

    let greet = instructions(&compilation, "greet");
    assert_eq!(greet, vec![
        Instruction::AppendLiteral(0),
        Instruction::TestMacro(h("friend")),
        Instruction::JumpIfFalse(5),
        Instruction::AppendLiteral(1),
        Instruction::Jump(6),
        Instruction::AppendLiteral(2),
    ]);
    assert_eq!(literal(&compilation, &greet[0]), "Hello ");
    assert_eq!(literal(&compilation, &greet[3]), "friend");
    assert_eq!(literal(&compilation, &greet[5]), "stranger");
}

#[test]
fn if_else_converges() {
    let compilation = Compiler::new(Config::new())
        .compile([("e", "?(if a)X?(else)Y$(y)?(endif)")], &[])
        .unwrap();

    let e = instructions(&compilation, "e");
    // the false edge lands on the first instruction of Y,
    // and the `else` jump right after the last one
    assert_eq!(e[1], Instruction::JumpIfFalse(4));
    assert_eq!(e[3], Instruction::Jump(6));
    assert_eq!(e.len(), 6);
}

#[test]
fn resolution() {
    let mut compiler = Compiler::new(Config::new());
    let undeclared = compiler.compile([("a", "$(b)")], &[]).unwrap();
    assert!(undeclared.unresolved_names.contains("b"));

    let earlier = compiler.compile([("b", "B"), ("a", "$(b)")], &[]).unwrap();
    assert!(earlier.is_resolved());

    // order matters: references are checked when they're compiled
    let later = compiler.compile([("a", "$(b)"), ("b", "B")], &[]).unwrap();
    assert!(later.unresolved_names.contains("b"));

    let mut declared = Compiler::new(Config::new().recognize("b"));
    assert!(declared.compile([("a", "$(b)")], &[]).unwrap().is_resolved());
}

#[test]
fn linked_banks() {
    let mut compiler = Compiler::new(Config::new());
    let library = compiler
        .compile([("title", "Sir"), ("name", "Robin")], &[])
        .unwrap()
        .bank;

    let linked = compiler
        .compile([("line", "$(title) #(0) $(name)?(if title)!?(endif)")], &[library])
        .unwrap();

    assert!(linked.unresolved_names.is_empty());
    assert_eq!(linked.unresolved_ids.iter().copied().collect::<Vec<_>>(), vec![0]);
    // linked banks are never merged into the output
    assert_eq!(linked.bank.macros.len(), 1);
}

#[test]
fn failed_runs_leave_nothing_behind() {
    let mut compiler = Compiler::new(Config::new());
    let error = compiler
        .compile([("fine", "ok"), ("broken", "Hello $(name")], &[])
        .unwrap_err();
    assert!(error.to_string().contains("broken"));

    let compilation = compiler.compile([("next", "ok $(fine)")], &[]).unwrap();
    assert!(compilation.unresolved_names.contains("fine"));
    assert_eq!(compilation.stats.reused, 0);
    assert_eq!(compilation.compiled, vec!["next".to_string()]);
}

#[test]
fn cooperative_matches_synchronous() {
    let entries = [("a", "one $(b)"), ("b", "one ?(if not a)two?(endif)")];

    let mut compiler = Compiler::new(Config::new());
    let synchronous = compiler.compile(entries, &[]).unwrap();

    let mut cooperative = Compilation::default();
    let names = compiler
        .steps(entries, &[], &mut cooperative)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(synchronous, cooperative);
}

#[test]
fn banks_serialize() {
    let compilation = Compiler::new(Config::new())
        .compile([("a", "x?(if b)y?(endif)")], &[])
        .unwrap();

    let json = serde_json::to_string(&compilation.bank).unwrap();
    let bank: Bank = serde_json::from_str(&json).unwrap();
    assert_eq!(bank, compilation.bank);
}
