use lrlab::{
    first_sets::FirstSet,
    grammar::{NonterminalID, SymbolID},
    lr0, lr1, Analyzer, Grammar,
};
use std::{collections::BTreeSet, env, fs, path::PathBuf};

const FIXTURES: &[&str] = &[
    "expr",
    "ll_expr",
    "cc",
    "epsilon",
    "augmented",
    "lvalue",
    "dangling_else",
    "reduce_reduce",
];

fn fixtures() -> impl Iterator<Item = (&'static str, Grammar)> {
    let root = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()).join("tests/grammars");
    FIXTURES.iter().map(move |name| {
        let source = fs::read_to_string(root.join(format!("{}.txt", name))).unwrap();
        (*name, source.parse().unwrap())
    })
}

/// Nonterminals that derive the empty string, by brute-force iteration.
fn nullable(g: &Grammar) -> BTreeSet<NonterminalID> {
    let mut nullable = BTreeSet::new();
    loop {
        let before = nullable.len();
        for production in g.productions() {
            let all_nullable = production.right().iter().all(|symbol| match symbol {
                SymbolID::N(n) => nullable.contains(n),
                SymbolID::T(..) => false,
            });
            if all_nullable {
                nullable.insert(production.left());
            }
        }
        if nullable.len() == before {
            return nullable;
        }
    }
}

#[test]
fn nullable_iff_derives_epsilon() {
    for (name, g) in fixtures() {
        let analyzer = Analyzer::new(&g);
        let expected = nullable(&g);
        for (n, first) in analyzer.first_sets().iter() {
            let message = format!("{}: {}", name, g.nonterminal_name(n));
            assert_eq!(first.nullable, expected.contains(&n), "{}", message);
        }
    }
}

#[test]
fn first_of_empty_sequence_is_epsilon() {
    for (_, g) in fixtures() {
        let analyzer = Analyzer::new(&g);
        let first = analyzer.first_sets().sequence(&[]);
        assert_eq!(first, FirstSet::epsilon());
    }
}

#[test]
fn closures_are_fixed_points() {
    for (name, g) in fixtures() {
        let analyzer = Analyzer::new(&g);
        let aug = analyzer.augmented().grammar();
        let first = analyzer.augmented_first_sets();

        for state in analyzer.slr().automaton.states() {
            let items = state.items().clone();
            assert_eq!(lr0::closure(aug, items.clone()), items, "{}", name);
        }
        for state in analyzer.lr1().automaton.states() {
            let items = state.items().clone();
            assert_eq!(lr1::closure(aug, first, items.clone()), items, "{}", name);
        }
    }
}

#[test]
fn transitions_agree_with_goto() {
    for (name, g) in fixtures() {
        let analyzer = Analyzer::new(&g);
        let aug = analyzer.augmented().grammar();
        let first = analyzer.augmented_first_sets();

        let automaton = analyzer.lr1().automaton;
        for (from, symbol, to) in automaton.edges() {
            let items = lr1::goto(aug, first, automaton.state(from).items(), symbol);
            assert_eq!(&items, automaton.state(to).items(), "{}", name);
        }

        let distinct: BTreeSet<_> = automaton.states().iter().map(|s| s.items()).collect();
        assert_eq!(distinct.len(), automaton.len(), "{}: duplicated states", name);
    }
}

#[test]
fn rebuilding_is_deterministic() {
    for (name, g) in fixtures() {
        let a = Analyzer::new(&g);
        let b = Analyzer::new(&g);

        let (slr_a, slr_b) = (a.slr(), b.slr());
        assert_eq!(slr_a.automaton, slr_b.automaton, "{}", name);
        assert_eq!(slr_a.table, slr_b.table, "{}", name);
        assert_eq!(slr_a.table.conflicts(), slr_b.table.conflicts(), "{}", name);

        let (lr1_a, lr1_b) = (a.lr1(), b.lr1());
        assert_eq!(lr1_a.automaton, lr1_b.automaton, "{}", name);
        assert_eq!(lr1_a.table, lr1_b.table, "{}", name);
    }
}
