use std::{env, fs, path::PathBuf};

use criterion::{criterion_group, criterion_main, Criterion};
use lrlab::{
    augment::AugmentedGrammar, first_sets::FirstSets, follow_sets::FollowSets, lr0::LR0Automaton,
    lr1::LR1Automaton, Analyzer, Grammar, ParseTable,
};

criterion_main!(benches);
criterion_group!(benches, bench_expressions, bench_small);

fn bench_expressions(c: &mut Criterion) {
    bench_tables(c, "expr");
    bench_tables(c, "ll_expr");
}

fn bench_small(c: &mut Criterion) {
    bench_tables(c, "cc");
    bench_tables(c, "epsilon");
    bench_tables(c, "lvalue");
    bench_tables(c, "dangling_else");
}

fn bench_tables(c: &mut Criterion, grammar_name: &str) {
    let project_root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("missing environment variable: `CARGO_MANIFEST_DIR'");
    let source =
        fs::read_to_string(project_root.join(format!("tests/grammars/{}.txt", grammar_name)))
            .unwrap();
    let grammar: Grammar = source.parse().unwrap();
    let aug = AugmentedGrammar::new(&grammar);

    let mut group = c.benchmark_group(grammar_name);
    group.bench_function("FIRST/FOLLOW", |b| {
        b.iter(|| {
            let first = FirstSets::compute(&grammar);
            FollowSets::compute(&grammar, &first)
        });
    });
    group.bench_function("SLR(1)", |b| {
        b.iter(|| {
            let first = FirstSets::compute(aug.grammar());
            let follow = FollowSets::compute(aug.grammar(), &first);
            let lr0 = LR0Automaton::build(&aug);
            ParseTable::slr(&aug, &lr0, &follow)
        });
    });
    group.bench_function("LR(1)", |b| {
        b.iter(|| {
            let lr1 = LR1Automaton::build(&aug);
            ParseTable::lr1(&aug, &lr1)
        });
    });
    group.bench_function("Analyzer", |b| {
        b.iter(|| {
            let analyzer = Analyzer::new(&grammar);
            (analyzer.slr(), analyzer.lr1())
        });
    });
    group.finish();
}
