use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use lrlab::{augment::Config, table::TableKind, Analyzer, Grammar, ParseTable};
use std::{
    fs,
    io::{self, Write as _},
    path::PathBuf,
    time::Instant,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What to print.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Always add a fresh start production, even if the grammar looks augmented.
    #[arg(long)]
    no_detect_augmented: bool,

    /// Fail if any generated table has conflicts.
    #[arg(long)]
    deny_conflicts: bool,

    /// The path of grammar definition file.
    input: PathBuf,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Mode {
    /// FIRST and FOLLOW sets.
    FirstFollow,
    /// The LR(0) item sets.
    Lr0,
    /// The LR(0) item sets and the SLR(1) table.
    Slr,
    /// The LR(1) item sets and the LR(1) table.
    Lr1,
    All,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    process_file(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.input.display()))?;

    Ok(())
}

fn process_file(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.input) //
        .context("failed to read the grammar file")?;

    let s = Instant::now();
    let grammar: Grammar = source.parse()?;
    tracing::info!("parse: {:?} elapsed", s.elapsed());

    let mut config = Config::new();
    config.detect_augmented(!args.no_detect_augmented);

    let s = Instant::now();
    let analyzer = Analyzer::with_config(&grammar, &config);
    tracing::info!("first/follow: {:?} elapsed", s.elapsed());

    let mut out = io::stdout().lock();
    let conflicting = write_report(&mut out, args.mode, &analyzer)?;
    out.flush()?;

    if args.deny_conflicts && !conflicting.is_empty() {
        let kinds: Vec<String> = conflicting.iter().map(ToString::to_string).collect();
        anyhow::bail!("the grammar is not {}", kinds.join(" nor "));
    }

    Ok(())
}

/// Print the sections selected by `mode`. Returns the kinds of the tables that have conflicts.
fn write_report(
    out: &mut impl io::Write,
    mode: Mode,
    analyzer: &Analyzer,
) -> io::Result<Vec<TableKind>> {
    let grammar = analyzer.grammar();
    let augmented = analyzer.augmented();
    let mut conflicting = vec![];

    // Item sets and tables refer to the augmented grammar's symbols and production ids.
    writeln!(out, "## grammar\n{}", augmented.grammar())?;
    writeln!(
        out,
        "accepting production: {}: {}\n",
        augmented.accept(),
        augmented
            .grammar()
            .production(augmented.accept())
            .display(augmented.grammar())
    )?;

    if matches!(mode, Mode::FirstFollow | Mode::All) {
        writeln!(out, "## FIRST\n{}", analyzer.first_sets().display(grammar))?;
        writeln!(out, "## FOLLOW\n{}", analyzer.follow_sets().display(grammar))?;
    }

    let g = augmented.grammar();

    if matches!(mode, Mode::Lr0 | Mode::Slr | Mode::All) {
        let s = Instant::now();
        let slr = analyzer.slr();
        tracing::info!("slr: {:?} elapsed", s.elapsed());

        writeln!(out, "## LR(0) item sets\n{}", slr.automaton.display(g))?;
        if mode != Mode::Lr0 {
            write_table(out, g, &slr.table)?;
            if !slr.table.is_conflict_free() {
                conflicting.push(slr.table.kind());
            }
        }
    }

    if matches!(mode, Mode::Lr1 | Mode::All) {
        let s = Instant::now();
        let lr1 = analyzer.lr1();
        tracing::info!("lr1: {:?} elapsed", s.elapsed());

        writeln!(out, "## LR(1) item sets\n{}", lr1.automaton.display(g))?;
        write_table(out, g, &lr1.table)?;
        if !lr1.table.is_conflict_free() {
            conflicting.push(lr1.table.kind());
        }
    }

    Ok(conflicting)
}

fn write_table(out: &mut impl io::Write, g: &Grammar, table: &ParseTable) -> io::Result<()> {
    writeln!(out, "## {} table\n{}", table.kind(), table.display(g))?;
    if table.is_conflict_free() {
        writeln!(out, "The grammar is {}.", table.kind())?;
    } else {
        let conflicts = table.conflicts();
        let suffix = if conflicts.len() == 1 { "" } else { "s" };
        writeln!(out, "[warning] {} conflict{}:", conflicts.len(), suffix)?;
        for conflict in conflicts {
            writeln!(out, "  {}", conflict)?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(source: &str, mode: Mode) -> (String, Vec<TableKind>) {
        let grammar: Grammar = source.parse().unwrap();
        let analyzer = Analyzer::new(&grammar);
        let mut out = vec![];
        let conflicting = write_report(&mut out, mode, &analyzer).unwrap();
        (String::from_utf8(out).unwrap(), conflicting)
    }

    #[test]
    fn grammar_section_lists_the_augmenting_production() {
        let (out, conflicting) = report("S -> C C\nC -> c C | d", Mode::Slr);
        assert!(conflicting.is_empty());
        // `S' -> S` is production 3; the table reduces by ids of the same listing.
        assert!(out.contains("3: S' -> S\n"));
        assert!(out.contains("S' (start)\n"));
        assert!(out.contains("accepting production: 3: S' -> S\n"));
        assert!(out.contains("r2"));
        assert!(!out.contains("## FIRST"));
    }

    #[test]
    fn conflicting_tables_are_reported() {
        let source = "S -> if E then S | if E then S else S | other";
        let (out, conflicting) = report(source, Mode::All);
        assert_eq!(conflicting, [TableKind::SLR, TableKind::LR1]);
        assert!(out.contains("## FOLLOW\nS : # else\n"));
        assert!(out.contains("[warning] 1 conflict:"));
    }
}
