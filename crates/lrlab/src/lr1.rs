//! The canonical collection of LR(1) item sets.
//!
//! Unlike LALR or PGM-style constructions, states are never merged: two item
//! sets with the same cores but different lookaheads are different states.

use crate::{
    augment::AugmentedGrammar,
    automaton::{self, Automaton, Item, ItemSet, State},
    first_sets::FirstSets,
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    lr0::{self, LR0Item},
    util::display_fn,
};
use std::fmt;

/// LR(1) item
///
/// An LR(0) item paired with a single lookahead symbol. Ordered by production,
/// marker position and then lookahead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR1Item {
    pub production: ProductionID,
    pub dot: usize,
    pub lookahead: TerminalID,
}

impl LR1Item {
    pub const fn new(production: ProductionID, dot: usize, lookahead: TerminalID) -> Self {
        Self {
            production,
            dot,
            lookahead,
        }
    }

    /// `[E -> E · + T, #]`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| self.fmt_item(g, f))
    }
}

impl Item for LR1Item {
    fn core(&self) -> LR0Item {
        LR0Item::new(self.production, self.dot)
    }

    fn advance(&self) -> Self {
        Self {
            dot: self.dot + 1,
            ..*self
        }
    }

    fn fmt_item(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        lr0::fmt_core(&self.core(), g, f)?;
        write!(f, ", {}]", g.terminal_name(self.lookahead))
    }
}

pub type LR1State = State<LR1Item>;
pub type LR1Automaton = Automaton<LR1Item>;

/// `Closure(I)`
///
/// For `[A -> alpha · B beta, a]`, add `[B -> · gamma, b]` for every `b` in `First(beta a)`.
pub fn closure(g: &Grammar, first: &FirstSets, mut items: ItemSet<LR1Item>) -> ItemSet<LR1Item> {
    let mut pending: Vec<LR1Item> = items.iter().copied().collect();
    while let Some(item) = pending.pop() {
        let production = g.production(item.production);

        // [A -> ... · B beta, a]
        //  B: one nonterminal symbol
        let (b, beta) = match &production.right()[item.dot..] {
            [SymbolID::N(b), beta @ ..] => (*b, beta),
            _ => continue,
        };

        let lookaheads = first.sequence_then(beta, item.lookahead);
        for &production in g.productions_of(b) {
            for lookahead in lookaheads.iter() {
                let new_item = LR1Item::new(production, 0, lookahead);
                if items.insert(new_item) {
                    pending.push(new_item);
                }
            }
        }
    }
    items
}

/// `Goto(I, X)`. Lookaheads are carried over unchanged.
pub fn goto(
    g: &Grammar,
    first: &FirstSets,
    items: &ItemSet<LR1Item>,
    symbol: SymbolID,
) -> ItemSet<LR1Item> {
    automaton::goto(g, items, symbol, |kernel| closure(g, first, kernel))
}

impl Automaton<LR1Item> {
    /// Calculate the canonical LR(1) automaton of the specified grammar.
    pub fn build(aug: &AugmentedGrammar) -> Self {
        let first = FirstSets::compute(aug.grammar());
        Self::build_with_first_sets(aug, &first)
    }

    /// Same as [`build`](Self::build), reusing first sets of the augmented grammar.
    pub fn build_with_first_sets(aug: &AugmentedGrammar, first: &FirstSets) -> Self {
        let g = aug.grammar();
        let start = Some(LR1Item::new(aug.accept(), 0, TerminalID::EOI))
            .into_iter()
            .collect();
        let automaton = automaton::build(g, start, |kernel| closure(g, first, kernel));
        tracing::debug!(
            "LR(1) automaton: {} state(s), {} transition(s)",
            automaton.len(),
            automaton.edges().count()
        );
        automaton
    }
}
