//! The canonical collection of LR(0) item sets.

use crate::{
    augment::AugmentedGrammar,
    automaton::{self, Automaton, Item, ItemSet, State},
    grammar::{Grammar, ProductionID, SymbolID},
    util::display_fn,
};
use std::fmt;

/// The LR(0) item, a.k.a. LR item core.
///
/// Ordered by production first, then by marker position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item {
    pub production: ProductionID,
    pub dot: usize,
}

impl LR0Item {
    pub const fn new(production: ProductionID, dot: usize) -> Self {
        Self { production, dot }
    }

    /// The symbol right after the marker, if any.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production).right().get(self.dot).copied()
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        self.next_symbol(g).is_none()
    }

    /// `E -> E · + T`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| fmt_core(self, g, f))
    }
}

pub(crate) fn fmt_core(item: &LR0Item, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let production = g.production(item.production);
    write!(f, "{} ->", g.nonterminal_name(production.left()))?;
    for (i, symbol) in production.right().iter().enumerate() {
        if i == item.dot {
            f.write_str(" ·")?;
        }
        write!(f, " {}", g.symbol_name(*symbol))?;
    }
    if item.dot == production.right().len() {
        f.write_str(" ·")?;
    }
    Ok(())
}

impl Item for LR0Item {
    fn core(&self) -> LR0Item {
        *self
    }

    fn advance(&self) -> Self {
        Self {
            dot: self.dot + 1,
            ..*self
        }
    }

    fn fmt_item(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_core(self, g, f)
    }
}

pub type LR0State = State<LR0Item>;
pub type LR0Automaton = Automaton<LR0Item>;

/// `Closure(I)`: add `[B -> · gamma]` for every item `[A -> alpha · B beta]`.
pub fn closure(g: &Grammar, mut items: ItemSet<LR0Item>) -> ItemSet<LR0Item> {
    let mut pending: Vec<LR0Item> = items.iter().copied().collect();
    while let Some(item) = pending.pop() {
        let b = match item.next_symbol(g) {
            Some(SymbolID::N(b)) => b,
            _ => continue,
        };
        for &production in g.productions_of(b) {
            let new_item = LR0Item::new(production, 0);
            if items.insert(new_item) {
                pending.push(new_item);
            }
        }
    }
    items
}

/// `Goto(I, X)`. Returns an empty set if no item in `items` expects `symbol`.
pub fn goto(g: &Grammar, items: &ItemSet<LR0Item>, symbol: SymbolID) -> ItemSet<LR0Item> {
    automaton::goto(g, items, symbol, |kernel| closure(g, kernel))
}

impl Automaton<LR0Item> {
    /// Calculate the LR(0) automaton of the specified grammar.
    pub fn build(aug: &AugmentedGrammar) -> Self {
        let g = aug.grammar();
        let start = Some(LR0Item::new(aug.accept(), 0)).into_iter().collect();
        let automaton = automaton::build(g, start, |kernel| closure(g, kernel));
        tracing::debug!(
            "LR(0) automaton: {} state(s), {} transition(s)",
            automaton.len(),
            automaton.edges().count()
        );
        automaton
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression_grammar() -> AugmentedGrammar {
        let g = Grammar::parse(
            "E -> E + T | T\n\
             T -> T * F | F\n\
             F -> ( E ) | id",
        )
        .unwrap();
        AugmentedGrammar::new(&g)
    }

    fn rendered(g: &Grammar, items: &ItemSet<LR0Item>) -> Vec<String> {
        items.iter().map(|item| item.display(g).to_string()).collect()
    }

    #[test]
    fn closure_of_start_item() {
        let aug = expression_grammar();
        let g = aug.grammar();
        let start = Some(LR0Item::new(aug.accept(), 0)).into_iter().collect();
        assert_eq!(
            rendered(g, &closure(g, start)),
            [
                "E -> · E + T",
                "E -> · T",
                "T -> · T * F",
                "T -> · F",
                "F -> · ( E )",
                "F -> · id",
                "E' -> · E",
            ]
        );
    }

    #[test]
    fn expression_grammar_automaton() {
        let aug = expression_grammar();
        let g = aug.grammar();
        let lr0 = LR0Automaton::build(&aug);
        eprintln!("{}", lr0.display(g));

        assert_eq!(lr0.len(), 12);

        let e = g.symbol("E").unwrap();
        let plus = g.symbol("+").unwrap();
        let i1 = lr0.states()[0].transition(e).unwrap();
        assert_eq!(
            rendered(g, lr0.state(i1).items()),
            ["E -> E · + T", "E' -> E ·"]
        );
        assert!(lr0.state(i1).transition(plus).is_some());
    }

    #[test]
    fn goto_reproduces_known_states() {
        let aug = expression_grammar();
        let g = aug.grammar();
        let lr0 = LR0Automaton::build(&aug);

        for (from, symbol, to) in lr0.edges() {
            let items = goto(g, lr0.state(from).items(), symbol);
            assert_eq!(&items, lr0.state(to).items());
        }

        let states = lr0.states();
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(a.items(), b.items());
            }
        }
    }

    #[test]
    fn goto_on_unexpected_symbol_is_empty() {
        let aug = expression_grammar();
        let g = aug.grammar();
        let lr0 = LR0Automaton::build(&aug);
        let rparen = g.symbol(")").unwrap();
        assert!(goto(g, lr0.states()[0].items(), rparen).is_empty());
    }

    #[test]
    fn epsilon_items_are_complete() {
        let g = Grammar::parse("S -> A b\nA -> @").unwrap();
        let aug = AugmentedGrammar::new(&g);
        let g = aug.grammar();
        let lr0 = LR0Automaton::build(&aug);

        let item = LR0Item::new(ProductionID::from_raw(1), 0);
        assert!(item.is_complete(g));
        assert_eq!(item.display(g).to_string(), "A -> ·");
        assert!(lr0.states()[0].items().contains(&item));
    }
}
