//! Calculation of follow set function.

use crate::{
    first_sets::FirstSets,
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID},
    types::{Map, TerminalSet},
    util::display_fn,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    map: Map<NonterminalID, TerminalSet>,
}

impl FollowSets {
    pub fn compute(g: &Grammar, first: &FirstSets) -> Self {
        let mut map: Map<NonterminalID, TerminalSet> = g
            .nonterminals()
            .map(|(id, _)| (id, TerminalSet::default()))
            .collect();
        map[&g.start_symbol()].insert(TerminalID::EOI);

        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;

            for production in g.productions() {
                let right = production.right();
                for (i, symbol) in right.iter().enumerate() {
                    let b = match symbol {
                        SymbolID::N(b) => *b,
                        SymbolID::T(..) => continue,
                    };

                    // A -> alpha B beta
                    let beta = first.sequence(&right[i + 1..]);
                    let mut added = beta.terminals;
                    if beta.nullable {
                        added.union_with(&map[&production.left()]);
                    }
                    changed |= map[&b].union_with(&added);
                }
            }
        }
        tracing::debug!("follow sets: converged after {} round(s)", rounds);

        Self { map }
    }

    pub fn get(&self, n: NonterminalID) -> &TerminalSet {
        &self.map[&n]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NonterminalID, &TerminalSet)> + '_ {
        self.map.iter().map(|(n, follow)| (*n, follow))
    }

    /// One line per nonterminal: `E : # ) +`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (n, follow) in self.iter() {
                write!(f, "{} :", g.nonterminal_name(n))?;
                for t in follow.iter() {
                    write!(f, " {}", g.terminal_name(t))?;
                }
                writeln!(f)?;
            }
            Ok(())
        })
    }
}
