//! Calculation of first set function.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID, EPSILON},
    types::{Map, TerminalSet},
    util::display_fn,
};
use std::fmt;

/// `First(X)` of a symbol or a sequence of symbols.
///
/// Epsilon is not a terminal, so its membership is tracked by `nullable`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: TerminalSet,
    pub nullable: bool,
}

impl FirstSet {
    /// `First(@) = {@}`
    pub fn epsilon() -> Self {
        Self {
            terminals: TerminalSet::default(),
            nullable: true,
        }
    }

    pub fn terminal(t: TerminalID) -> Self {
        Self {
            terminals: Some(t).into_iter().collect(),
            nullable: false,
        }
    }

    pub fn contains(&self, t: TerminalID) -> bool {
        self.terminals.contains(t)
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let mut symbols = self.terminals.iter().map(|t| g.terminal_name(t));
            if let Some(first) = symbols.next() {
                f.write_str(first)?;
                for symbol in symbols {
                    write!(f, " {}", symbol)?;
                }
                if self.nullable {
                    write!(f, " {}", EPSILON)?;
                }
            } else if self.nullable {
                f.write_str(EPSILON)?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    map: Map<NonterminalID, FirstSet>,
}

impl FirstSets {
    pub fn compute(g: &Grammar) -> Self {
        // First(A) = {} for every nonterminal; terminals are answered on the fly.
        let mut map: Map<NonterminalID, FirstSet> = g
            .nonterminals()
            .map(|(id, _)| (id, FirstSet::default()))
            .collect();

        // Every round either grows some set or ends the loop, and the sets are
        // bounded by the terminal alphabet.
        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;

            for production in g.productions() {
                let mut added = TerminalSet::default();
                let mut nullable = true;
                for symbol in production.right() {
                    match symbol {
                        SymbolID::T(t) => {
                            added.insert(*t);
                            nullable = false;
                        }
                        SymbolID::N(n) => {
                            let first = &map[n];
                            added.union_with(&first.terminals);
                            nullable = first.nullable;
                        }
                    }
                    if !nullable {
                        break;
                    }
                }

                let first = &mut map[&production.left()];
                changed |= first.terminals.union_with(&added);
                if nullable && !first.nullable {
                    first.nullable = true;
                    changed = true;
                }
            }
        }
        tracing::debug!("first sets: converged after {} round(s)", rounds);

        Self { map }
    }

    pub fn nonterminal(&self, n: NonterminalID) -> &FirstSet {
        &self.map[&n]
    }

    pub fn symbol(&self, symbol: SymbolID) -> FirstSet {
        match symbol {
            SymbolID::T(t) => FirstSet::terminal(t),
            SymbolID::N(n) => self.nonterminal(n).clone(),
        }
    }

    /// `First(X1 X2 ... Xn)`
    ///
    /// The result is nullable iff every `Xi` is nullable, which includes the empty sequence.
    pub fn sequence(&self, symbols: &[SymbolID]) -> FirstSet {
        let mut res = FirstSet::epsilon();
        for symbol in symbols {
            match symbol {
                SymbolID::T(t) => {
                    res.terminals.insert(*t);
                    res.nullable = false;
                }
                SymbolID::N(n) => {
                    let first = self.nonterminal(*n);
                    res.terminals.union_with(&first.terminals);
                    res.nullable = first.nullable;
                }
            }
            if !res.nullable {
                break;
            }
        }
        res
    }

    /// `First(prefix lookahead)`
    ///
    /// Since `lookahead` is a terminal, the result never contains epsilon.
    pub fn sequence_then(&self, prefix: &[SymbolID], lookahead: TerminalID) -> TerminalSet {
        let FirstSet {
            mut terminals,
            nullable,
        } = self.sequence(prefix);
        if nullable {
            terminals.insert(lookahead);
        }
        terminals
    }

    pub fn iter(&self) -> impl Iterator<Item = (NonterminalID, &FirstSet)> + '_ {
        self.map.iter().map(|(n, first)| (*n, first))
    }

    /// One line per nonterminal: `E : ( id`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (n, first) in self.iter() {
                writeln!(f, "{} : {}", g.nonterminal_name(n), first.display(g))?;
            }
            Ok(())
        })
    }
}
