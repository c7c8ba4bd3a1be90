//! Calculation of SLR(1) and LR(1) parse tables.
//!
//! Conflicts are not resolved. The first action written into a cell is kept
//! and every clash with it is recorded as a [`Conflict`].

use crate::{
    augment::AugmentedGrammar,
    automaton::{Automaton, Item, State, StateID},
    follow_sets::FollowSets,
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    lr0::LR0Automaton,
    lr1::LR1Automaton,
    types::Map,
    util::{display_fn, write_grid},
};
use std::fmt;

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol. An empty cell rejects the lookahead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce to the specified production rule.
    Reduce(ProductionID),

    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(to) => write!(f, "s{}", to),
            Self::Reduce(production) => write!(f, "r{}", production),
            Self::Accept => f.write_str("acc"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableKind {
    SLR,
    LR1,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SLR => f.write_str("SLR(1)"),
            Self::LR1 => f.write_str("LR(1)"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    /// Accept competing with a shift or a reduction.
    Accept,
}

impl ConflictKind {
    fn between(kept: Action, rejected: Action) -> Self {
        use Action::*;
        match (kept, rejected) {
            (Accept, _) | (_, Accept) => Self::Accept,
            (Shift(..), Reduce(..)) | (Reduce(..), Shift(..)) => Self::ShiftReduce,
            (Reduce(..), Reduce(..)) => Self::ReduceReduce,
            // Transitions are unique per symbol.
            (Shift(..), Shift(..)) => unreachable!("shift/shift conflict"),
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftReduce => f.write_str("shift-reduce"),
            Self::ReduceReduce => f.write_str("reduce-reduce"),
            Self::Accept => f.write_str("accept"),
        }
    }
}

/// A table cell that was claimed by two incompatible actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateID,
    pub symbol: TerminalID,
    pub kind: ConflictKind,
    /// The action that stays in the cell.
    pub kept: Action,
    pub rejected: Action,
    pub description: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseTableRow {
    pub actions: Map<TerminalID, Action>,
    pub gotos: Map<NonterminalID, StateID>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    kind: TableKind,
    states: Map<StateID, ParseTableRow>,
    conflicts: Vec<Conflict>,
    hidden_nonterminal: Option<NonterminalID>,
}

impl ParseTable {
    /// Fill the SLR(1) table: reductions on every symbol of `Follow(A)`.
    ///
    /// `follow` must be computed on the augmented grammar.
    pub fn slr(aug: &AugmentedGrammar, lr0: &LR0Automaton, follow: &FollowSets) -> Self {
        let g = aug.grammar();
        let mut builder = TableBuilder::new(TableKind::SLR, aug);
        for state in lr0.states() {
            builder.transitions(state);
            for item in state.completed_items(g) {
                if item.production == aug.accept() {
                    builder.action(state.id(), TerminalID::EOI, Action::Accept);
                    continue;
                }
                let left = g.production(item.production).left();
                for lookahead in follow.get(left).iter() {
                    builder.action(state.id(), lookahead, Action::Reduce(item.production));
                }
            }
        }
        builder.finish(lr0)
    }

    /// Fill the canonical LR(1) table: reductions on the item's own lookahead only.
    pub fn lr1(aug: &AugmentedGrammar, lr1: &LR1Automaton) -> Self {
        let g = aug.grammar();
        let mut builder = TableBuilder::new(TableKind::LR1, aug);
        for state in lr1.states() {
            builder.transitions(state);
            for item in state.completed_items(g) {
                if item.production == aug.accept() && item.lookahead == TerminalID::EOI {
                    builder.action(state.id(), TerminalID::EOI, Action::Accept);
                } else {
                    let reduce = Action::Reduce(item.production);
                    builder.action(state.id(), item.lookahead, reduce);
                }
            }
        }
        builder.finish(lr1)
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn rows(&self) -> impl Iterator<Item = (StateID, &ParseTableRow)> + '_ {
        self.states.iter().map(|(id, row)| (*id, row))
    }

    pub fn row(&self, state: StateID) -> Option<&ParseTableRow> {
        self.states.get(&state)
    }

    pub fn action(&self, state: StateID, symbol: TerminalID) -> Option<Action> {
        self.states.get(&state)?.actions.get(&symbol).copied()
    }

    pub fn goto(&self, state: StateID, symbol: NonterminalID) -> Option<StateID> {
        self.states.get(&state)?.gotos.get(&symbol).copied()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts[..]
    }

    /// Whether the grammar is SLR(1) or LR(1), depending on the table kind.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Action columns: the terminals and the end marker, sorted by name.
    pub fn action_columns(&self, g: &Grammar) -> Vec<TerminalID> {
        let mut columns: Vec<TerminalID> = Some(TerminalID::EOI)
            .into_iter()
            .chain(g.terminals().map(|(id, _)| id))
            .collect();
        columns.sort_by(|a, b| g.terminal_name(*a).cmp(g.terminal_name(*b)));
        columns
    }

    /// Goto columns: the nonterminals sorted by name, without a synthesized start symbol.
    ///
    /// A start symbol recognized as an existing augmenting production keeps its
    /// column, since the grammar may also use it on a right-hand side.
    pub fn goto_columns(&self, g: &Grammar) -> Vec<NonterminalID> {
        let mut columns: Vec<NonterminalID> = g
            .nonterminals()
            .map(|(id, _)| id)
            .filter(|id| Some(*id) != self.hidden_nonterminal)
            .collect();
        columns.sort_by(|a, b| g.nonterminal_name(*a).cmp(g.nonterminal_name(*b)));
        columns
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let action_columns = self.action_columns(g);
            let goto_columns = self.goto_columns(g);

            let mut header = vec!["state".to_owned()];
            header.extend(action_columns.iter().map(|t| g.terminal_name(*t).to_owned()));
            header.extend(goto_columns.iter().map(|n| g.nonterminal_name(*n).to_owned()));

            let mut rows = vec![header];
            for (id, row) in self.rows() {
                let mut cells = vec![id.to_string()];
                cells.extend(action_columns.iter().map(|t| {
                    row.actions
                        .get(t)
                        .map_or_else(String::new, |action| action.to_string())
                }));
                cells.extend(goto_columns.iter().map(|n| {
                    row.gotos
                        .get(n)
                        .map_or_else(String::new, |to| to.to_string())
                }));
                rows.push(cells);
            }
            write_grid(f, &rows)
        })
    }
}

struct TableBuilder<'g> {
    kind: TableKind,
    g: &'g Grammar,
    hidden_nonterminal: Option<NonterminalID>,
    states: Map<StateID, ParseTableRow>,
    conflicts: Vec<Conflict>,
}

impl<'g> TableBuilder<'g> {
    fn new(kind: TableKind, aug: &'g AugmentedGrammar) -> Self {
        Self {
            kind,
            g: aug.grammar(),
            hidden_nonterminal: aug.is_synthesized().then(|| aug.start_symbol()),
            states: Map::default(),
            conflicts: vec![],
        }
    }

    /// shift, goto
    fn transitions<I: Item>(&mut self, state: &State<I>) {
        self.states.entry(state.id()).or_default();
        for (symbol, to) in state.transitions() {
            match symbol {
                SymbolID::T(t) => self.action(state.id(), t, Action::Shift(to)),
                SymbolID::N(n) => {
                    self.states[&state.id()].gotos.insert(n, to);
                }
            }
        }
    }

    /// reduce, accept
    fn action(&mut self, state: StateID, symbol: TerminalID, action: Action) {
        let row = self.states.entry(state).or_default();
        let kept = match row.actions.get(&symbol) {
            None => {
                row.actions.insert(symbol, action);
                return;
            }
            Some(kept) if *kept == action => return,
            Some(kept) => *kept,
        };

        let kind = ConflictKind::between(kept, action);
        let description = format!(
            "state {}, symbol {}: {} conflict (kept {}, rejected {})",
            state,
            self.g.terminal_name(symbol),
            kind,
            kept,
            action
        );
        tracing::debug!("{}: {}", self.kind, description);
        self.conflicts.push(Conflict {
            state,
            symbol,
            kind,
            kept,
            rejected: action,
            description,
        });
    }

    fn finish<I: Item>(self, automaton: &Automaton<I>) -> ParseTable {
        debug_assert_eq!(self.states.len(), automaton.len());
        tracing::debug!(
            "{} table: {} state(s), {} conflict(s)",
            self.kind,
            self.states.len(),
            self.conflicts.len()
        );
        ParseTable {
            kind: self.kind,
            states: self.states,
            conflicts: self.conflicts,
            hidden_nonterminal: self.hidden_nonterminal,
        }
    }
}
