//! The canonical collection of item sets, shared by the LR(0) and LR(1) constructions.
//!
//! States live in a single arena indexed by [`StateID`]; transitions refer to
//! their targets by id only.

use crate::{
    grammar::{Grammar, SymbolID},
    lr0::LR0Item,
    types::Map,
    util::display_fn,
};
use std::{
    collections::{BTreeSet, VecDeque},
    fmt,
    hash::Hash,
};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u32);

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StateID {
    pub const START: Self = Self(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u32 {
        self.0
    }

    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("too many states"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// An LR item: a production with a marker, plus whatever context the item kind carries.
pub trait Item: Copy + Ord + Hash + fmt::Debug {
    /// The LR(0) part of this item.
    fn core(&self) -> LR0Item;

    /// The same item with the marker moved past the next symbol.
    fn advance(&self) -> Self;

    fn fmt_item(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// An item set. Two sets are equal iff they hold the same items.
pub type ItemSet<I> = BTreeSet<I>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State<I> {
    id: StateID,
    items: ItemSet<I>,
    transitions: Map<SymbolID, StateID>,
}

impl<I: Item> State<I> {
    pub fn id(&self) -> StateID {
        self.id
    }

    pub fn items(&self) -> &ItemSet<I> {
        &self.items
    }

    /// Outgoing transitions in the order they were discovered.
    pub fn transitions(&self) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.transitions.iter().map(|(symbol, to)| (*symbol, *to))
    }

    pub fn transition(&self, symbol: SymbolID) -> Option<StateID> {
        self.transitions.get(&symbol).copied()
    }

    /// Items whose marker has reached the end of the production.
    pub fn completed_items<'s>(&'s self, g: &'s Grammar) -> impl Iterator<Item = I> + 's {
        self.items
            .iter()
            .copied()
            .filter(move |item| item.core().next_symbol(g).is_none())
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            writeln!(f, "{:?}:", self.id)?;
            for item in &self.items {
                f.write_str("  ")?;
                item.fmt_item(g, f)?;
                writeln!(f)?;
            }
            for (symbol, to) in &self.transitions {
                writeln!(f, "  {} => {:?}", g.symbol_name(*symbol), to)?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton<I> {
    states: Vec<State<I>>,
}

impl<I: Item> Automaton<I> {
    /// States in discovery order; the first one is the start state.
    pub fn states(&self) -> &[State<I>] {
        &self.states[..]
    }

    pub fn state(&self, id: StateID) -> &State<I> {
        &self.states[id.index()]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All transitions as `(from, symbol, to)`.
    pub fn edges(&self) -> impl Iterator<Item = (StateID, SymbolID, StateID)> + '_ {
        self.states.iter().flat_map(|state| {
            state
                .transitions()
                .map(move |(symbol, to)| (state.id, symbol, to))
        })
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (i, state) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                write!(f, "{}", state.display(g))?;
            }
            Ok(())
        })
    }
}

/// Group the items that can move their marker, keyed by the symbol after the marker.
///
/// The groups are the kernels of the successor states, in item order.
pub(crate) fn kernels<I: Item>(g: &Grammar, items: &ItemSet<I>) -> Map<SymbolID, ItemSet<I>> {
    let mut kernels: Map<SymbolID, ItemSet<I>> = Map::default();
    for item in items {
        if let Some(symbol) = item.core().next_symbol(g) {
            kernels.entry(symbol).or_default().insert(item.advance());
        }
    }
    kernels
}

/// `Goto(I, X)`. An empty result means there is no transition on `X`.
pub(crate) fn goto<I, F>(
    g: &Grammar,
    items: &ItemSet<I>,
    symbol: SymbolID,
    closure: F,
) -> ItemSet<I>
where
    I: Item,
    F: FnOnce(ItemSet<I>) -> ItemSet<I>,
{
    let kernel: ItemSet<I> = items
        .iter()
        .filter(|item| item.core().next_symbol(g) == Some(symbol))
        .map(Item::advance)
        .collect();
    if kernel.is_empty() {
        return kernel;
    }
    closure(kernel)
}

/// Build the canonical collection reachable from `start`, breadth first.
pub(crate) fn build<I, F>(g: &Grammar, start: ItemSet<I>, closure: F) -> Automaton<I>
where
    I: Item,
    F: Fn(ItemSet<I>) -> ItemSet<I>,
{
    let initial = closure(start);

    let mut states = vec![State {
        id: StateID::START,
        items: initial.clone(),
        transitions: Map::default(),
    }];
    let mut known = Map::<ItemSet<I>, StateID>::default();
    known.insert(initial, StateID::START);

    let mut pending = VecDeque::from([StateID::START]);
    while let Some(current) = pending.pop_front() {
        let kernels = kernels(g, &states[current.index()].items);
        for (symbol, kernel) in kernels {
            let items = closure(kernel);
            let next = match known.get(&items) {
                Some(id) => *id,
                None => {
                    let id = StateID::new(states.len());
                    tracing::trace!(
                        "{:?} --({})--> {:?} (new)",
                        current,
                        g.symbol_name(symbol),
                        id
                    );
                    known.insert(items.clone(), id);
                    states.push(State {
                        id,
                        items,
                        transitions: Map::default(),
                    });
                    pending.push_back(id);
                    id
                }
            };
            states[current.index()].transitions.insert(symbol, next);
        }
    }

    Automaton { states }
}
