//! Grammar types.

use crate::{
    syntax::{self, SyntaxError},
    types::Map,
    util::display_fn,
};
use indexmap::map::Entry;
use std::{fmt, str::FromStr};

/// The reserved name of the empty string.
pub const EPSILON: &str = "@";

/// The reserved name of the end-of-input marker.
pub const END_MARKER: &str = "#";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}

impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::from_raw(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}

impl NonterminalID {
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }

    #[inline]
    fn index(self) -> usize {
        self.raw.into()
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
}

impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    ///
    /// The slice is empty for an epsilon production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }

    // `"LHS -> R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} ->", g.nonterminal_name(self.left))?;
            if self.right.is_empty() {
                return write!(f, " {}", EPSILON);
            }
            for symbol in &self.right {
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables.
///
/// A `Grammar` is immutable once built. Terminal symbols are never declared:
/// every right-hand side symbol that is not the left-hand side of some
/// production is a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    terminals: Map<TerminalID, String>,
    nonterminals: Map<NonterminalID, String>,
    productions: Vec<Production>,
    productions_by_left: Map<NonterminalID, Vec<ProductionID>>,
    start_symbol: NonterminalID,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for (_, name) in self.terminals() {
            writeln!(f, "{}", name)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for (id, name) in self.nonterminals() {
            write!(f, "{}", name)?;
            if id == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in &self.productions {
            writeln!(f, "{}: {}", production.id, production.display(self))?;
        }

        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl Grammar {
    /// Build a grammar from its textual notation. See [`crate::syntax`].
    pub fn parse(source: &str) -> Result<Grammar, GrammarError> {
        let grammar = syntax::parse(source)?;
        Grammar::define(|g| {
            for rule in grammar.rules {
                for production in rule.productions {
                    g.rule(&rule.left, production.elems)?;
                }
            }
            Ok(())
        })
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef { rules: vec![] };
        f(&mut def)?;
        def.end()
    }

    pub fn start_symbol(&self) -> NonterminalID {
        self.start_symbol
    }

    /// Iterate over the terminal symbols, excluding the end marker.
    pub fn terminals(&self) -> impl Iterator<Item = (TerminalID, &str)> + '_ {
        self.terminals
            .iter()
            .filter(|(id, _)| **id != TerminalID::EOI)
            .map(|(id, name)| (*id, name.as_str()))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &str)> + '_ {
        self.nonterminals
            .iter()
            .map(|(id, name)| (*id, name.as_str()))
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> + '_ {
        self.productions.iter()
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[id.index()]
    }

    /// Return the productions whose left-hand side is `left`, in definition order.
    pub fn productions_of(&self, left: NonterminalID) -> &[ProductionID] {
        self.productions_by_left
            .get(&left)
            .map_or(&[][..], |ids| &ids[..])
    }

    pub fn terminal_name(&self, id: TerminalID) -> &str {
        &self.terminals[&id]
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> &str {
        &self.nonterminals[&id]
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminal_name(t),
            SymbolID::N(n) => self.nonterminal_name(n),
        }
    }

    /// Look up a symbol by name. The end marker `#` resolves to [`TerminalID::EOI`].
    pub fn symbol(&self, name: &str) -> Option<SymbolID> {
        self.nonterminal(name)
            .map(SymbolID::N)
            .or_else(|| self.terminal(name).map(SymbolID::T))
    }

    pub fn terminal(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .iter()
            .find_map(|(id, n)| (n == name).then_some(*id))
    }

    pub fn nonterminal(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .iter()
            .find_map(|(id, n)| (n == name).then_some(*id))
    }

    pub(crate) fn add_nonterminal(
        &mut self,
        name: String,
    ) -> Result<NonterminalID, GrammarError> {
        let raw = reserve_raw(self.nonterminals.len(), "nonterminals")?;
        let id = NonterminalID::from_raw(raw);
        self.nonterminals.insert(id, name);
        Ok(id)
    }

    pub(crate) fn add_production(
        &mut self,
        left: NonterminalID,
        right: Vec<SymbolID>,
    ) -> Result<ProductionID, GrammarError> {
        let raw = reserve_raw(self.productions.len(), "productions")?;
        let id = ProductionID::from_raw(raw);
        self.productions.push(Production { id, left, right });
        self.productions_by_left.entry(left).or_default().push(id);
        Ok(id)
    }

    pub(crate) fn set_start_symbol(&mut self, start: NonterminalID) {
        self.start_symbol = start;
    }
}

/// The largest number of terminals, nonterminals or productions a source grammar may hold.
///
/// Ids are `u16`. One id of each kind stays free for the augmenting production.
pub const MAX_IDS: usize = u16::MAX as usize;

/// The raw id of the `len`-th entry of a source grammar.
fn next_raw(len: usize, what: &'static str) -> Result<u16, GrammarError> {
    if len >= MAX_IDS {
        return Err(GrammarError::TooMany { what });
    }
    u16::try_from(len).map_err(|_| GrammarError::TooMany { what })
}

/// Like [`next_raw`], but may also take the id kept free for augmentation.
fn reserve_raw(len: usize, what: &'static str) -> Result<u16, GrammarError> {
    u16::try_from(len).map_err(|_| GrammarError::TooMany { what })
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    rules: Vec<(String, Vec<String>)>,
}

impl GrammarDef {
    /// Specify a production rule into this grammer.
    ///
    /// The first left-hand side becomes the start symbol. `@` on the right
    /// stands for the empty string and is dropped.
    pub fn rule<I, S>(&mut self, left: &str, right: I) -> Result<ProductionID, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let left = left.trim();
        if left.is_empty() {
            return Err(GrammarError::EmptyLeft);
        }
        if left == EPSILON || left == END_MARKER {
            return Err(GrammarError::ReservedSymbol {
                name: left.to_owned(),
            });
        }

        let mut right_ = vec![];
        for symbol in right {
            let symbol = symbol.into();
            match &*symbol {
                "" => return Err(GrammarError::EmptySymbol),
                END_MARKER => {
                    return Err(GrammarError::ReservedSymbol {
                        name: END_MARKER.to_owned(),
                    })
                }
                EPSILON => (),
                _ => right_.push(symbol),
            }
        }

        let id = ProductionID::from_raw(next_raw(self.rules.len(), "productions")?);
        self.rules.push((left.to_owned(), right_));
        Ok(id)
    }

    fn end(self) -> Result<Grammar, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut grammar = Grammar {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: vec![],
            productions_by_left: Map::default(),
            start_symbol: NonterminalID::from_raw(0),
        };
        grammar
            .terminals
            .insert(TerminalID::EOI, END_MARKER.to_owned());

        // Left-hand sides are the nonterminals, in order of first appearance.
        let mut nonterminals = Map::<&str, NonterminalID>::default();
        for (left, _) in &self.rules {
            if !nonterminals.contains_key(&**left) {
                next_raw(nonterminals.len(), "nonterminals")?;
                let id = grammar.add_nonterminal(left.clone())?;
                nonterminals.insert(left, id);
            }
        }

        // Everything else on the right is a terminal.
        let mut terminals = Map::<&str, TerminalID>::default();
        for (_, right) in &self.rules {
            for symbol in right {
                if nonterminals.contains_key(&**symbol) || terminals.contains_key(&**symbol) {
                    continue;
                }
                let raw = next_raw(terminals.len(), "terminals")?
                    .checked_add(TerminalID::OFFSET)
                    .ok_or(GrammarError::TooMany { what: "terminals" })?;
                let id = TerminalID::from_raw(raw);
                grammar.terminals.insert(id, symbol.clone());
                terminals.insert(symbol, id);
            }
        }

        let mut defined = Map::<(NonterminalID, Vec<SymbolID>), ProductionID>::default();
        for (left, right) in &self.rules {
            let left = nonterminals[&**left];
            let right: Vec<SymbolID> = right
                .iter()
                .map(|symbol| match nonterminals.get(&**symbol) {
                    Some(n) => SymbolID::N(*n),
                    None => SymbolID::T(terminals[&**symbol]),
                })
                .collect();

            let id = grammar.add_production(left, right.clone())?;
            match defined.entry((left, right)) {
                Entry::Occupied(first) => tracing::warn!(
                    "duplicate production: {} (first defined as {})",
                    grammar.production(id).display(&grammar),
                    first.get()
                ),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        // The first left-hand side is the start symbol.
        let start = nonterminals
            .first()
            .map(|(_, id)| *id)
            .ok_or(GrammarError::Empty)?;
        grammar.start_symbol = start;

        tracing::debug!(
            "grammar: {} terminal(s), {} nonterminal(s), {} production(s)",
            terminals.len(),
            nonterminals.len(),
            grammar.productions.len()
        );

        Ok(grammar)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("Syntax error: {}", _0)]
    Syntax(#[from] SyntaxError),

    #[error("the grammar has no production rules")]
    Empty,

    #[error("empty left-hand side")]
    EmptyLeft,

    #[error("empty symbol name")]
    EmptySymbol,

    #[error("too many {what} (at most {})", MAX_IDS)]
    TooMany { what: &'static str },

    #[error("the reserved symbol `{}' cannot be used here", name)]
    ReservedSymbol { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(g: &Grammar, p: &Production) -> Vec<String> {
        p.right()
            .iter()
            .map(|s| g.symbol_name(*s).to_owned())
            .collect()
    }

    #[test]
    fn parse_expression_grammar() {
        let g = Grammar::parse(
            "E -> E + T | T\n\
             T -> T * F | F\n\
             F -> ( E ) | id\n",
        )
        .unwrap();
        eprintln!("{}", g);

        assert_eq!(g.nonterminal_name(g.start_symbol()), "E");
        assert_eq!(
            g.nonterminals().map(|(_, n)| n).collect::<Vec<_>>(),
            ["E", "T", "F"]
        );
        assert_eq!(
            g.terminals().map(|(_, n)| n).collect::<Vec<_>>(),
            ["+", "*", "(", ")", "id"]
        );
        assert_eq!(g.productions().count(), 6);

        let p4 = g.production(ProductionID::from_raw(4));
        assert_eq!(g.nonterminal_name(p4.left()), "F");
        assert_eq!(names(&g, p4), ["(", "E", ")"]);
        assert_eq!(p4.display(&g).to_string(), "F -> ( E )");

        let e = g.nonterminal("E").unwrap();
        assert_eq!(
            g.productions_of(e),
            [ProductionID::from_raw(0), ProductionID::from_raw(1)]
        );
    }

    #[test]
    fn terminals_are_derived() {
        // `E` has no production of its own, so it is a terminal here.
        let g = Grammar::parse("S -> if E then S | other").unwrap();
        assert!(matches!(g.symbol("E"), Some(SymbolID::T(..))));
        assert!(matches!(g.symbol("S"), Some(SymbolID::N(..))));
        assert_eq!(g.symbol("#"), Some(SymbolID::T(TerminalID::EOI)));
        assert_eq!(g.symbol("missing"), None);
    }

    #[test]
    fn epsilon_production_has_empty_right() {
        let g = Grammar::parse("A -> a A | @").unwrap();
        let p = g.production(ProductionID::from_raw(1));
        assert!(p.is_epsilon());
        assert_eq!(p.display(&g).to_string(), "A -> @");
    }

    #[test]
    fn syntax_errors_abort() {
        let err = Grammar::parse("E -> T\nT id").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Syntax(SyntaxError::MissingArrow { line: 2, .. })
        ));
        assert!(err.to_string().contains("line 2"));

        assert_eq!(Grammar::parse("\n  \n").unwrap_err(), GrammarError::Empty);
    }

    #[test]
    fn define_with_builder() {
        let g = Grammar::define(|g| {
            g.rule("S", ["C", "C"])?;
            g.rule("C", ["c", "C"])?;
            g.rule("C", ["d"])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(g.nonterminal_name(g.start_symbol()), "S");
        assert_eq!(g.terminals().count(), 2);

        let err = Grammar::define(|g| {
            g.rule("S", ["a", "#"])?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err, GrammarError::ReservedSymbol { name: "#".into() });

        let err = Grammar::define(|g| {
            g.rule("  ", ["a"])?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err, GrammarError::EmptyLeft);
    }

    #[test]
    fn reject_empty_symbol_names() {
        let err = Grammar::define(|g| {
            g.rule("S", ["a", ""])?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err, GrammarError::EmptySymbol);
    }

    #[test]
    fn too_many_productions() {
        let mut source = String::from("S -> a");
        for _ in 0..MAX_IDS {
            source.push_str(" | a");
        }
        assert_eq!(
            Grammar::parse(&source).unwrap_err(),
            GrammarError::TooMany {
                what: "productions"
            }
        );
    }

    #[test]
    fn too_many_terminals() {
        use std::fmt::Write as _;

        let mut source = String::from("S ->");
        for i in 0..MAX_IDS {
            write!(source, " t{}", i).unwrap();
        }
        let g = Grammar::parse(&source).unwrap();
        assert_eq!(g.terminals().count(), MAX_IDS);
        assert_eq!(g.terminal("t0"), Some(TerminalID::from_raw(1)));
        assert_ne!(g.terminal("t65534"), Some(TerminalID::EOI));

        source.push_str(" one_more");
        assert_eq!(
            Grammar::parse(&source).unwrap_err(),
            GrammarError::TooMany { what: "terminals" }
        );
    }

    #[test]
    fn duplicate_productions_are_kept() {
        let g = Grammar::parse("S -> a | a").unwrap();
        assert_eq!(g.productions().count(), 2);
    }
}
