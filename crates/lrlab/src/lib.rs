//! LR grammar analysis: FIRST/FOLLOW sets, LR(0) and LR(1) item-set
//! collections, and SLR(1)/LR(1) parse tables with conflict reports.
//!
//! ```
//! use lrlab::{Analyzer, Grammar};
//!
//! let g: Grammar = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id".parse()?;
//! let analyzer = Analyzer::new(&g);
//! assert!(analyzer.is_slr1());
//! # Ok::<(), lrlab::GrammarError>(())
//! ```

pub mod analyzer;
pub mod augment;
pub mod automaton;
pub mod first_sets;
pub mod follow_sets;
pub mod grammar;
pub mod lr0;
pub mod lr1;
pub mod syntax;
pub mod table;
pub mod types;
pub mod util;

pub use crate::{
    analyzer::{Analyzer, Lr1Analysis, SlrAnalysis},
    augment::AugmentedGrammar,
    grammar::{Grammar, GrammarError},
    table::{Action, Conflict, ConflictKind, ParseTable},
};
