//! One-stop analysis of a grammar: FIRST/FOLLOW sets, automata and parse tables.

use crate::{
    augment::{AugmentedGrammar, Config},
    first_sets::FirstSets,
    follow_sets::FollowSets,
    grammar::Grammar,
    lr0::LR0Automaton,
    lr1::LR1Automaton,
    table::ParseTable,
};

/// The results shared by every construction: the FIRST/FOLLOW sets of the
/// grammar as written and of its augmented form.
#[derive(Debug)]
pub struct Analyzer {
    grammar: Grammar,
    first_sets: FirstSets,
    follow_sets: FollowSets,
    augmented: AugmentedGrammar,
    augmented_first_sets: FirstSets,
    augmented_follow_sets: FollowSets,
}

#[derive(Debug)]
pub struct SlrAnalysis {
    pub automaton: LR0Automaton,
    pub table: ParseTable,
}

#[derive(Debug)]
pub struct Lr1Analysis {
    pub automaton: LR1Automaton,
    pub table: ParseTable,
}

impl Analyzer {
    pub fn new(g: &Grammar) -> Self {
        Self::with_config(g, &Config::new())
    }

    pub fn with_config(g: &Grammar, config: &Config) -> Self {
        let _entered = tracing::debug_span!("analyze").entered();

        let first_sets = FirstSets::compute(g);
        let follow_sets = FollowSets::compute(g, &first_sets);

        let augmented = AugmentedGrammar::with_config(g, config);
        let augmented_first_sets = FirstSets::compute(augmented.grammar());
        let augmented_follow_sets =
            FollowSets::compute(augmented.grammar(), &augmented_first_sets);

        Self {
            grammar: g.clone(),
            first_sets,
            follow_sets,
            augmented,
            augmented_first_sets,
            augmented_follow_sets,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// FIRST sets of the grammar as written.
    pub fn first_sets(&self) -> &FirstSets {
        &self.first_sets
    }

    /// FOLLOW sets of the grammar as written.
    pub fn follow_sets(&self) -> &FollowSets {
        &self.follow_sets
    }

    pub fn augmented(&self) -> &AugmentedGrammar {
        &self.augmented
    }

    pub fn augmented_first_sets(&self) -> &FirstSets {
        &self.augmented_first_sets
    }

    pub fn augmented_follow_sets(&self) -> &FollowSets {
        &self.augmented_follow_sets
    }

    /// Build the LR(0) automaton and the SLR(1) table.
    pub fn slr(&self) -> SlrAnalysis {
        let automaton = LR0Automaton::build(&self.augmented);
        let table = ParseTable::slr(&self.augmented, &automaton, &self.augmented_follow_sets);
        SlrAnalysis { automaton, table }
    }

    /// Build the canonical LR(1) automaton and its table.
    pub fn lr1(&self) -> Lr1Analysis {
        let automaton =
            LR1Automaton::build_with_first_sets(&self.augmented, &self.augmented_first_sets);
        let table = ParseTable::lr1(&self.augmented, &automaton);
        Lr1Analysis { automaton, table }
    }

    pub fn is_slr1(&self) -> bool {
        self.slr().table.is_conflict_free()
    }

    pub fn is_lr1(&self) -> bool {
        self.lr1().table.is_conflict_free()
    }
}
