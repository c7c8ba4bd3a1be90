//! Grammar augmentation.
//!
//! LR construction needs a start production `S' -> S` whose completion is the
//! only accepting situation. The augmenter either recognizes such a production
//! in the user grammar or appends a fresh one.

use crate::grammar::{Grammar, NonterminalID, ProductionID, SymbolID};

#[derive(Debug, Clone)]
pub struct Config {
    detect_augmented: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            detect_augmented: true,
        }
    }

    /// Whether to accept an existing `S -> B` start production as the augmenting one.
    ///
    /// Enabled by default. Note that a grammar which legitimately starts with
    /// a single unit rule is then treated as already augmented.
    pub fn detect_augmented(&mut self, enabled: bool) -> &mut Self {
        self.detect_augmented = enabled;
        self
    }
}

/// A grammar with a unique start production.
///
/// It owns its own copy of the productions; production ids of the source
/// grammar are preserved and a synthesized start production is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedGrammar {
    grammar: Grammar,
    accept: ProductionID,
    synthesized: bool,
}

impl AugmentedGrammar {
    pub fn new(g: &Grammar) -> Self {
        Self::with_config(g, &Config::new())
    }

    pub fn with_config(g: &Grammar, config: &Config) -> Self {
        if config.detect_augmented {
            if let Some(accept) = find_augmenting_production(g) {
                tracing::debug!(
                    "grammar is already augmented by {}",
                    g.production(accept).display(g)
                );
                return Self {
                    grammar: g.clone(),
                    accept,
                    synthesized: false,
                };
            }
        }

        let start = g.start_symbol();
        let mut name = format!("{}'", g.nonterminal_name(start));
        while g.symbol(&name).is_some() {
            name.push('\'');
        }

        // `GrammarDef` leaves one nonterminal id and one production id free for this.
        let mut grammar = g.clone();
        let new_start = grammar
            .add_nonterminal(name)
            .expect("no nonterminal id left for the augmented start symbol");
        let accept = grammar
            .add_production(new_start, vec![SymbolID::N(start)])
            .expect("no production id left for the augmenting production");
        grammar.set_start_symbol(new_start);
        tracing::debug!(
            "augmented with {}",
            grammar.production(accept).display(&grammar)
        );

        Self {
            grammar,
            accept,
            synthesized: true,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The augmenting production `S' -> S`.
    pub fn accept(&self) -> ProductionID {
        self.accept
    }

    pub fn start_symbol(&self) -> NonterminalID {
        self.grammar.start_symbol()
    }

    /// Whether the augmenting production was appended rather than found in the source grammar.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }
}

/// `S -> B` where `S` has no other production and `B` is another nonterminal with productions.
fn find_augmenting_production(g: &Grammar) -> Option<ProductionID> {
    let start = g.start_symbol();
    let [id] = g.productions_of(start) else {
        return None;
    };
    match g.production(*id).right() {
        [SymbolID::N(b)] if *b != start && !g.productions_of(*b).is_empty() => Some(*id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesize_start_production() {
        let g = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        let aug = AugmentedGrammar::new(&g);
        let ag = aug.grammar();

        assert!(aug.is_synthesized());
        assert_eq!(ag.nonterminal_name(aug.start_symbol()), "E'");
        assert_eq!(aug.accept(), ProductionID::from_raw(3));
        assert_eq!(ag.production(aug.accept()).display(ag).to_string(), "E' -> E");

        // The source grammar is untouched.
        assert_eq!(g.productions().count(), 3);
        assert_eq!(g.nonterminal_name(g.start_symbol()), "E");
    }

    #[test]
    fn fresh_name_skips_existing_symbols() {
        let g = Grammar::parse("S -> a | b\nS' -> c").unwrap();
        let aug = AugmentedGrammar::new(&g);
        assert_eq!(aug.grammar().nonterminal_name(aug.start_symbol()), "S''");
    }

    #[test]
    fn recognize_augmented_grammar() {
        let g = Grammar::parse("S -> E\nE -> E + id | id").unwrap();
        let aug = AugmentedGrammar::new(&g);
        assert!(!aug.is_synthesized());
        assert_eq!(aug.accept(), ProductionID::from_raw(0));
        assert_eq!(aug.grammar(), &g);
    }

    #[test]
    fn unit_rule_to_terminal_is_not_augmentation() {
        let g = Grammar::parse("S -> a").unwrap();
        assert!(AugmentedGrammar::new(&g).is_synthesized());

        let g = Grammar::parse("S -> S | a").unwrap();
        assert!(AugmentedGrammar::new(&g).is_synthesized());
    }

    #[test]
    fn largest_grammar_still_augments() {
        let mut source = String::from("S -> a");
        for _ in 1..crate::grammar::MAX_IDS {
            source.push_str(" | a");
        }
        let g = Grammar::parse(&source).unwrap();
        let aug = AugmentedGrammar::new(&g);
        assert!(aug.is_synthesized());
        assert_eq!(aug.accept(), ProductionID::from_raw(u16::MAX));
    }

    #[test]
    fn detection_can_be_disabled() {
        let g = Grammar::parse("S -> E\nE -> E + id | id").unwrap();
        let aug = AugmentedGrammar::with_config(&g, Config::new().detect_augmented(false));
        assert!(aug.is_synthesized());
        assert_eq!(aug.grammar().nonterminal_name(aug.start_symbol()), "S'");
    }
}
