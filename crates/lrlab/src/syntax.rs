//! Parser for the textual grammar notation.
//!
//! ```text
//! E -> E + T | T
//! T -> T * F | F
//! F -> ( E ) | id
//! A -> @
//! ```
//!
//! Every non-blank line holds the alternatives of one left-hand side. Runs of
//! letters, digits and underscores form one symbol; any other non-whitespace
//! character is a symbol of its own. `@` stands for the empty string, as does
//! a blank alternative, and `#` is reserved for the end of input.

pub mod ast;

use crate::grammar::{END_MARKER, EPSILON};

const ARROW: &str = "->";
const ALTERNATIVE: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("line {line}: missing `->' in `{text}'")]
    MissingArrow { line: usize, text: String },

    #[error("line {line}: more than one `->' in `{text}'")]
    MultipleArrows { line: usize, text: String },

    #[error("line {line}: empty left-hand side in `{text}'")]
    EmptyLeft { line: usize, text: String },

    #[error("line {line}: the reserved symbol `{symbol}' cannot be used in `{text}'")]
    ReservedSymbol {
        line: usize,
        symbol: String,
        text: String,
    },
}

impl SyntaxError {
    /// The 1-based line number of the offending line.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingArrow { line, .. }
            | Self::MultipleArrows { line, .. }
            | Self::EmptyLeft { line, .. }
            | Self::ReservedSymbol { line, .. } => *line,
        }
    }
}

/// Parse the grammar text. The first error aborts the whole parse.
pub fn parse(source: &str) -> Result<ast::Grammar, SyntaxError> {
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    let mut rules = vec![];
    for (i, raw_line) in source.split('\n').enumerate() {
        let text = raw_line.trim();
        if text.is_empty() {
            continue;
        }
        let rule = parse_line(i + 1, text)?;
        tracing::trace!(
            "line {}: {} with {} alternative(s)",
            rule.line,
            rule.left,
            rule.productions.len()
        );
        rules.push(rule);
    }

    Ok(ast::Grammar { rules })
}

fn parse_line(line: usize, text: &str) -> Result<ast::RuleDesc, SyntaxError> {
    let parts: Vec<&str> = text.split(ARROW).collect();
    let (left, right) = match parts[..] {
        [left, right] => (left.trim(), right),
        [_] => {
            return Err(SyntaxError::MissingArrow {
                line,
                text: text.to_owned(),
            })
        }
        _ => {
            return Err(SyntaxError::MultipleArrows {
                line,
                text: text.to_owned(),
            })
        }
    };

    if left.is_empty() {
        return Err(SyntaxError::EmptyLeft {
            line,
            text: text.to_owned(),
        });
    }
    if left == EPSILON || left == END_MARKER {
        return Err(SyntaxError::ReservedSymbol {
            line,
            symbol: left.to_owned(),
            text: text.to_owned(),
        });
    }

    let mut productions = vec![];
    for alternative in right.split(ALTERNATIVE) {
        let alternative = alternative.trim();
        if alternative == EPSILON {
            productions.push(ast::Production { elems: vec![] });
            continue;
        }

        let mut elems = vec![];
        for symbol in tokenize(alternative) {
            if symbol == END_MARKER {
                return Err(SyntaxError::ReservedSymbol {
                    line,
                    symbol,
                    text: text.to_owned(),
                });
            }
            // `@` next to other symbols is the identity of concatenation.
            if symbol != EPSILON {
                elems.push(symbol);
            }
        }
        productions.push(ast::Production { elems });
    }

    Ok(ast::RuleDesc {
        line,
        left: left.to_owned(),
        productions,
    })
}

/// Split one alternative into symbol names.
pub fn tokenize(alternative: &str) -> Vec<String> {
    let mut symbols = vec![];
    let mut word = String::new();
    for ch in alternative.chars() {
        if is_word_char(ch) {
            word.push(ch);
            continue;
        }
        if !word.is_empty() {
            symbols.push(std::mem::take(&mut word));
        }
        if !ch.is_whitespace() {
            symbols.push(ch.to_string());
        }
    }
    if !word.is_empty() {
        symbols.push(word);
    }
    symbols
}

/// Letters, digits and `_`. Marks and connector punctuation stand alone.
fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}
