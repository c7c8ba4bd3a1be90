/// The parsed grammar text, one entry per non-blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub rules: Vec<RuleDesc>,
}

/// `LHS -> ALT1 | ALT2 | ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDesc {
    /// 1-based line number in the source text.
    pub line: usize,
    pub left: String,
    pub productions: Vec<Production>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// An empty list denotes the epsilon production.
    pub elems: Vec<String>,
}
