//! Parse tree and AST types
//!
//! `ParseNode` is the rule-tagged tree the grammar engine builds. Punctuation
//! and keyword terminals are matched but not kept; only payload-bearing
//! terminals (string, address, number) survive as leaves.
//!
//! `MarketAst` is the typed result of reducing one `market { ... }` block.
//! It is immutable after construction and consumed once by the validator.

use serde::Serialize;

use super::tokenizer::Span;

/// Grammar productions, one per nonterminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Start,
    Market,
    Fields,
    Outcomes,
    Oracle,
    Fee,
    Mechanism,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Rule::Start => "start",
            Rule::Market => "market",
            Rule::Fields => "fields",
            Rule::Outcomes => "outcomes",
            Rule::Oracle => "oracle",
            Rule::Fee => "fee",
            Rule::Mechanism => "mechanism",
        };
        write!(f, "{}", name)
    }
}

/// Payload carried by a terminal that survives into the parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    String(String),
    Address(String),
    Number(u64),
}

/// Node of the parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode {
    Rule {
        rule: Rule,
        span: Span,
        children: Vec<ParseNode>,
    },
    Leaf {
        literal: Literal,
        span: Span,
    },
}

impl ParseNode {
    pub fn span(&self) -> Span {
        match self {
            ParseNode::Rule { span, .. } | ParseNode::Leaf { span, .. } => *span,
        }
    }

    /// Rule tag, or `None` for leaves
    pub fn rule(&self) -> Option<Rule> {
        match self {
            ParseNode::Rule { rule, .. } => Some(*rule),
            ParseNode::Leaf { .. } => None,
        }
    }
}

/// Typed result of parsing one market definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketAst {
    /// Question text with the enclosing quotes stripped
    pub question: String,
    pub outcomes: (String, String),
    /// Oracle address exactly as written, `0x` prefix included
    pub oracle: String,
    /// Fee as a percentage, the numeral preceding `%`
    pub fee: u64,
    pub mechanism: String,
}
