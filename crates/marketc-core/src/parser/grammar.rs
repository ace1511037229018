//! Market grammar - static production table and the engine that drives it
//!
//! ```text
//! start      := market EOF
//! market     := "market" STRING "{" fields "}"
//! fields     := outcomes oracle fee mechanism
//! outcomes   := "outcomes:" "Yes" "," "No" ";"
//! oracle     := "oracle:" ADDRESS ";"
//! fee        := "fee:" NUMBER "%" ";"
//! mechanism  := "trading_mechanism:" "pool" ";"
//! ```
//!
//! Every nonterminal has exactly one production and every field starts
//! with a distinct label, so one token of lookahead decides every step
//! and the engine never backtracks. The table is `'static` data and is
//! shared by all parses without synchronization.

use super::ast::{Literal, ParseNode, Rule};
use super::tokenizer::{SpannedToken, Token};
use crate::{Error, Result};

/// Terminal with no payload, matched by token equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixed {
    Market,
    OutcomesLabel,
    OracleLabel,
    FeeLabel,
    TradingMechanismLabel,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Percent,
    Eof,
}

impl Fixed {
    fn token(self) -> Token {
        match self {
            Fixed::Market => Token::Market,
            Fixed::OutcomesLabel => Token::OutcomesLabel,
            Fixed::OracleLabel => Token::OracleLabel,
            Fixed::FeeLabel => Token::FeeLabel,
            Fixed::TradingMechanismLabel => Token::TradingMechanismLabel,
            Fixed::LBrace => Token::LBrace,
            Fixed::RBrace => Token::RBrace,
            Fixed::Comma => Token::Comma,
            Fixed::Semicolon => Token::Semicolon,
            Fixed::Percent => Token::Percent,
            Fixed::Eof => Token::Eof,
        }
    }
}

/// Right-hand-side symbol of a production
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Fixed(Fixed),
    /// Bare word that must match exactly (`Yes`, `No`, `pool`)
    Word(&'static str),
    String,
    Address,
    Number,
    Rule(Rule),
}

impl Symbol {
    /// How the symbol is named in "expected ..." diagnostics
    pub fn describe(&self) -> String {
        match self {
            Symbol::Fixed(fixed) => fixed.token().to_string(),
            Symbol::Word(word) => format!("'{}'", word),
            Symbol::String => "STRING".to_string(),
            Symbol::Address => "ADDRESS".to_string(),
            Symbol::Number => "NUMBER".to_string(),
            Symbol::Rule(rule) => rule.to_string(),
        }
    }
}

use Fixed::*;

const START: &[Symbol] = &[Symbol::Rule(Rule::Market), Symbol::Fixed(Eof)];
const MARKET: &[Symbol] = &[
    Symbol::Fixed(Market),
    Symbol::String,
    Symbol::Fixed(LBrace),
    Symbol::Rule(Rule::Fields),
    Symbol::Fixed(RBrace),
];
const FIELDS: &[Symbol] = &[
    Symbol::Rule(Rule::Outcomes),
    Symbol::Rule(Rule::Oracle),
    Symbol::Rule(Rule::Fee),
    Symbol::Rule(Rule::Mechanism),
];
const OUTCOMES: &[Symbol] = &[
    Symbol::Fixed(OutcomesLabel),
    Symbol::Word("Yes"),
    Symbol::Fixed(Comma),
    Symbol::Word("No"),
    Symbol::Fixed(Semicolon),
];
const ORACLE: &[Symbol] = &[
    Symbol::Fixed(OracleLabel),
    Symbol::Address,
    Symbol::Fixed(Semicolon),
];
const FEE: &[Symbol] = &[
    Symbol::Fixed(FeeLabel),
    Symbol::Number,
    Symbol::Fixed(Percent),
    Symbol::Fixed(Semicolon),
];
const MECHANISM: &[Symbol] = &[
    Symbol::Fixed(TradingMechanismLabel),
    Symbol::Word("pool"),
    Symbol::Fixed(Semicolon),
];

/// All nonterminals in definition order
pub const RULES: [Rule; 7] = [
    Rule::Start,
    Rule::Market,
    Rule::Fields,
    Rule::Outcomes,
    Rule::Oracle,
    Rule::Fee,
    Rule::Mechanism,
];

/// The single production for `rule`
pub const fn production(rule: Rule) -> &'static [Symbol] {
    match rule {
        Rule::Start => START,
        Rule::Market => MARKET,
        Rule::Fields => FIELDS,
        Rule::Outcomes => OUTCOMES,
        Rule::Oracle => ORACLE,
        Rule::Fee => FEE,
        Rule::Mechanism => MECHANISM,
    }
}

/// Render the production table as EBNF text
pub fn render() -> String {
    let mut out = String::new();
    for rule in RULES {
        let rhs: Vec<String> = production(rule)
            .iter()
            .map(|s| match s {
                Symbol::Fixed(Eof) => "EOF".to_string(),
                other => other.describe(),
            })
            .collect();
        out.push_str(&format!("{:<10} := {}\n", rule.to_string(), rhs.join(" ")));
    }
    out.push_str("STRING     := /\"[^\"]*\"/\n");
    out.push_str("ADDRESS    := /0x[0-9a-fA-F]{40}/\n");
    out.push_str("NUMBER     := /[0-9]+/\n");
    out
}

// ── Engine ─────────────────────────────────────────────────

/// Drives the production table over a token stream
pub struct GrammarEngine {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl GrammarEngine {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if tokens.last().map(|t| &t.token) != Some(&Token::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or(super::tokenizer::Span {
                line: 1,
                column: 1,
                offset: 0,
            });
            tokens.push(SpannedToken { token: Token::Eof, span });
        }
        GrammarEngine { tokens, position: 0 }
    }

    /// Derive the whole token stream from `start`
    pub fn parse_tree(&mut self) -> Result<ParseNode> {
        self.derive(Rule::Start)
    }

    fn peek(&self) -> &SpannedToken {
        // `new` guarantees a trailing Eof and `advance` never passes it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn derive(&mut self, rule: Rule) -> Result<ParseNode> {
        let span = self.peek().span;
        let mut children = Vec::new();

        for symbol in production(rule) {
            match symbol {
                Symbol::Rule(inner) => children.push(self.derive(*inner)?),
                terminal => {
                    if let Some(leaf) = self.match_terminal(terminal)? {
                        children.push(leaf);
                    }
                }
            }
        }

        Ok(ParseNode::Rule { rule, span, children })
    }

    /// Consume one terminal; payload terminals come back as leaves
    fn match_terminal(&mut self, symbol: &Symbol) -> Result<Option<ParseNode>> {
        let current = self.peek().clone();

        let leaf = match (symbol, &current.token) {
            (Symbol::Fixed(fixed), token) if fixed.token() == *token => None,
            (Symbol::Word(word), Token::Word(found)) if found == word => None,
            (Symbol::String, Token::StringLiteral(s)) => Some(Literal::String(s.clone())),
            (Symbol::Address, Token::Address(a)) => Some(Literal::Address(a.clone())),
            (Symbol::Number, Token::Number(n)) => Some(Literal::Number(*n)),
            _ => {
                return Err(Error::syntax(
                    &current.span,
                    &[symbol.describe().as_str()],
                    current.token.to_string(),
                ));
            }
        };

        self.advance();
        Ok(leaf.map(|literal| ParseNode::Leaf {
            literal,
            span: current.span,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::Tokenizer;

    fn tree(input: &str) -> Result<ParseNode> {
        let tokens = Tokenizer::new(input).tokenize()?;
        GrammarEngine::new(tokens).parse_tree()
    }

    const VALID: &str = "market \"q\" { outcomes: Yes, No; oracle: 0x1234567890123456789012345678901234567890; fee: 1%; trading_mechanism: pool; }";

    #[test]
    fn test_tree_shape_follows_productions() {
        let root = tree(VALID).unwrap();
        assert_eq!(root.rule(), Some(Rule::Start));

        let ParseNode::Rule { children, .. } = &root else { panic!("start is a rule") };
        assert_eq!(children.len(), 1);
        let ParseNode::Rule { rule, children: market, .. } = &children[0] else {
            panic!("market is a rule")
        };
        assert_eq!(*rule, Rule::Market);
        assert!(matches!(&market[0], ParseNode::Leaf { literal: Literal::String(q), .. } if q == "q"));

        let ParseNode::Rule { children: fields, .. } = &market[1] else { panic!("fields is a rule") };
        let rules: Vec<_> = fields.iter().map(|f| f.rule()).collect();
        assert_eq!(rules, vec![
            Some(Rule::Outcomes),
            Some(Rule::Oracle),
            Some(Rule::Fee),
            Some(Rule::Mechanism),
        ]);
    }

    #[test]
    fn test_keyword_terminals_are_not_kept() {
        let root = tree(VALID).unwrap();
        let ParseNode::Rule { children, .. } = &root else { unreachable!() };
        let ParseNode::Rule { children: market, .. } = &children[0] else { unreachable!() };
        let ParseNode::Rule { children: fields, .. } = &market[1] else { unreachable!() };
        let ParseNode::Rule { children: outcomes, .. } = &fields[0] else { unreachable!() };
        assert!(outcomes.is_empty());
        let ParseNode::Rule { children: fee, .. } = &fields[2] else { unreachable!() };
        assert!(matches!(fee.as_slice(), [ParseNode::Leaf { literal: Literal::Number(1), .. }]));
    }

    #[test]
    fn test_error_reports_expected_symbol() {
        let err = tree("market \"q\" { oracle: 0x1234567890123456789012345678901234567890; }")
            .unwrap_err();
        assert_eq!(err, Error::Syntax {
            line: 1,
            column: 14,
            expected: vec!["'outcomes:'".to_string()],
            found: "'oracle:'".to_string(),
        });
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = tree(&format!("{} market", VALID)).unwrap_err();
        match err {
            Error::Syntax { expected, found, .. } => {
                assert_eq!(expected, vec!["end of input".to_string()]);
                assert_eq!(found, "'market'");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_matches_no_terminal() {
        let err = tree("market \"q\" { outcomes: Yes, No; oracle: 0x12; }").unwrap_err();
        assert_eq!(err, Error::Syntax {
            line: 1,
            column: 41,
            expected: vec!["ADDRESS".to_string()],
            found: "'0x12'".to_string(),
        });
    }

    #[test]
    fn test_empty_token_stream_reports_market() {
        let err = GrammarEngine::new(Vec::new()).parse_tree().unwrap_err();
        assert!(err.to_string().contains("expected 'market', found end of input"));
    }

    #[test]
    fn test_render_lists_every_rule() {
        let text = render();
        for rule in RULES {
            assert!(text.contains(&format!("{} ", rule)), "missing rule {}", rule);
        }
        assert!(text.contains("fee        := 'fee:' NUMBER '%' ';'"));
    }
}
