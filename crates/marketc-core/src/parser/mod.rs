//! Market DSL parser - tokenizer, grammar engine, and AST reduction
//!
//! Converts DSL text into a `MarketAst` in three steps:
//! tokenize, derive a parse tree from the static grammar, then reduce the
//! tree bottom-up with one reduction per production.

pub mod ast;
pub mod grammar;
pub mod tokenizer;

use crate::{Error, Result};
use ast::{Literal, MarketAst, ParseNode, Rule};
use grammar::GrammarEngine;
use tokenizer::Tokenizer;

/// Parse DSL text into a `MarketAst`
///
/// # Guarantees
/// - Deterministic: same input always produces same AST
/// - All five fields are populated on success
///
/// # Errors
/// Returns `Error::Syntax` with line:column and the expected token for any
/// text the grammar does not accept.
pub fn parse(input: &str) -> Result<MarketAst> {
    let tree = parse_tree(input)?;
    reduce(&tree)
}

/// Tokenize and derive the parse tree without reducing it
pub fn parse_tree(input: &str) -> Result<ParseNode> {
    let tokens = Tokenizer::new(input).tokenize()?;
    GrammarEngine::new(tokens).parse_tree()
}

// ── Reductions ─────────────────────────────────────────────
//
// Each reduction matches the exact child shape its production yields.
// The fallback arm is only taken for hand-built trees.

/// Reduce a `start` tree to a `MarketAst`
pub fn reduce(tree: &ParseNode) -> Result<MarketAst> {
    match children_of(tree, Rule::Start)? {
        [market] => reduce_market(market),
        _ => Err(malformed(tree, Rule::Start)),
    }
}

fn reduce_market(node: &ParseNode) -> Result<MarketAst> {
    let [question, fields] = children_of(node, Rule::Market)? else {
        return Err(malformed(node, Rule::Market));
    };
    let ParseNode::Leaf { literal: Literal::String(question), .. } = question else {
        return Err(malformed(node, Rule::Market));
    };
    let [outcomes, oracle, fee, mechanism] = children_of(fields, Rule::Fields)? else {
        return Err(malformed(fields, Rule::Fields));
    };

    Ok(MarketAst {
        question: question.clone(),
        outcomes: reduce_outcomes(outcomes)?,
        oracle: reduce_oracle(oracle)?,
        fee: reduce_fee(fee)?,
        mechanism: reduce_mechanism(mechanism)?,
    })
}

fn reduce_outcomes(node: &ParseNode) -> Result<(String, String)> {
    children_of(node, Rule::Outcomes)?;
    Ok(("Yes".to_string(), "No".to_string()))
}

fn reduce_oracle(node: &ParseNode) -> Result<String> {
    match children_of(node, Rule::Oracle)? {
        [ParseNode::Leaf { literal: Literal::Address(address), .. }] => Ok(address.clone()),
        _ => Err(malformed(node, Rule::Oracle)),
    }
}

fn reduce_fee(node: &ParseNode) -> Result<u64> {
    match children_of(node, Rule::Fee)? {
        [ParseNode::Leaf { literal: Literal::Number(percent), .. }] => Ok(*percent),
        _ => Err(malformed(node, Rule::Fee)),
    }
}

fn reduce_mechanism(node: &ParseNode) -> Result<String> {
    children_of(node, Rule::Mechanism)?;
    Ok("pool".to_string())
}

fn children_of(node: &ParseNode, expected: Rule) -> Result<&[ParseNode]> {
    match node {
        ParseNode::Rule { rule, children, .. } if *rule == expected => Ok(children),
        _ => Err(malformed(node, expected)),
    }
}

fn malformed(node: &ParseNode, rule: Rule) -> Error {
    Error::syntax(&node.span(), &[rule.to_string().as_str()], "malformed parse tree")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::Span;

    const ADDR: &str = "0x1234567890123456789012345678901234567890";

    fn document(outcomes: &str, oracle: &str, fee: &str, mechanism: &str) -> String {
        format!(
            "market \"Will ETH reach $5000 in 2024?\" {{\n    outcomes: {};\n    oracle: {};\n    fee: {};\n    trading_mechanism: {};\n}}\n",
            outcomes, oracle, fee, mechanism
        )
    }

    fn valid() -> String {
        document("Yes, No", ADDR, "1%", "pool")
    }

    fn expect_syntax(input: &str) -> (usize, usize, Vec<String>) {
        match parse(input) {
            Err(Error::Syntax { line, column, expected, .. }) => (line, column, expected),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    // ── Success ────────────────────────────────────────

    #[test]
    fn test_parse_reference_market() {
        let input = "market \"Will ETH reach $5000 in 2024?\" { outcomes: Yes, No; oracle: 0x1234567890123456789012345678901234567890; fee: 1%; trading_mechanism: pool; }";
        let ast = parse(input).unwrap();
        assert_eq!(ast, MarketAst {
            question: "Will ETH reach $5000 in 2024?".to_string(),
            outcomes: ("Yes".to_string(), "No".to_string()),
            oracle: ADDR.to_string(),
            fee: 1,
            mechanism: "pool".to_string(),
        });
    }

    #[test]
    fn test_parse_multiline_document() {
        let ast = parse(&valid()).unwrap();
        assert_eq!(ast.fee, 1);
        assert_eq!(ast.oracle, ADDR);
    }

    #[test]
    fn test_oracle_kept_as_written() {
        let mixed = "0xABCDEFabcdef0123456789ABCDEFabcdef012345";
        let ast = parse(&document("Yes, No", mixed, "2%", "pool")).unwrap();
        assert_eq!(ast.oracle, mixed);
    }

    #[test]
    fn test_fee_literal_is_a_percentage() {
        for fee in [0u64, 5, 10, 15, 250] {
            let ast = parse(&document("Yes, No", ADDR, &format!("{}%", fee), "pool")).unwrap();
            assert_eq!(ast.fee, fee, "fee literal must be kept as written");
        }
    }

    #[test]
    fn test_empty_question() {
        let ast = parse(&valid().replace("Will ETH reach $5000 in 2024?", "")).unwrap();
        assert_eq!(ast.question, "");
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let compact = format!(
            "market\"q\"{{outcomes:Yes,No;oracle:{};fee:3%;trading_mechanism:pool;}}",
            ADDR
        );
        let spaced = format!(
            "\n\n  market   \"q\"\t{{\n outcomes:  Yes ,\n No ;\toracle: {} ;\n\n fee: 3 % ;\n trading_mechanism: pool ;\n}}\n\n",
            ADDR
        );
        assert_eq!(parse(&compact).unwrap(), parse(&spaced).unwrap());
    }

    // ── Syntax errors ──────────────────────────────────

    #[test]
    fn test_invalid_hex_oracle_is_syntax_error() {
        let (line, column, expected) = expect_syntax(&document(
            "Yes, No",
            "0xZZZ4567890123456789012345678901234567890",
            "1%",
            "pool",
        ));
        assert_eq!((line, column), (3, 13));
        assert_eq!(expected, vec!["ADDRESS".to_string()]);
    }

    #[test]
    fn test_oracle_without_prefix_expects_address() {
        let (line, column, expected) = expect_syntax(&document(
            "Yes, No",
            "1234567890123456789012345678901234567890",
            "1%",
            "pool",
        ));
        assert_eq!((line, column), (3, 13));
        assert_eq!(expected, vec!["ADDRESS".to_string()]);

        let (_, _, expected) = expect_syntax(&document("Yes, No", "12", "1%", "pool"));
        assert_eq!(expected, vec!["ADDRESS".to_string()]);
    }

    #[test]
    fn test_hex_fee_expects_number() {
        let (line, column, expected) = expect_syntax(&document("Yes, No", ADDR, "0x1%", "pool"));
        assert_eq!((line, column), (4, 10));
        assert_eq!(expected, vec!["NUMBER".to_string()]);
    }

    #[test]
    fn test_oversized_fee_expects_number() {
        let (_, _, expected) =
            expect_syntax(&document("Yes, No", ADDR, "99999999999999999999999%", "pool"));
        assert_eq!(expected, vec!["NUMBER".to_string()]);
    }

    #[test]
    fn test_stray_character_names_expected_token() {
        match parse("market \"q\" @ { }") {
            Err(Error::Syntax { line, column, expected, found }) => {
                assert_eq!((line, column), (1, 12));
                assert_eq!(expected, vec!["'{'".to_string()]);
                assert_eq!(found, "'@'");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_unicode_space_rejected() {
        let input = valid().replacen("market ", "market\u{a0}", 1);
        let (line, column, expected) = expect_syntax(&input);
        assert_eq!((line, column), (1, 7));
        assert_eq!(expected, vec!["STRING".to_string()]);
    }

    #[test]
    fn test_fields_out_of_order() {
        let input = format!(
            "market \"q\" {{ outcomes: Yes, No; fee: 1%; oracle: {}; trading_mechanism: pool; }}",
            ADDR
        );
        let (_, _, expected) = expect_syntax(&input);
        assert_eq!(expected, vec!["'oracle:'".to_string()]);
    }

    #[test]
    fn test_missing_field() {
        let input = format!("market \"q\" {{ outcomes: Yes, No; oracle: {}; fee: 1%; }}", ADDR);
        let (_, _, expected) = expect_syntax(&input);
        assert_eq!(expected, vec!["'trading_mechanism:'".to_string()]);
    }

    #[test]
    fn test_other_outcomes_rejected() {
        let (_, _, expected) = expect_syntax(&document("No, Yes", ADDR, "1%", "pool"));
        assert_eq!(expected, vec!["'Yes'".to_string()]);
        let (_, _, expected) = expect_syntax(&document("Yes, No, Maybe", ADDR, "1%", "pool"));
        assert_eq!(expected, vec!["';'".to_string()]);
    }

    #[test]
    fn test_other_mechanism_rejected() {
        let (line, _, expected) = expect_syntax(&document("Yes, No", ADDR, "1%", "amm"));
        assert_eq!(line, 5);
        assert_eq!(expected, vec!["'pool'".to_string()]);
    }

    #[test]
    fn test_fee_without_percent() {
        let (_, _, expected) = expect_syntax(&document("Yes, No", ADDR, "1", "pool"));
        assert_eq!(expected, vec!["'%'".to_string()]);
    }

    #[test]
    fn test_fractional_fee_rejected() {
        let (line, column, expected) = expect_syntax(&document("Yes, No", ADDR, "1.5%", "pool"));
        assert_eq!((line, column), (4, 11));
        assert_eq!(expected, vec!["'%'".to_string()]);
    }

    #[test]
    fn test_unquoted_question() {
        let (line, column, expected) = expect_syntax("market question { }");
        assert_eq!((line, column), (1, 8));
        assert_eq!(expected, vec!["STRING".to_string()]);
    }

    #[test]
    fn test_missing_closing_brace() {
        let input = valid();
        let truncated = input.trim_end().trim_end_matches('}');
        let (_, _, expected) = expect_syntax(truncated);
        assert_eq!(expected, vec!["'}'".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        let (line, column, expected) = expect_syntax("");
        assert_eq!((line, column), (1, 1));
        assert_eq!(expected, vec!["'market'".to_string()]);
    }

    #[test]
    fn test_two_markets_rejected() {
        let input = format!("{}{}", valid(), valid());
        let (_, _, expected) = expect_syntax(&input);
        assert_eq!(expected, vec!["end of input".to_string()]);
    }

    // ── Reduction totality ─────────────────────────────

    #[test]
    fn test_reduce_is_total_over_grammar_trees() {
        for fee in 0..=20 {
            let input = document("Yes, No", ADDR, &format!("{}%", fee), "pool");
            let tree = parse_tree(&input).unwrap();
            let ast = reduce(&tree).unwrap();
            assert_eq!(ast.fee, fee);
        }
    }

    #[test]
    fn test_reduce_rejects_hand_built_tree() {
        let span = Span { line: 1, column: 1, offset: 0 };
        let tree = ParseNode::Rule { rule: Rule::Start, span, children: vec![] };
        assert!(reduce(&tree).unwrap_err().is_syntax());

        let leaf = ParseNode::Leaf { literal: Literal::Number(1), span };
        assert!(reduce(&leaf).is_err());
    }

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = valid();
        let first = parse(&input).unwrap();
        for i in 0..100 {
            assert_eq!(first, parse(&input).unwrap(), "Non-determinism at iteration {}", i);
        }
    }
}
