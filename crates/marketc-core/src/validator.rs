//! Semantic validator - turns a `MarketAst` into a `MarketModel`
//!
//! Enforces the rules the grammar cannot express, each with its own error:
//!
//! 1. **Oracle address** - `0x` + 40 hex digits, normalized to lowercase
//! 2. **Fee bound** - `fee_bps = fee_percent * 100`, at most 1000
//! 3. **Outcome set** - exactly `{Yes, No}`, order-insensitive, no duplicates
//! 4. **Mechanism** - member of the whitelist (`pool`)
//!
//! The percentage to basis-point conversion happens here and nowhere else.
//! The validator is pure: no I/O, no logging, no corrected guesses.

use std::collections::BTreeSet;

use crate::model::{Mechanism, MarketModel, BINARY_OUTCOMES, BPS_PER_PERCENT, MAX_FEE_BPS};
use crate::parser::tokenizer::ADDRESS_HEX_DIGITS;
use crate::{Error, MarketAst, Result};

// ── Public API ────────────────────────────────────────────

/// Validate an AST, stopping at the first failed rule
///
/// Rules run in the fixed order listed in the module docs, so the error
/// returned for a document violating several rules is stable.
pub fn validate(ast: &MarketAst) -> Result<MarketModel> {
    let oracle = check_oracle(&ast.oracle)?;
    let fee_bps = check_fee(ast.fee)?;
    let outcomes = check_outcomes(&ast.outcomes)?;
    let mechanism = check_mechanism(&ast.mechanism)?;

    Ok(MarketModel::new(
        ast.question.clone(),
        outcomes,
        oracle,
        fee_bps,
        mechanism,
    ))
}

/// Run every rule and collect all violations
///
/// An empty result means `validate` would succeed.
pub fn check(ast: &MarketAst) -> Vec<Error> {
    let mut errors = Vec::new();
    if let Err(e) = check_oracle(&ast.oracle) {
        errors.push(e);
    }
    if let Err(e) = check_fee(ast.fee) {
        errors.push(e);
    }
    if let Err(e) = check_outcomes(&ast.outcomes) {
        errors.push(e);
    }
    if let Err(e) = check_mechanism(&ast.mechanism) {
        errors.push(e);
    }
    errors
}

// ── Rules ─────────────────────────────────────────────────

fn check_oracle(address: &str) -> Result<String> {
    let valid = address
        .strip_prefix("0x")
        .map(|hex| hex.len() == ADDRESS_HEX_DIGITS && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);

    if !valid {
        return Err(Error::InvalidOracleAddress {
            address: address.to_string(),
        });
    }
    Ok(address.to_ascii_lowercase())
}

fn check_fee(fee_percent: u64) -> Result<u64> {
    fee_percent
        .checked_mul(BPS_PER_PERCENT)
        .filter(|bps| *bps <= MAX_FEE_BPS)
        .ok_or(Error::FeeOutOfRange { fee_percent })
}

fn check_outcomes(outcomes: &(String, String)) -> Result<Vec<String>> {
    let given: BTreeSet<&str> = [outcomes.0.as_str(), outcomes.1.as_str()].into_iter().collect();
    let expected: BTreeSet<&str> = BINARY_OUTCOMES.into_iter().collect();

    // A duplicate collapses the set to one element and fails here too
    if given != expected {
        return Err(Error::UnsupportedOutcomeSet {
            outcomes: vec![outcomes.0.clone(), outcomes.1.clone()],
        });
    }
    Ok(BINARY_OUTCOMES.iter().map(|o| o.to_string()).collect())
}

fn check_mechanism(name: &str) -> Result<Mechanism> {
    Mechanism::from_name(name).ok_or_else(|| Error::UnsupportedMechanism {
        mechanism: name.to_string(),
    })
}
