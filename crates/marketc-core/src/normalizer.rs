//! Canonical normalizer - one textual form per market
//!
//! # Pipeline
//!
//! `DSL text → parse → validate → canonical_source → SHA-256`
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize(normalize(x)) == normalize(x)`
//! - **Deterministic**: same input always produces same output
//! - **Semantic preserving**: for any model obtained from parsed text, the
//!   canonical text validates to the same model

use sha2::{Digest, Sha256};

use crate::model::{MarketModel, BPS_PER_PERCENT};
use crate::{parser, validator, Result};

// ── Public API ─────────────────────────────────────────────

/// Normalize DSL text to canonical form
///
/// # Errors
/// Any syntax or validation error of the input document.
pub fn normalize(source: &str) -> Result<String> {
    let ast = parser::parse(source)?;
    let model = validator::validate(&ast)?;
    Ok(canonical_source(&model))
}

/// Serialize a model to canonical DSL text
///
/// Produces deterministic output with:
/// - Fixed field order
/// - 4-space indentation, one field per line
/// - Lowercase oracle address
/// - Fee as a whole percentage
///
/// The question is written verbatim. DSL strings cannot contain `"`, so a
/// model validated from a hand-built `MarketAst` whose question holds one
/// has no canonical text that parses back.
pub fn canonical_source(model: &MarketModel) -> String {
    let mut out = String::new();
    out.push_str("market \"");
    out.push_str(model.question());
    out.push_str("\" {\n");
    write_field(&mut out, "outcomes", &model.outcomes().join(", "));
    write_field(&mut out, "oracle", model.oracle());
    write_field(
        &mut out,
        "fee",
        &format!("{}%", model.fee_bps() / BPS_PER_PERCENT),
    );
    write_field(&mut out, "trading_mechanism", model.mechanism().as_str());
    out.push_str("}\n");
    out
}

/// SHA-256 of the canonical form, as 64 lowercase hex chars
pub fn semantic_hash(model: &MarketModel) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_source(model).as_bytes());
    format!("{:x}", hasher.finalize())
}

fn write_field(out: &mut String, label: &str, value: &str) {
    out.push_str("    ");
    out.push_str(label);
    out.push_str(": ");
    out.push_str(value);
    out.push_str(";\n");
}
