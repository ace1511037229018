//! Code generator - renders a `MarketModel` into Solidity source
//!
//! Output depends only on the model: no timestamps, no random identifiers,
//! no environment lookups. The fee is emitted exactly as `fee_bps`; no unit
//! conversion happens here.

pub mod template;

use std::sync::OnceLock;

use crate::model::{GeneratedContract, MarketModel, MAX_FEE_BPS};
use crate::normalizer::semantic_hash;
use crate::Result;
use template::{Bindings, Slot, Template, Value};

/// Name of the generated Solidity contract
pub const CONTRACT_NAME: &str = "BinaryMarket";

const CONTRACT_SOURCE: &str = include_str!("binary_market.sol.tmpl");

static CONTRACT_TEMPLATE: OnceLock<Result<Template>> = OnceLock::new();

/// The binary market template, compiled on first use
pub fn contract_template() -> Result<&'static Template> {
    CONTRACT_TEMPLATE
        .get_or_init(|| Template::compile(CONTRACT_SOURCE))
        .as_ref()
        .map_err(Clone::clone)
}

/// Slot values for `model`
pub fn bindings(model: &MarketModel) -> Bindings {
    let mut b = Bindings::new();
    b.insert(Slot::ContractName, Value::Ident(CONTRACT_NAME.to_string()));
    b.insert(Slot::Question, Value::Text(model.question().to_string()));
    b.insert(Slot::Oracle, Value::Address(model.oracle().to_string()));
    b.insert(Slot::OracleHex, Value::Hex(model.oracle_hex().to_string()));
    b.insert(Slot::FeeBps, Value::Uint(model.fee_bps()));
    b.insert(Slot::MaxFeeBps, Value::Uint(MAX_FEE_BPS));
    b.insert(Slot::Mechanism, Value::Text(model.mechanism().as_str().to_string()));
    b.insert(Slot::Outcomes, Value::IdentList(model.outcomes().to_vec()));
    b
}

/// Render contract source text for `model`
pub fn render(model: &MarketModel) -> Result<String> {
    contract_template()?.render(&bindings(model))
}

/// Render `model` and name the artifact after its semantic hash
pub fn generate(model: &MarketModel) -> Result<GeneratedContract> {
    let source = render(model)?;
    let hash = semantic_hash(model);
    let short = hash.get(..8).unwrap_or(hash.as_str());
    Ok(GeneratedContract::new(
        format!("{}_{}.sol", CONTRACT_NAME, short),
        source,
    ))
}
