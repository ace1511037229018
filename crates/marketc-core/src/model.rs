//! Validated market model and the generated artifact
//!
//! A `MarketModel` can only be obtained from `validator::validate`, so
//! holding one means every semantic rule has passed. Fields are private
//! and read through accessors; the model is never mutated after creation.

use serde::Serialize;

/// Highest accepted fee, in basis points (10%)
pub const MAX_FEE_BPS: u64 = 1000;

/// Basis points per whole percent
pub const BPS_PER_PERCENT: u64 = 100;

/// The only outcome set the model accepts, in canonical order
pub const BINARY_OUTCOMES: [&str; 2] = ["Yes", "No"];

/// Trading mechanisms on the whitelist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    Pool,
}

impl Mechanism {
    pub const ALL: [Mechanism; 1] = [Mechanism::Pool];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mechanism::Pool => "pool",
        }
    }

    /// Whitelist lookup; exact, case-sensitive match
    pub fn from_name(name: &str) -> Option<Mechanism> {
        Mechanism::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl std::fmt::Display for Mechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, validated form of one market definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketModel {
    question: String,
    outcomes: Vec<String>,
    oracle: String,
    fee_bps: u64,
    mechanism: Mechanism,
}

impl MarketModel {
    /// Only the validator builds models
    pub(crate) fn new(
        question: String,
        outcomes: Vec<String>,
        oracle: String,
        fee_bps: u64,
        mechanism: Mechanism,
    ) -> Self {
        MarketModel {
            question,
            outcomes,
            oracle,
            fee_bps,
            mechanism,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Outcomes in canonical order (`Yes`, `No`)
    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// Lowercase `0x`-prefixed oracle address
    pub fn oracle(&self) -> &str {
        &self.oracle
    }

    /// Oracle address without the `0x` prefix
    pub fn oracle_hex(&self) -> &str {
        self.oracle.strip_prefix("0x").unwrap_or(&self.oracle)
    }

    /// Fee in basis points, `0..=MAX_FEE_BPS`
    pub fn fee_bps(&self) -> u64 {
        self.fee_bps
    }

    pub fn mechanism(&self) -> Mechanism {
        self.mechanism
    }
}

/// Contract source produced from one `MarketModel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedContract {
    file_name: String,
    source: String,
}

impl GeneratedContract {
    pub(crate) fn new(file_name: String, source: String) -> Self {
        GeneratedContract { file_name, source }
    }

    /// Logical destination, e.g. `BinaryMarket_1a2b3c4d.sol`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
