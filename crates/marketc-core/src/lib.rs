//! marketc core - compiler for the binary prediction market DSL
//!
//! Turns one `market { ... }` document into Solidity source for a
//! pool-based binary market contract.
//!
//! # Architecture
//!
//! ```text
//! DSL Text → Tokenizer → Grammar Engine → Parse Tree → AST
//!                                                       ↓
//!                                          Validator → MarketModel
//!                                                       ↓
//!                                          Code Generator → GeneratedContract
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces byte-identical output
//! - **All or nothing**: a document either compiles fully or yields one error
//! - **Pure**: no I/O, no logging, no shared mutable state; documents can be
//!   compiled in parallel without coordination

pub mod codegen;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod validator;

pub use error::{Error, Result};
pub use model::{GeneratedContract, MarketModel, Mechanism};
pub use parser::ast::MarketAst;

/// Version of the compiler core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile DSL source text into contract source
///
/// Runs parse → validate → generate in a single pass.
///
/// # Errors
/// The first `Error` raised by any stage; nothing is returned on failure.
pub fn compile(source: &str) -> Result<GeneratedContract> {
    let ast = parser::parse(source)?;
    let model = validator::validate(&ast)?;
    codegen::generate(&model)
}
