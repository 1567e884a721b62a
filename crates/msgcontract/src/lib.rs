//! Declare message contracts as JSON schema-sets and validate them.
//!
//! msgcontract checks contract definitions (types, formats, `$ref`s,
//! example values) and validates runtime messages against accepted
//! contracts.
//!
//! # Crate Structure
//!
//! - [`schema`] — The contract engine: parser, reference resolver, validator
//!
//! The `msgcontract` binary (behind the `cli` feature) wraps the engine for
//! operators.

/// Re-export engine types.
pub mod schema {
    pub use msgcontract_schema::*;
}

pub use msgcontract_schema::{validate_contract, ContractValidator, MessageValidator};
