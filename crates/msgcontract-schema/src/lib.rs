//! Schema contract engine for message contracts.
//!
//! A contract is a JSON object whose `Contract` entry describes a message
//! type and whose other entries are reusable named shapes (`Guid`, ...)
//! addressable through `$ref: "#/Name"`. The engine parses the schema-set,
//! resolves references and reports every rule violation it finds in one
//! pass. Accepted contracts can then check runtime messages.
//!
//! ```
//! let failures = msgcontract_schema::validate_contract(
//!     r#"{"Contract":{"type":"object","properties":{"Name":{"type":"string"}}}}"#,
//! );
//! assert!(failures.is_empty());
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod message;
pub mod names;
pub mod node;
pub mod resolver;
pub mod validator;
pub mod vocab;

pub use config::EngineConfig;
pub use dictionary::{
    build_dictionary, build_dictionary_with, BuildSignals, SchemaDictionary, CONTRACT,
};
pub use error::{Result, SchemaError};
pub use message::MessageValidator;
pub use names::NameMap;
pub use node::SchemaNode;
pub use resolver::{resolve_references, resolve_references_with, ReferenceError, Resolution};
pub use validator::{
    validate_contract, ContractValidator, Failure, FailureKind, FailureSink, ValidationReport,
};
pub use vocab::{DataType, Format};
