/// Errors raised while building, resolving or applying a contract.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The contract text is not JSON at all.
    #[error("contract is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The contract text is JSON but not a JSON object.
    #[error("contract must be a JSON object of named schemas")]
    InvalidContractJson,

    /// A named schema fragment could not be decoded into a schema node.
    #[error("schema {name:?} is malformed: {source}")]
    MalformedSchema {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The schema-set has no `Contract` entry.
    #[error("schema-set does not define a \"Contract\" entry")]
    MissingContract,

    /// Two schema names differ only by case.
    #[error("schema {0:?} is defined more than once")]
    DuplicateSchema(String),

    /// At least one `$ref` could not be resolved.
    #[error("{0} reference(s) could not be resolved")]
    ReferenceNotFound(usize),

    /// The contract failed validation.
    #[error("contract is invalid: {}", .0.join("; "))]
    InvalidContract(Vec<String>),

    /// The resolved contract could not be compiled into a message schema.
    #[error("failed to compile message schema: {0}")]
    CompileFailed(String),

    /// The message payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The message payload does not satisfy the contract.
    #[error("message validation failed: {message}")]
    ValidationFailed { message: String },

    /// The contract nests deeper than the configured limit.
    #[error("schema nesting exceeds configured max depth ({max})")]
    TooDeep { max: usize },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
