use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Result, SchemaError};
use crate::validator::ContractValidator;

/// Checks runtime messages against an accepted contract.
pub struct MessageValidator {
    schema: Value,
    validator: Validator,
}

impl MessageValidator {
    /// Validate `contract` and compile its resolved `Contract` entry.
    pub fn from_contract(contract: &str, config: EngineConfig) -> Result<Self> {
        let (dictionary, report) = ContractValidator::new(config).resolve(contract);
        if !report.is_valid() {
            return Err(SchemaError::InvalidContract(report.into_messages()));
        }
        let node = dictionary.contract().ok_or(SchemaError::MissingContract)?;

        let schema = node.to_json_schema(config.strict_mode);
        let validator = jsonschema::validator_for(&schema)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))?;
        debug!(strict = config.strict_mode, "compiled message schema");

        Ok(Self { schema, validator })
    }

    /// Validate one message payload.
    pub fn validate(&self, payload: &[u8]) -> Result<()> {
        let value: Value = serde_json::from_slice(payload)?;
        self.validate_value(&value)
    }

    /// Validate an already decoded message.
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        let mut errors = self.validator.iter_errors(value);
        if let Some(first) = errors.next() {
            let mut message = first.to_string();
            for err in errors.take(3) {
                message.push_str("; ");
                message.push_str(&err.to_string());
            }
            return Err(SchemaError::ValidationFailed { message });
        }

        Ok(())
    }

    /// The JSON Schema the contract was rendered to.
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}
