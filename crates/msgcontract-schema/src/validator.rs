//! Contract validation: parse, build, resolve, then walk the contract tree.
//!
//! The validator reports everything it finds in one pass. Only text that is
//! not JSON at all stops it before the structural rules run.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dictionary::{build_dictionary_with, BuildSignals, SchemaDictionary};
use crate::error::{Result, SchemaError};
use crate::names::{same_name, NameMap};
use crate::node::SchemaNode;
use crate::resolver::ReferenceError;
use crate::vocab::{DataType, Format};

const GUID: &str = "Guid";
const ID_PROPERTY: &str = "ID";
const TIMESTAMP_PROPERTY: &str = "Timestamp";

const INVALID_JSON: &str = "Contract must be valid JSON.";
const NOT_A_SCHEMA: &str = "Contract must be defined as a valid OpenAPI schema.";
const REFERENCE_NOT_FOUND: &str = "Reference definition not found.";
const CONTRACT_TYPE_REQUIRED: &str =
    "Contract object must have a property \"type\" with value \"object\".";
const CONTRACT_TYPE_INVALID: &str = "Contract does not have a valid type.";
const EMPTY_CONTRACT: &str = "An empty contract cannot be saved.";
const ID_NOT_GUID: &str = "Contract must include a property ID of type Guid.";
const TIMESTAMP_NOT_DATE_TIME: &str = "The Timestamp property must have a format of date-time.";
const MALFORMED_SCHEMA: &str = "Contract must have a properly defined and formatted schema.";

const DATE_TIME_LAYOUTS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];
const DATE_LAYOUTS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Category of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedJson,
    SchemaBuildFailure,
    ReferenceNotFound,
    StructuralViolation,
    ExampleMismatch,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::MalformedJson => "malformed_json",
            FailureKind::SchemaBuildFailure => "schema_build_failure",
            FailureKind::ReferenceNotFound => "reference_not_found",
            FailureKind::StructuralViolation => "structural_violation",
            FailureKind::ExampleMismatch => "example_mismatch",
        }
    }
}

/// One human-readable validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives failures in the order they are found.
pub trait FailureSink {
    fn record(&mut self, failure: Failure);
}

impl FailureSink for Vec<String> {
    fn record(&mut self, failure: Failure) {
        self.push(failure.message);
    }
}

impl FailureSink for Vec<Failure> {
    fn record(&mut self, failure: Failure) {
        self.push(failure);
    }
}

/// Ordered failures of one validation; empty means the contract is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<Failure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|failure| failure.message.clone())
            .collect()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.failures
            .into_iter()
            .map(|failure| failure.message)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl FailureSink for ValidationReport {
    fn record(&mut self, failure: Failure) {
        self.failures.push(failure);
    }
}

/// Validate a contract with the default configuration.
pub fn validate_contract(text: &str) -> Vec<String> {
    ContractValidator::default().validate(text).into_messages()
}

/// Stateless contract validator; every call builds its own dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractValidator {
    config: EngineConfig,
}

impl ContractValidator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn validate(&self, text: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.validate_into(text, &mut report);
        report
    }

    /// Validate and hand every failure to `sink`.
    pub fn validate_into(&self, text: &str, sink: &mut dyn FailureSink) {
        self.run(text, sink);
    }

    /// Validate and also return the reference-resolved dictionary.
    pub fn resolve(&self, text: &str) -> (SchemaDictionary, ValidationReport) {
        let mut report = ValidationReport::default();
        let dictionary = self.run(text, &mut report);
        (dictionary, report)
    }

    fn run(&self, text: &str, sink: &mut dyn FailureSink) -> SchemaDictionary {
        debug!(bytes = text.len(), "validating contract");

        if text.len() > self.config.max_contract_bytes {
            sink.record(Failure::new(
                FailureKind::MalformedJson,
                format!(
                    "Contract must not exceed {} bytes.",
                    self.config.max_contract_bytes
                ),
            ));
            return SchemaDictionary::new();
        }
        if serde_json::from_str::<IgnoredAny>(text).is_err() {
            sink.record(Failure::new(FailureKind::MalformedJson, INVALID_JSON));
            return SchemaDictionary::new();
        }

        let dictionary = {
            let mut signals = SinkSignals {
                sink: &mut *sink,
                reported_invalid: false,
            };
            build_dictionary_with(text, &self.config, &mut signals)
        };
        if dictionary.is_empty() {
            return dictionary;
        }

        let mut walk = ContractWalk {
            dictionary: &dictionary,
            sink: &mut *sink,
            max_depth: self.config.max_depth,
        };
        if let Err(error) = walk.check_contract() {
            warn!(%error, "contract traversal aborted");
            sink.record(Failure::new(
                FailureKind::StructuralViolation,
                MALFORMED_SCHEMA,
            ));
        }

        dictionary
    }
}

/// Turns dictionary build signals into failure messages.
struct SinkSignals<'a> {
    sink: &'a mut dyn FailureSink,
    reported_invalid: bool,
}

impl BuildSignals for SinkSignals<'_> {
    fn reference_not_found(&mut self, errors: &[ReferenceError]) {
        debug!(count = errors.len(), "reference resolution failed");
        self.sink.record(Failure::new(
            FailureKind::ReferenceNotFound,
            REFERENCE_NOT_FOUND,
        ));
    }

    fn invalid_schema(&mut self, error: &SchemaError) {
        debug!(%error, "schema-set rejected");
        if self.reported_invalid {
            return;
        }
        self.reported_invalid = true;
        self.sink
            .record(Failure::new(FailureKind::SchemaBuildFailure, NOT_A_SCHEMA));
    }
}

struct ContractWalk<'a> {
    dictionary: &'a SchemaDictionary,
    sink: &'a mut dyn FailureSink,
    max_depth: usize,
}

impl ContractWalk<'_> {
    fn check_contract(&mut self) -> Result<()> {
        let dictionary = self.dictionary;
        let contract = dictionary.contract().ok_or(SchemaError::MissingContract)?;

        match contract.type_name() {
            None => self.structural(CONTRACT_TYPE_REQUIRED),
            Some(kind) if !DataType::is_allowed(kind) => self.structural(CONTRACT_TYPE_INVALID),
            Some(_) => {}
        }

        let properties = match contract.properties.as_ref() {
            Some(properties) if !properties.is_empty() => properties,
            _ => {
                self.structural(EMPTY_CONTRACT);
                return Ok(());
            }
        };

        self.check_properties(properties, 1)?;

        if let Some(id) = properties.get(ID_PROPERTY) {
            let is_guid = id.type_name() == Some(DataType::String.value())
                && id.reference_name().is_some_and(|name| same_name(name, GUID))
                && dictionary.contains(GUID);
            if !is_guid {
                self.structural(ID_NOT_GUID);
            }
        }
        if let Some(timestamp) = properties.get(TIMESTAMP_PROPERTY) {
            if timestamp.format_kind() != Some(Format::DateTime) {
                self.structural(TIMESTAMP_NOT_DATE_TIME);
            }
        }

        Ok(())
    }

    fn check_properties(&mut self, properties: &NameMap<SchemaNode>, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(SchemaError::TooDeep {
                max: self.max_depth,
            });
        }
        for (name, property) in properties.iter() {
            self.check_property(name, property, depth)?;
        }
        Ok(())
    }

    fn check_property(&mut self, name: &str, property: &SchemaNode, depth: usize) -> Result<()> {
        match property.type_name() {
            None if !property.carries_reference() => {
                self.structural(incorrect(name, "A type or reference is required."));
            }
            Some(kind) if !DataType::is_allowed(kind) => {
                self.structural(incorrect(
                    name,
                    &format!("\"{kind}\" is not an allowed data type."),
                ));
            }
            _ => {}
        }

        match property.data_type() {
            Some(DataType::Object) => self.check_object(name, property, depth)?,
            Some(DataType::Array) => self.check_items(name, property, depth)?,
            _ => {}
        }

        if let Some(format) = property.format_name() {
            if !Format::is_allowed(format) {
                self.structural(incorrect(
                    name,
                    &format!("\"{format}\" is not an allowed format."),
                ));
            }
        }

        self.check_example(name, property);
        Ok(())
    }

    fn check_object(&mut self, name: &str, node: &SchemaNode, depth: usize) -> Result<()> {
        match node.properties.as_ref() {
            Some(children) => self.check_properties(children, depth + 1),
            None => {
                self.structural(incorrect(
                    name,
                    "'object' data type requires a 'Properties' object.",
                ));
                Ok(())
            }
        }
    }

    fn check_items(&mut self, name: &str, property: &SchemaNode, depth: usize) -> Result<()> {
        let Some(items) = property.items.as_deref() else {
            self.structural(incorrect(
                name,
                "'array' data type requires an Items sub-property.",
            ));
            return Ok(());
        };

        if !items.carries_reference() && items.data_type().is_none() {
            self.structural(incorrect(
                name,
                "A valid type is required for the Items sub-property.",
            ));
        }
        if items.data_type() == Some(DataType::Object) {
            self.check_object(name, items, depth)?;
        }
        Ok(())
    }

    fn check_example(&mut self, name: &str, property: &SchemaNode) {
        let Some(example) = property.example_text() else {
            return;
        };

        match property.data_type() {
            Some(DataType::Integer) => {
                if !is_integer(&example) {
                    self.mismatch(&example, name, DataType::Integer.value());
                }
            }
            Some(DataType::String) => {
                if property.format_kind() == Some(Format::DateTime) && !is_date_time(&example) {
                    self.mismatch(&example, name, Format::DateTime.value());
                }
                let is_guid_reference = property
                    .reference_name()
                    .is_some_and(|reference| same_name(reference, GUID));
                if is_guid_reference && Uuid::parse_str(example.trim()).is_err() {
                    self.mismatch(&example, name, GUID);
                }
            }
            _ => {}
        }
    }

    fn structural(&mut self, message: impl Into<String>) {
        self.sink
            .record(Failure::new(FailureKind::StructuralViolation, message));
    }

    fn mismatch(&mut self, example: &str, name: &str, expected: &str) {
        self.sink.record(Failure::new(
            FailureKind::ExampleMismatch,
            format!(
                "The example '{example}' for '{name}' does not match the required data type or format '{expected}'."
            ),
        ));
    }
}

fn incorrect(name: &str, detail: &str) -> String {
    format!("The definition of \"{name}\" is incorrect. {detail}")
}

/// Fits a 32- or 64-bit signed integer.
fn is_integer(text: &str) -> bool {
    text.trim().parse::<i64>().is_ok()
}

fn is_date_time(text: &str) -> bool {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text).is_ok()
        || DateTime::parse_from_rfc2822(text).is_ok()
        || DATE_TIME_LAYOUTS
            .iter()
            .any(|layout| NaiveDateTime::parse_from_str(text, layout).is_ok())
        || DATE_LAYOUTS
            .iter()
            .any(|layout| NaiveDate::parse_from_str(text, layout).is_ok())
}
