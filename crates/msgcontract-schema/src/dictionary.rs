use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::SchemaError;
use crate::names::NameMap;
use crate::node::SchemaNode;
use crate::resolver::{resolve_references_with, ReferenceError};

/// Name of the entry that describes the message itself.
pub const CONTRACT: &str = "Contract";

/// Case-insensitive mapping from schema name to schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaDictionary {
    schemas: NameMap<SchemaNode>,
}

impl SchemaDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        self.schemas.insert(name, node)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn get_entry(&self, name: &str) -> Option<(&str, &SchemaNode)> {
        self.schemas.get_entry(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// The `Contract` entry, if one was parsed.
    pub fn contract(&self) -> Option<&SchemaNode> {
        self.schemas.get(CONTRACT)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter()
    }
}

/// Callbacks raised while a dictionary is built.
///
/// Both may fire for the same build; a broken reference is always followed
/// by an `invalid_schema` call carrying [`SchemaError::ReferenceNotFound`].
pub trait BuildSignals {
    /// One or more `$ref`s could not be resolved.
    fn reference_not_found(&mut self, errors: &[ReferenceError]);

    /// The schema-set is not a usable contract definition.
    fn invalid_schema(&mut self, error: &SchemaError);
}

/// Parse a schema-set into a dictionary and resolve its references.
///
/// Failing entries are skipped and reported through `signals`; the returned
/// dictionary holds whatever parsed. Callers must not assume `Contract`
/// is present just because the dictionary is non-empty.
pub fn build_dictionary(text: &str, signals: &mut dyn BuildSignals) -> SchemaDictionary {
    build_dictionary_with(text, &EngineConfig::default(), signals)
}

/// Like [`build_dictionary`], resolving under the limits of `config`.
pub fn build_dictionary_with(
    text: &str,
    config: &EngineConfig,
    signals: &mut dyn BuildSignals,
) -> SchemaDictionary {
    let mut dictionary = SchemaDictionary::new();

    let entries = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(entries)) => entries,
        Ok(_) => {
            signals.invalid_schema(&SchemaError::InvalidContractJson);
            return dictionary;
        }
        Err(err) => {
            signals.invalid_schema(&SchemaError::MalformedJson(err));
            return dictionary;
        }
    };

    for (name, fragment) in entries {
        if dictionary.contains(&name) {
            let error = SchemaError::DuplicateSchema(name);
            warn!(%error, "skipping schema");
            signals.invalid_schema(&error);
            continue;
        }
        match SchemaNode::from_value(&name, fragment) {
            Ok(node) => {
                dictionary.insert(name, node);
            }
            Err(error) => {
                warn!(%error, "skipping schema");
                signals.invalid_schema(&error);
            }
        }
    }
    debug!(schemas = dictionary.len(), "parsed schema-set");

    let Some(contract) = dictionary.contract() else {
        signals.invalid_schema(&SchemaError::MissingContract);
        return dictionary;
    };

    if contract.has_reference_below() {
        debug!("resolving contract references");
        let resolution = resolve_references_with(&mut dictionary, config);
        if resolution.has_errors() {
            signals.reference_not_found(resolution.errors());
            signals.invalid_schema(&SchemaError::ReferenceNotFound(resolution.errors().len()));
        }
    }

    dictionary
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        references: Vec<ReferenceError>,
        invalid: Vec<String>,
    }

    impl BuildSignals for Recorder {
        fn reference_not_found(&mut self, errors: &[ReferenceError]) {
            self.references.extend_from_slice(errors);
        }

        fn invalid_schema(&mut self, error: &SchemaError) {
            self.invalid.push(error.to_string());
        }
    }

    /// Parse `value` into a dictionary without resolving anything.
    pub(crate) fn dictionary_from(value: Value) -> SchemaDictionary {
        let mut dictionary = SchemaDictionary::new();
        if let Value::Object(entries) = value {
            for (name, fragment) in entries {
                let node = SchemaNode::from_value(&name, fragment).unwrap();
                dictionary.insert(name, node);
            }
        }
        dictionary
    }

    #[test]
    fn builds_and_resolves_contract() {
        let mut recorder = Recorder::default();
        let text = json!({
            "Contract": {
                "type": "object",
                "properties": { "ID": { "$ref": "#/Guid" } }
            },
            "Guid": { "type": "string", "format": "guid" }
        })
        .to_string();

        let dictionary = build_dictionary(&text, &mut recorder);
        assert!(recorder.invalid.is_empty());
        assert!(recorder.references.is_empty());
        assert_eq!(dictionary.names().collect::<Vec<_>>(), vec!["Contract", "Guid"]);

        let id = dictionary
            .contract()
            .and_then(|contract| contract.properties.as_ref())
            .and_then(|properties| properties.get("id"))
            .unwrap();
        assert_eq!(id.type_name(), Some("string"));
        assert_eq!(id.reference.as_deref(), Some("Guid"));
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let mut recorder = Recorder::default();
        let dictionary = build_dictionary(
            r#"{"contract":{"type":"object","properties":{}},"GUID":{"type":"string"}}"#,
            &mut recorder,
        );

        assert!(recorder.invalid.is_empty());
        assert!(dictionary.contract().is_some());
        assert!(dictionary.contains("guid"));
    }

    #[test]
    fn non_object_text_is_invalid() {
        let mut recorder = Recorder::default();
        let dictionary = build_dictionary("[1, 2]", &mut recorder);
        assert!(dictionary.is_empty());
        assert_eq!(recorder.invalid.len(), 1);

        let mut recorder = Recorder::default();
        build_dictionary("{nope", &mut recorder);
        assert_eq!(recorder.invalid.len(), 1);
    }

    #[test]
    fn missing_contract_is_invalid_but_keeps_parsed_entries() {
        let mut recorder = Recorder::default();
        let dictionary = build_dictionary(r#"{"Guid":{"type":"string"}}"#, &mut recorder);

        assert_eq!(dictionary.len(), 1);
        assert_eq!(recorder.invalid, vec![SchemaError::MissingContract.to_string()]);
    }

    #[test]
    fn malformed_fragment_is_skipped_and_reported() {
        let mut recorder = Recorder::default();
        let dictionary = build_dictionary(
            r#"{"Contract":{"type":"object","properties":{"A":{"type":"string"}}},"Bad":{"type":7}}"#,
            &mut recorder,
        );

        assert!(dictionary.contract().is_some());
        assert!(!dictionary.contains("Bad"));
        assert_eq!(recorder.invalid.len(), 1);
        assert!(recorder.invalid[0].contains("Bad"));
    }

    #[test]
    fn case_duplicate_names_are_reported() {
        let mut recorder = Recorder::default();
        let dictionary = build_dictionary(
            r#"{"Contract":{"type":"object"},"Guid":{"type":"string"},"guid":{"type":"integer"}}"#,
            &mut recorder,
        );

        assert_eq!(dictionary.get("GUID").unwrap().type_name(), Some("string"));
        assert_eq!(recorder.invalid.len(), 1);
    }

    #[test]
    fn broken_reference_raises_both_signals() {
        let mut recorder = Recorder::default();
        let text = json!({
            "Contract": {
                "type": "object",
                "properties": { "Part": { "$ref": "#/Widget" } }
            }
        })
        .to_string();

        build_dictionary(&text, &mut recorder);
        assert_eq!(
            recorder.references,
            vec![ReferenceError::NotFound {
                property: "Part".into(),
                name: "Widget".into()
            }]
        );
        assert_eq!(
            recorder.invalid,
            vec![SchemaError::ReferenceNotFound(1).to_string()]
        );
    }

    #[test]
    fn resolution_limits_follow_config() {
        let mut recorder = Recorder::default();
        let config = EngineConfig {
            max_depth: 2,
            ..EngineConfig::default()
        };
        let text = json!({
            "Contract": { "type": "object", "properties": { "Start": { "$ref": "#/A" } } },
            "A": { "$ref": "#/B" },
            "B": { "$ref": "#/C" },
            "C": { "type": "string" }
        })
        .to_string();

        build_dictionary_with(&text, &config, &mut recorder);
        assert!(matches!(
            recorder.references.as_slice(),
            [ReferenceError::TooDeep { max: 2, .. }]
        ));
        assert_eq!(recorder.invalid.len(), 1);

        let mut recorder = Recorder::default();
        build_dictionary(&text, &mut recorder);
        assert!(recorder.references.is_empty());
    }

    #[test]
    fn resolver_is_skipped_without_references() {
        let mut recorder = Recorder::default();
        // "Loose" would be a reference error if the resolver ran.
        build_dictionary(
            r#"{"Contract":{"type":"object","properties":{"Loose":{}}}}"#,
            &mut recorder,
        );
        assert!(recorder.references.is_empty());
        assert!(recorder.invalid.is_empty());
    }
}
