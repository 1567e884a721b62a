//! `$ref` substitution over a schema dictionary.
//!
//! Resolution is best effort: every broken reference is collected and the
//! walk continues with the next property. Substitution always installs a
//! structural copy of the target, so no two slots share a node.

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dictionary::{SchemaDictionary, CONTRACT};
use crate::names::{same_name, NameMap};
use crate::node::{SchemaNode, REFERENCE_PREFIX};
use crate::vocab::DataType;

/// A reference that could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// The node has no usable type and no `$ref` either.
    #[error("property {property:?} has neither a type nor a reference")]
    Missing { property: String },

    /// The `$ref` does not have the `#/Name` form.
    #[error("property {property:?} has malformed reference {reference:?}")]
    Malformed { property: String, reference: String },

    /// The `$ref` names a schema that is not defined.
    #[error("property {property:?} references undefined schema {name:?}")]
    NotFound { property: String, name: String },

    /// The `$ref` leads back to a schema that is already being expanded.
    #[error("property {property:?} references {name:?} cyclically")]
    Cycle { property: String, name: String },

    /// Substitution at this property would nest deeper than allowed.
    #[error("property {property:?} nests references deeper than {max}")]
    TooDeep { property: String, max: usize },

    /// The contract expands to more nodes than allowed.
    #[error("expanding property {property:?} exceeds {limit} nodes")]
    TooLarge { property: String, limit: usize },
}

/// Outcome of one resolution pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    errors: Vec<ReferenceError>,
}

impl Resolution {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ReferenceError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ReferenceError> {
        self.errors
    }
}

/// Resolve every reference reachable from the `Contract` entry in place.
pub fn resolve_references(dictionary: &mut SchemaDictionary) -> Resolution {
    resolve_references_with(dictionary, &EngineConfig::default())
}

/// Like [`resolve_references`], bounded by the depth and node limits of `config`.
pub fn resolve_references_with(
    dictionary: &mut SchemaDictionary,
    config: &EngineConfig,
) -> Resolution {
    let Some((contract_name, contract)) = dictionary.get_entry(CONTRACT) else {
        return Resolution::default();
    };
    let contract_name = contract_name.to_string();
    let mut contract = contract.clone();

    let mut resolver = Resolver {
        dictionary: &*dictionary,
        chain: vec![contract_name.clone()],
        errors: Vec::new(),
        max_depth: config.max_depth,
        depth: 0,
        max_nodes: config.max_expanded_nodes,
        node_budget: config.max_expanded_nodes,
        exhausted: false,
    };
    if let Some(properties) = contract.properties.as_mut() {
        resolver.resolve_properties(properties);
    }
    let errors = resolver.errors;

    dictionary.insert(contract_name, contract);
    Resolution { errors }
}

struct Resolver<'a> {
    dictionary: &'a SchemaDictionary,
    /// Schema names currently being expanded, outermost first.
    chain: Vec<String>,
    errors: Vec<ReferenceError>,
    max_depth: usize,
    depth: usize,
    max_nodes: usize,
    /// Weight still allowed to be copied before expansion stops.
    node_budget: usize,
    exhausted: bool,
}

impl Resolver<'_> {
    fn resolve_properties(&mut self, properties: &mut NameMap<SchemaNode>) {
        for (name, property) in properties.iter_mut() {
            self.resolve_property(name, property);
        }
    }

    fn resolve_property(&mut self, name: &str, property: &mut SchemaNode) {
        if self.exhausted {
            return;
        }
        if self.depth >= self.max_depth {
            self.record(ReferenceError::TooDeep {
                property: name.to_string(),
                max: self.max_depth,
            });
            return;
        }

        self.depth += 1;
        self.expand(name, property);
        self.depth -= 1;
    }

    fn expand(&mut self, name: &str, property: &mut SchemaNode) {
        if let Some(children) = property.properties.as_mut() {
            self.resolve_properties(children);
        }

        if property.data_type() == Some(DataType::Array) {
            let Some(items) = property.items.as_mut() else {
                return;
            };
            if items.type_name().is_some() {
                self.resolve_property(name, items);
                return;
            }
            if let Some(resolved) = self.substitute(name, items) {
                **items = resolved;
            }
            return;
        }

        if property.type_name().is_some() {
            return;
        }
        if let Some(resolved) = self.substitute(name, property) {
            *property = resolved;
        }
    }

    /// Build a fresh node from the schema `node` refers to.
    fn substitute(&mut self, property: &str, node: &SchemaNode) -> Option<SchemaNode> {
        let target_name = self.target_name(property, node)?;
        let dictionary = self.dictionary;

        let Some(target) = dictionary.get(&target_name) else {
            self.record(ReferenceError::NotFound {
                property: property.to_string(),
                name: target_name,
            });
            return None;
        };
        if self.chain.iter().any(|open| same_name(open, &target_name)) {
            self.record(ReferenceError::Cycle {
                property: property.to_string(),
                name: target_name,
            });
            return None;
        }

        let weight = target.weight();
        if weight > self.node_budget {
            self.exhausted = true;
            self.record(ReferenceError::TooLarge {
                property: property.to_string(),
                limit: self.max_nodes,
            });
            return None;
        }
        self.node_budget -= weight;

        self.chain.push(target_name.clone());
        let mut shape = target.clone();
        self.resolve_property(property, &mut shape);
        self.chain.pop();

        debug!(property, reference = %target_name, "substituted reference");
        Some(SchemaNode {
            kind: shape.kind,
            properties: shape.properties,
            items: shape.items,
            max_items: shape.max_items,
            min_items: shape.min_items,
            max_length: shape.max_length,
            min_length: shape.min_length,
            pattern: shape.pattern,
            format: shape.format,
            example: node.example.clone().or(shape.example),
            reference: Some(target_name),
        })
    }

    fn target_name(&mut self, property: &str, node: &SchemaNode) -> Option<String> {
        if !node.carries_reference() {
            self.record(ReferenceError::Missing {
                property: property.to_string(),
            });
            return None;
        }
        let reference = node.reference.as_deref().unwrap_or_default();
        match reference.strip_prefix(REFERENCE_PREFIX) {
            Some(name) if !name.trim().is_empty() => Some(name.to_string()),
            _ => {
                self.record(ReferenceError::Malformed {
                    property: property.to_string(),
                    reference: reference.to_string(),
                });
                None
            }
        }
    }

    fn record(&mut self, error: ReferenceError) {
        warn!(%error, "unresolved reference");
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dictionary::tests::dictionary_from;

    fn contract_property<'a>(dictionary: &'a SchemaDictionary, name: &str) -> &'a SchemaNode {
        dictionary
            .contract()
            .and_then(|contract| contract.properties.as_ref())
            .and_then(|properties| properties.get(name))
            .unwrap()
    }

    #[test]
    fn substitutes_scalar_reference_with_copy() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": { "Owner": { "$ref": "#/guid" } }
            },
            "Guid": { "type": "string", "format": "guid", "maxLength": 36, "example": "x" }
        }));

        let resolution = resolve_references(&mut dictionary);
        assert!(!resolution.has_errors());

        let owner = contract_property(&dictionary, "owner");
        assert_eq!(owner.type_name(), Some("string"));
        assert_eq!(owner.format.as_deref(), Some("guid"));
        assert_eq!(owner.max_length, Some(36));
        assert_eq!(owner.reference.as_deref(), Some("guid"));
        assert_eq!(owner.example, Some(json!("x")));
        // target entry is untouched
        assert_eq!(dictionary.get("Guid").unwrap().reference, None);
    }

    #[test]
    fn own_example_wins_over_target_example() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": { "Owner": { "$ref": "#/Guid", "example": "mine" } }
            },
            "Guid": { "type": "string", "example": "theirs" }
        }));

        resolve_references(&mut dictionary);
        assert_eq!(
            contract_property(&dictionary, "Owner").example,
            Some(json!("mine"))
        );
    }

    #[test]
    fn array_items_reference_is_installed_on_items() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": {
                    "Lines": { "type": "array", "items": { "$ref": "#/Line" } }
                }
            },
            "Line": {
                "type": "object",
                "properties": { "Sku": { "type": "string" } }
            }
        }));

        let resolution = resolve_references(&mut dictionary);
        assert!(!resolution.has_errors());

        let lines = contract_property(&dictionary, "Lines");
        assert_eq!(lines.type_name(), Some("array"));
        let items = lines.items.as_ref().unwrap();
        assert_eq!(items.type_name(), Some("object"));
        assert_eq!(items.reference.as_deref(), Some("Line"));
        assert!(items.properties.as_ref().unwrap().contains_key("sku"));
    }

    #[test]
    fn array_without_items_is_lenient() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": {
                    "Tags": { "type": "array" },
                    "Ref": { "$ref": "#/Guid" }
                }
            },
            "Guid": { "type": "string" }
        }));

        assert!(!resolve_references(&mut dictionary).has_errors());
    }

    #[test]
    fn collects_every_broken_reference_in_one_pass() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": {
                    "A": { "$ref": "#/Widget" },
                    "B": { "$ref": "Guid" },
                    "C": { "description": "nothing" },
                    "D": { "$ref": "#/Guid" }
                }
            },
            "Guid": { "type": "string" }
        }));

        let resolution = resolve_references(&mut dictionary);
        assert_eq!(
            resolution.errors(),
            &[
                ReferenceError::NotFound {
                    property: "A".into(),
                    name: "Widget".into()
                },
                ReferenceError::Malformed {
                    property: "B".into(),
                    reference: "Guid".into()
                },
                ReferenceError::Missing {
                    property: "C".into()
                },
            ]
        );

        // later siblings are still resolved
        assert_eq!(
            contract_property(&dictionary, "D").type_name(),
            Some("string")
        );
        // broken ones stay as they were
        assert_eq!(
            contract_property(&dictionary, "A").reference.as_deref(),
            Some("#/Widget")
        );
    }

    #[test]
    fn nested_object_children_are_resolved() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": {
                    "Header": {
                        "type": "object",
                        "properties": { "Id": { "$ref": "#/Guid" } }
                    }
                }
            },
            "Guid": { "type": "string" }
        }));

        assert!(!resolve_references(&mut dictionary).has_errors());
        let header = contract_property(&dictionary, "Header");
        let id = header.properties.as_ref().unwrap().get("Id").unwrap();
        assert_eq!(id.type_name(), Some("string"));
    }

    #[test]
    fn reference_chains_resolve_through_aliases() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": { "Owner": { "$ref": "#/OwnerId" } }
            },
            "OwnerId": { "$ref": "#/Guid" },
            "Guid": { "type": "string" }
        }));

        assert!(!resolve_references(&mut dictionary).has_errors());
        let owner = contract_property(&dictionary, "Owner");
        assert_eq!(owner.type_name(), Some("string"));
        assert_eq!(owner.reference.as_deref(), Some("OwnerId"));
    }

    #[test]
    fn cycles_are_reported_instead_of_recursing() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": { "Start": { "$ref": "#/A" } }
            },
            "A": { "type": "object", "properties": { "ToB": { "$ref": "#/B" } } },
            "B": { "type": "object", "properties": { "ToA": { "$ref": "#/A" } } }
        }));

        let resolution = resolve_references(&mut dictionary);
        assert_eq!(
            resolution.errors(),
            &[ReferenceError::Cycle {
                property: "ToA".into(),
                name: "A".into()
            }]
        );

        let start = contract_property(&dictionary, "Start");
        assert_eq!(start.type_name(), Some("object"));
    }

    #[test]
    fn reference_back_to_contract_is_a_cycle() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": { "Parent": { "$ref": "#/contract" } }
            }
        }));

        let resolution = resolve_references(&mut dictionary);
        assert!(matches!(
            resolution.errors(),
            [ReferenceError::Cycle { .. }]
        ));
    }

    #[test]
    fn resolving_twice_reports_nothing_new() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": {
                    "Owner": { "$ref": "#/Guid" },
                    "Refs": { "type": "array", "items": { "$ref": "#/Guid" } }
                }
            },
            "Guid": { "type": "string" }
        }));

        assert!(!resolve_references(&mut dictionary).has_errors());
        let once = dictionary.clone();
        assert!(!resolve_references(&mut dictionary).has_errors());
        assert_eq!(dictionary, once);
    }

    #[test]
    fn nested_array_items_are_resolved() {
        let mut dictionary = dictionary_from(json!({
            "Contract": {
                "type": "object",
                "properties": {
                    "Grid": {
                        "type": "array",
                        "items": { "type": "array", "items": { "$ref": "#/Line" } }
                    },
                    "Broken": {
                        "type": "array",
                        "items": { "type": "array", "items": { "$ref": "#/Nope" } }
                    }
                }
            },
            "Line": { "type": "object", "properties": { "Qty": { "type": "integer" } } }
        }));

        let resolution = resolve_references(&mut dictionary);
        assert_eq!(
            resolution.errors(),
            &[ReferenceError::NotFound {
                property: "Broken".into(),
                name: "Nope".into()
            }]
        );

        let grid = contract_property(&dictionary, "Grid");
        let inner = grid.items.as_ref().and_then(|rows| rows.items.as_ref()).unwrap();
        assert_eq!(inner.type_name(), Some("object"));
        assert_eq!(inner.reference.as_deref(), Some("Line"));
    }

    fn alias_chain(length: usize) -> SchemaDictionary {
        let mut schemas = serde_json::Map::new();
        schemas.insert(
            "Contract".into(),
            json!({ "type": "object", "properties": { "Start": { "$ref": "#/S0" } } }),
        );
        for index in 0..length {
            schemas.insert(format!("S{index}"), json!({ "$ref": format!("#/S{}", index + 1) }));
        }
        schemas.insert(format!("S{length}"), json!({ "type": "string" }));
        dictionary_from(serde_json::Value::Object(schemas))
    }

    #[test]
    fn long_alias_chain_stops_at_depth_limit() {
        let mut dictionary = alias_chain(1000);

        let resolution = resolve_references(&mut dictionary);
        assert_eq!(
            resolution.errors(),
            &[ReferenceError::TooDeep {
                property: "Start".into(),
                max: EngineConfig::default().max_depth
            }]
        );

        let mut short = alias_chain(10);
        assert!(!resolve_references(&mut short).has_errors());
        assert_eq!(contract_property(&short, "Start").type_name(), Some("string"));
    }

    #[test]
    fn shared_targets_stop_expanding_at_node_limit() {
        let levels = 25;
        let mut schemas = serde_json::Map::new();
        schemas.insert(
            "Contract".into(),
            json!({ "type": "object", "properties": { "Root": { "$ref": "#/S0" } } }),
        );
        for index in 0..levels {
            let next = format!("#/S{}", index + 1);
            schemas.insert(
                format!("S{index}"),
                json!({
                    "type": "object",
                    "properties": { "Left": { "$ref": &next }, "Right": { "$ref": &next } }
                }),
            );
        }
        schemas.insert(format!("S{levels}"), json!({ "type": "string" }));
        let mut dictionary = dictionary_from(serde_json::Value::Object(schemas));

        let config = EngineConfig {
            max_expanded_nodes: 1_000,
            ..EngineConfig::default()
        };
        let resolution = resolve_references_with(&mut dictionary, &config);
        assert!(matches!(
            resolution.errors(),
            [ReferenceError::TooLarge { limit: 1_000, .. }]
        ));

        let rendered = serde_json::to_string(&dictionary).unwrap();
        assert!(rendered.len() < 200_000, "{} bytes", rendered.len());
    }

    #[test]
    fn dictionary_without_contract_is_a_no_op() {
        let mut dictionary = dictionary_from(json!({ "Guid": { "type": "string" } }));
        assert!(!resolve_references(&mut dictionary).has_errors());
    }
}
