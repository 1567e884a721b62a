use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::names::NameMap;
use crate::vocab::{DataType, Format};

/// Prefix every in-document reference starts with.
pub const REFERENCE_PREFIX: &str = "#/";

/// One schema definition or sub-schema of a contract.
///
/// `kind` and `format` keep the raw text from the contract so that values
/// outside the vocabularies can still be reported by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<NameMap<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SchemaNode {
    /// Parse one schema fragment from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| SchemaError::MalformedSchema {
            name: String::new(),
            source,
        })
    }

    /// Decode one schema fragment from an already parsed JSON value.
    pub fn from_value(name: &str, value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| SchemaError::MalformedSchema {
            name: name.to_string(),
            source,
        })
    }

    /// Declared type text; blank counts as absent.
    pub fn type_name(&self) -> Option<&str> {
        self.kind.as_deref().filter(|kind| !kind.trim().is_empty())
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.type_name().and_then(DataType::from_value)
    }

    pub fn format_name(&self) -> Option<&str> {
        self.format.as_deref().filter(|format| !format.trim().is_empty())
    }

    pub fn format_kind(&self) -> Option<Format> {
        self.format_name().and_then(Format::from_value)
    }

    /// True when a non-empty `$ref` is present.
    pub fn carries_reference(&self) -> bool {
        self.reference
            .as_deref()
            .is_some_and(|reference| !reference.trim().is_empty())
    }

    /// Referenced schema name, with a leading `#/` dropped when present.
    ///
    /// Unresolved nodes hold `#/Name`; resolved ones hold `Name`.
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(|reference| reference.strip_prefix(REFERENCE_PREFIX).unwrap_or(reference))
            .filter(|name| !name.trim().is_empty())
    }

    /// True if any property below this node, array items included, carries a `$ref`.
    pub fn has_reference_below(&self) -> bool {
        let in_properties = self.properties.as_ref().is_some_and(|properties| {
            properties
                .iter()
                .any(|(_, property)| property.carries_reference() || property.has_reference_below())
        });
        let in_items = self
            .items
            .as_ref()
            .is_some_and(|items| items.carries_reference() || items.has_reference_below());
        in_properties || in_items
    }

    /// Rough cost of copying this node: one unit per schema node, plus
    /// example values counted per element and per 64 bytes of text.
    pub fn weight(&self) -> usize {
        let properties: usize = self
            .properties
            .as_ref()
            .map_or(0, |properties| properties.iter().map(|(_, property)| property.weight()).sum());
        let items = self.items.as_ref().map_or(0, |items| items.weight());
        let example = self.example.as_ref().map_or(0, value_weight);
        1 + properties + items + example
    }

    /// Literal form of the example, or `None` when absent or empty.
    pub fn example_text(&self) -> Option<String> {
        match self.example.as_ref()? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Render this node as a JSON Schema usable for message validation.
    ///
    /// Only vocabulary types and formats are emitted. In strict mode object
    /// schemas reject undeclared properties.
    pub fn to_json_schema(&self, strict: bool) -> Value {
        let mut schema = Map::new();
        let data_type = self.data_type();

        if let Some(kind) = data_type {
            schema.insert("type".to_string(), Value::from(kind.value()));
        }
        if let Some(properties) = &self.properties {
            let rendered: Map<String, Value> = properties
                .iter()
                .map(|(name, property)| (name.to_string(), property.to_json_schema(strict)))
                .collect();
            schema.insert("properties".to_string(), Value::Object(rendered));
        }
        if strict && data_type == Some(DataType::Object) {
            schema.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        if let Some(items) = &self.items {
            schema.insert("items".to_string(), items.to_json_schema(strict));
        }

        let bounds = [
            ("maxItems", self.max_items),
            ("minItems", self.min_items),
            ("maxLength", self.max_length),
            ("minLength", self.min_length),
        ];
        for (keyword, bound) in bounds {
            if let Some(bound) = bound {
                schema.insert(keyword.to_string(), Value::from(bound));
            }
        }

        if let Some(pattern) = &self.pattern {
            schema.insert("pattern".to_string(), Value::from(pattern.as_str()));
        }
        if let Some(format) = self.format_kind() {
            schema.insert("format".to_string(), Value::from(format.value()));
        }

        Value::Object(schema)
    }
}

fn value_weight(value: &Value) -> usize {
    match value {
        Value::String(text) => 1 + text.len() / 64,
        Value::Array(values) => 1 + values.iter().map(value_weight).sum::<usize>(),
        Value::Object(entries) => {
            1 + entries
                .iter()
                .map(|(key, value)| key.len() / 64 + value_weight(value))
                .sum::<usize>()
        }
        _ => 1,
    }
}
