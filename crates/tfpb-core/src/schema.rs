//! Schema declarations published to the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The data type of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Number,
    /// A list of objects, each with the given attributes.
    ListNested(BTreeMap<String, Attribute>),
}

/// Static default applied by the host when an optional attribute is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(u64),
    String(String),
}

/// One attribute of a provider, resource, or data source schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl Attribute {
    fn of(attr_type: AttributeType) -> Self {
        Self {
            attr_type,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::of(AttributeType::String)
    }

    pub fn bool() -> Self {
        Self::of(AttributeType::Bool)
    }

    pub fn number() -> Self {
        Self::of(AttributeType::Number)
    }

    pub fn list_nested(attributes: impl IntoIterator<Item = (&'static str, Attribute)>) -> Self {
        let nested = attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::of(AttributeType::ListNested(nested))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Check the flag combination the host accepts.
    ///
    /// Exactly one of required/optional/computed must hold, except that
    /// optional and computed may be combined. Defaults need optional+computed.
    pub fn check(&self) -> Result<(), String> {
        if self.required && (self.optional || self.computed) {
            return Err("required attributes cannot be optional or computed".into());
        }
        if !self.required && !self.optional && !self.computed {
            return Err("attribute must be required, optional, or computed".into());
        }
        if self.default.is_some() && !(self.optional && self.computed) {
            return Err("defaults need an optional and computed attribute".into());
        }
        if let AttributeType::ListNested(nested) = &self.attr_type {
            for (name, attr) in nested {
                attr.check().map_err(|e| format!("{name}: {e}"))?;
            }
        }
        Ok(())
    }
}

/// A full schema: named attributes plus a description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Validate every attribute, reporting the first offending name.
    pub fn check(&self) -> Result<(), String> {
        for (name, attr) in &self.attributes {
            attr.check().map_err(|e| format!("{name}: {e}"))?;
        }
        Ok(())
    }

    /// Names of attributes flagged sensitive.
    pub fn sensitive_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.sensitive)
            .map(|(n, _)| n.as_str())
            .collect()
    }
}
