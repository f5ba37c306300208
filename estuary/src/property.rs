//! Field mapping model
//!
//! A [`Property`] describes one field of an index mapping. Scalar properties
//! carry a [`PropertyType`]; object properties (type `none`) carry nested
//! sub-properties instead.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Analyzer assigned to text fields when none is given
pub const DEFAULT_ANALYZER: &str = "standard";

/// Field type vocabulary understood by the mapping API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Object property holding sub-properties
    None,
    Text,
    Keyword,
    Long,
    Integer,
    Short,
    Byte,
    Double,
    Float,
    Boolean,
    Date,
}

impl PropertyType {
    pub const ALL: [PropertyType; 11] = [
        PropertyType::None,
        PropertyType::Text,
        PropertyType::Keyword,
        PropertyType::Long,
        PropertyType::Integer,
        PropertyType::Short,
        PropertyType::Byte,
        PropertyType::Double,
        PropertyType::Float,
        PropertyType::Boolean,
        PropertyType::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::None => "none",
            PropertyType::Text => "text",
            PropertyType::Keyword => "keyword",
            PropertyType::Long => "long",
            PropertyType::Integer => "integer",
            PropertyType::Short => "short",
            PropertyType::Byte => "byte",
            PropertyType::Double => "double",
            PropertyType::Float => "float",
            PropertyType::Boolean => "boolean",
            PropertyType::Date => "date",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PropertyType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown property type: {}", s)))
    }
}

/// One field of an index mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    property_type: PropertyType,
    index: bool,
    analyzer: Option<String>,
    properties: Vec<Property>,
}

impl Property {
    /// Object property. Not indexed by default.
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::None,
            index: false,
            analyzer: None,
            properties: Vec::new(),
        }
    }

    /// Indexed property of the given type. Text fields get the standard analyzer.
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        let analyzer = match property_type {
            PropertyType::Text => Some(DEFAULT_ANALYZER.to_string()),
            _ => None,
        };
        Self {
            name: name.into(),
            property_type,
            index: true,
            analyzer,
            properties: Vec::new(),
        }
    }

    /// Indexed property with an explicit analyzer
    pub fn with_analyzer(
        name: impl Into<String>,
        property_type: PropertyType,
        analyzer: impl Into<String>,
    ) -> Self {
        let name = name.into();
        if property_type != PropertyType::Text {
            tracing::warn!(
                "analyzer set on {} property '{}' which does not use one",
                property_type,
                name
            );
        }
        Self {
            name,
            property_type,
            index: true,
            analyzer: Some(analyzer.into()),
            properties: Vec::new(),
        }
    }

    /// Set whether the field is indexed
    pub fn indexed(mut self, index: bool) -> Self {
        self.index = index;
        self
    }

    /// Add a child to an object property.
    ///
    /// A child with the same name as an existing one replaces it in place.
    pub fn add_sub_property(&mut self, sub_property: Property) -> Result<&mut Self> {
        if self.property_type != PropertyType::None {
            return Err(Error::Validation(format!(
                "property '{}' of type {} cannot have children",
                self.name, self.property_type
            )));
        }
        match self
            .properties
            .iter_mut()
            .find(|p| p.name == sub_property.name)
        {
            Some(existing) => *existing = sub_property,
            None => self.properties.push(sub_property),
        }
        Ok(self)
    }

    /// Chaining form of [`Property::add_sub_property`]
    pub fn sub_property(mut self, sub_property: Property) -> Result<Self> {
        self.add_sub_property(sub_property)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn is_indexed(&self) -> bool {
        self.index
    }

    /// Analyzer, reported only for text fields
    pub fn analyzer(&self) -> Option<&str> {
        match self.property_type {
            PropertyType::Text => self.analyzer.as_deref(),
            _ => None,
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Wire form of this property's mapping, without its name
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if self.property_type == PropertyType::None {
            body.insert("properties".into(), properties_to_json(&self.properties));
            return Value::Object(body);
        }
        body.insert("type".into(), Value::from(self.property_type.as_str()));
        if let Some(analyzer) = self.analyzer() {
            body.insert("analyzer".into(), Value::from(analyzer));
        }
        if !self.index {
            body.insert("index".into(), Value::Bool(false));
        }
        Value::Object(body)
    }

    /// Rebuild a property from its mapping as returned by the service
    pub fn from_json(name: &str, json: &Value) -> Result<Self> {
        if let Some(children) = json.get("properties").and_then(Value::as_object) {
            let mut property = Property::object(name);
            for (child_name, child) in children {
                property.add_sub_property(Property::from_json(child_name, child)?)?;
            }
            return Ok(property);
        }

        let property_type: PropertyType = json
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("none")
            .parse()?;
        let index = json.get("index").and_then(Value::as_bool).unwrap_or(true);

        let property = match property_type {
            PropertyType::None => Property::object(name),
            PropertyType::Text => {
                let analyzer = json
                    .get("analyzer")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_ANALYZER);
                Property::with_analyzer(name, PropertyType::Text, analyzer).indexed(index)
            }
            other => Property::new(name, other).indexed(index),
        };
        Ok(property)
    }
}

/// `{name: mapping, ...}` object for a list of properties
pub(crate) fn properties_to_json(properties: &[Property]) -> Value {
    let map: Map<String, Value> = properties
        .iter()
        .map(|p| (p.name.clone(), p.to_json()))
        .collect();
    Value::Object(map)
}

/// Parse a `{name: mapping, ...}` object back into properties
pub(crate) fn properties_from_json(json: &Value) -> Result<Vec<Property>> {
    match json.as_object() {
        Some(map) => map
            .iter()
            .map(|(name, mapping)| Property::from_json(name, mapping))
            .collect(),
        None => Ok(Vec::new()),
    }
}

/// Insert or replace a property by name, keeping its position
pub(crate) fn upsert_property(properties: &mut Vec<Property>, property: Property) {
    match properties.iter_mut().find(|p| p.name == property.name) {
        Some(existing) => *existing = property,
        None => properties.push(property),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_string_roundtrip() {
        for t in PropertyType::ALL {
            assert_eq!(t.as_str().parse::<PropertyType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_type_string_fails() {
        let err = "geo_point".parse::<PropertyType>().unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("geo_point")));
    }

    #[test]
    fn test_defaults() {
        let object = Property::object("name");
        assert_eq!(object.property_type(), PropertyType::None);
        assert!(!object.is_indexed());

        let text = Property::new("title", PropertyType::Text);
        assert!(text.is_indexed());
        assert_eq!(text.analyzer(), Some("standard"));

        let keyword = Property::new("tag", PropertyType::Keyword);
        assert_eq!(keyword.analyzer(), None);
    }

    #[test]
    fn test_sub_property_on_object() {
        let mut object = Property::object("name");
        object
            .add_sub_property(Property::new("first", PropertyType::Text))
            .unwrap()
            .add_sub_property(Property::new("last", PropertyType::Keyword))
            .unwrap();
        assert_eq!(object.properties().len(), 2);
    }

    #[test]
    fn test_sub_property_on_scalar_fails() {
        for t in PropertyType::ALL.iter().filter(|t| **t != PropertyType::None) {
            let mut scalar = Property::new("field", *t);
            let err = scalar
                .add_sub_property(Property::new("child", PropertyType::Long))
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
            assert!(scalar.properties().is_empty());
        }
    }

    #[test]
    fn test_same_name_child_replaces_in_place() {
        let object = Property::object("name")
            .sub_property(Property::new("a", PropertyType::Text))
            .unwrap()
            .sub_property(Property::new("b", PropertyType::Long))
            .unwrap()
            .sub_property(Property::new("a", PropertyType::Keyword))
            .unwrap();
        let names: Vec<_> = object.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(object.properties()[0].property_type(), PropertyType::Keyword);
    }

    #[test]
    fn test_scalar_wire_form() {
        assert_eq!(
            Property::new("title", PropertyType::Text).to_json(),
            json!({"type": "text", "analyzer": "standard"})
        );
        assert_eq!(
            Property::new("email", PropertyType::Keyword)
                .indexed(false)
                .to_json(),
            json!({"type": "keyword", "index": false})
        );
    }

    #[test]
    fn test_analyzer_omitted_for_non_text() {
        let p = Property::with_analyzer("count", PropertyType::Long, "ik_smart");
        assert_eq!(p.to_json(), json!({"type": "long"}));
    }

    #[test]
    fn test_object_wire_form_has_no_type() {
        let first = Property::with_analyzer("first", PropertyType::Text, "ik_smart").indexed(false);
        let object = Property::object("name").sub_property(first).unwrap();
        assert_eq!(
            object.to_json(),
            json!({"properties": {
                "first": {"type": "text", "analyzer": "ik_smart", "index": false}
            }})
        );
    }

    #[test]
    fn test_parse_text_without_analyzer_uses_standard() {
        let p = Property::from_json("info", &json!({"type": "text"})).unwrap();
        assert_eq!(p.analyzer(), Some("standard"));
        assert!(p.is_indexed());
    }

    #[test]
    fn test_parse_nested_object() {
        let p = Property::from_json(
            "user",
            &json!({"properties": {
                "address": {"properties": {"city": {"type": "keyword"}}},
                "age": {"type": "integer", "index": false}
            }}),
        )
        .unwrap();
        assert_eq!(p.property_type(), PropertyType::None);
        let address = p.properties().iter().find(|c| c.name() == "address").unwrap();
        assert_eq!(address.properties()[0].name(), "city");
        let age = p.properties().iter().find(|c| c.name() == "age").unwrap();
        assert!(!age.is_indexed());
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        assert!(Property::from_json("loc", &json!({"type": "geo_point"})).is_err());
    }
}
