//! Index management responses

use super::error::{error_status, ErrorCause};
use crate::error::{Error, Result};
use crate::property::{properties_from_json, Property};
use crate::request::{DEFAULT_REPLICAS, DEFAULT_SHARDS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of creating an index. Which variant applies is decided by the
/// presence of an `error` member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CreateIndexResponse {
    Success(CreateIndexSuccessResponse),
    Failed(CreateIndexFailedResponse),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateIndexSuccessResponse {
    pub acknowledged: bool,
    pub shards_acknowledged: bool,
    pub index: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateIndexFailedResponse {
    pub error: ErrorCause,
    pub status: u16,
}

impl CreateIndexResponse {
    pub fn from_json(json: &Value) -> Self {
        match json.get("error") {
            Some(error) => CreateIndexResponse::Failed(CreateIndexFailedResponse {
                error: ErrorCause::from_json(error),
                status: error_status(json),
            }),
            None => CreateIndexResponse::Success(
                serde_json::from_value(json.clone()).unwrap_or_default(),
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CreateIndexResponse::Success(_))
    }

    /// Success payload, or the failure as a server error
    pub fn into_result(self) -> Result<CreateIndexSuccessResponse> {
        match self {
            CreateIndexResponse::Success(ok) => Ok(ok),
            CreateIndexResponse::Failed(failed) => Err(Error::Server {
                error_type: failed.error.error_type,
                reason: failed.error.reason,
                status: failed.status,
            }),
        }
    }
}

/// Index-level settings as reported by get-index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub creation_date: Option<DateTime<Utc>>,
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
    pub uuid: String,
    pub version_created: String,
    pub provided_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            creation_date: None,
            number_of_shards: DEFAULT_SHARDS,
            number_of_replicas: DEFAULT_REPLICAS,
            uuid: String::new(),
            version_created: String::new(),
            provided_name: String::new(),
        }
    }
}

/// Settings values arrive as strings; accept numbers too
fn loose_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn loose_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl Settings {
    /// Parse the `settings` member of a get-index entry
    pub fn from_json(json: &Value) -> Self {
        let index = json.get("index").unwrap_or(json);

        // creation_date is read as epoch seconds and scaled to milliseconds
        let creation_date = loose_u64(index.get("creation_date"))
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(DateTime::from_timestamp_millis);

        Self {
            creation_date,
            number_of_shards: loose_u64(index.get("number_of_shards"))
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_SHARDS),
            number_of_replicas: loose_u64(index.get("number_of_replicas"))
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_REPLICAS),
            uuid: loose_string(index.get("uuid")),
            version_created: loose_string(index.get("version").and_then(|v| v.get("created"))),
            provided_name: loose_string(index.get("provided_name")),
        }
    }
}

/// Aliases, mapping and settings of one index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetIndexResponse {
    pub aliases: Vec<String>,
    #[serde(serialize_with = "serialize_properties")]
    pub properties: Vec<Property>,
    pub settings: Settings,
}

fn serialize_properties<S: serde::Serializer>(
    properties: &[Property],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    crate::property::properties_to_json(properties).serialize(serializer)
}

impl GetIndexResponse {
    /// Parse the body of `GET /{index}`.
    ///
    /// The body is keyed by index name. When `index_name` is an alias the
    /// server answers under the concrete name, so a lone entry is taken as is.
    pub fn from_json(index_name: &str, body: &Value) -> Result<Self> {
        let map = body.as_object().ok_or_else(|| {
            Error::MalformedResponse("get-index body is not an object".to_string())
        })?;
        let entry = match map.get(index_name) {
            Some(entry) => Some(entry),
            None if map.len() == 1 => map.values().next(),
            None => None,
        };
        let entry = entry.ok_or_else(|| {
            Error::MalformedResponse(format!("get-index body has no entry for '{}'", index_name))
        })?;
        Self::from_entry(entry)
    }

    /// Parse one index entry (`{aliases, mappings, settings}`)
    pub fn from_entry(entry: &Value) -> Result<Self> {
        let aliases = entry
            .get("aliases")
            .and_then(Value::as_object)
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default();

        let mappings = entry.get("mappings");
        let properties = mappings
            .and_then(|m| m.get("_doc"))
            .and_then(|d| d.get("properties"))
            .or_else(|| mappings.and_then(|m| m.get("properties")));
        let properties = match properties {
            Some(p) => properties_from_json(p)?,
            None => Vec::new(),
        };

        let settings = entry
            .get("settings")
            .map(Settings::from_json)
            .unwrap_or_default();

        Ok(Self {
            aliases,
            properties,
            settings,
        })
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PutMappingResponse {
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteIndexResponse {
    pub acknowledged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyType;
    use serde_json::json;

    #[test]
    fn test_create_success() {
        let parsed = CreateIndexResponse::from_json(&json!({
            "acknowledged": true,
            "shards_acknowledged": true,
            "index": "books"
        }));
        assert!(parsed.is_success());
        let ok = parsed.into_result().unwrap();
        assert!(ok.acknowledged);
        assert_eq!(ok.index, "books");
    }

    #[test]
    fn test_create_failure() {
        let parsed = CreateIndexResponse::from_json(&json!({
            "error": {
                "root_cause": [],
                "type": "resource_already_exists_exception",
                "reason": "index [books/Xy] already exists",
                "index_uuid": "Xy",
                "index": "books"
            },
            "status": 400
        }));
        match &parsed {
            CreateIndexResponse::Failed(failed) => {
                assert_eq!(failed.error.error_type, "resource_already_exists_exception");
                assert_eq!(failed.error.index_uuid.as_deref(), Some("Xy"));
                assert_eq!(failed.status, 400);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(parsed.into_result().is_err());
    }

    #[test]
    fn test_create_failure_default_status() {
        let parsed = CreateIndexResponse::from_json(&json!({
            "error": {"type": "x", "reason": "y"}
        }));
        match parsed {
            CreateIndexResponse::Failed(failed) => assert_eq!(failed.status, 400),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    fn get_index_body() -> Value {
        json!({"books": {
            "aliases": {"library": {}},
            "mappings": {"_doc": {"properties": {
                "title": {"type": "text", "analyzer": "ik_max_word"},
                "isbn": {"type": "keyword", "index": false},
                "author": {"properties": {
                    "first": {"type": "text"},
                    "born": {"type": "date"}
                }}
            }}},
            "settings": {"index": {
                "creation_date": "1554796316",
                "number_of_shards": "3",
                "number_of_replicas": "2",
                "uuid": "RkD7mDEWRlKh5Ir-w2jwkQ",
                "version": {"created": "6070099"},
                "provided_name": "books"
            }}
        }})
    }

    #[test]
    fn test_get_index() {
        let parsed = GetIndexResponse::from_json("books", &get_index_body()).unwrap();
        assert_eq!(parsed.aliases, vec!["library".to_string()]);

        let title = parsed.property("title").unwrap();
        assert_eq!(title.analyzer(), Some("ik_max_word"));
        assert!(!parsed.property("isbn").unwrap().is_indexed());

        let author = parsed.property("author").unwrap();
        assert_eq!(author.property_type(), PropertyType::None);
        assert_eq!(author.properties().len(), 2);

        let settings = &parsed.settings;
        assert_eq!(settings.number_of_shards, 3);
        assert_eq!(settings.number_of_replicas, 2);
        assert_eq!(settings.version_created, "6070099");
        assert_eq!(
            settings.creation_date.unwrap().timestamp_millis(),
            1_554_796_316_000
        );
    }

    #[test]
    fn test_get_index_by_alias_takes_single_entry() {
        let parsed = GetIndexResponse::from_json("library", &get_index_body()).unwrap();
        assert_eq!(parsed.settings.provided_name, "books");
    }

    #[test]
    fn test_get_index_typeless_mapping_and_default_settings() {
        let body = json!({"logs": {
            "mappings": {"properties": {"level": {"type": "keyword"}}},
            "settings": {"index": {}}
        }});
        let parsed = GetIndexResponse::from_json("logs", &body).unwrap();
        assert_eq!(parsed.properties.len(), 1);
        assert_eq!(parsed.settings.number_of_shards, 5);
        assert_eq!(parsed.settings.number_of_replicas, 1);
        assert!(parsed.settings.creation_date.is_none());
        assert!(parsed.aliases.is_empty());
    }

    #[test]
    fn test_get_index_missing_entry() {
        let body = json!({"a": {}, "b": {}});
        assert!(GetIndexResponse::from_json("c", &body).is_err());
    }

    #[test]
    fn test_acknowledged_responses_default_false() {
        let put: PutMappingResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!put.acknowledged);
        let del: DeleteIndexResponse =
            serde_json::from_value(json!({"acknowledged": true})).unwrap();
        assert!(del.acknowledged);
    }
}
