//! Request parameter objects
//!
//! Each parameter type knows the path it targets and the JSON body it sends.

use crate::aggregation::{aggregations_to_json, Aggregation};
use crate::error::{Error, Result};
use crate::property::{properties_to_json, upsert_property, Property};
use crate::query::Query;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub const DEFAULT_SHARDS: u32 = 5;
pub const DEFAULT_REPLICAS: u32 = 1;
pub const DEFAULT_FROM: u64 = 0;
pub const DEFAULT_SIZE: u64 = 10;

/// Join index names, ids and endpoint names into a request path.
///
/// Every segment is percent-encoded on its own, so `/`, `?`, `#` and `%`
/// inside an id stay part of that id. Empty, `.` and `..` segments are
/// rejected because URL resolution would drop them or climb a level.
pub fn encode_path<S: AsRef<str>>(segments: &[S]) -> Result<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| Error::Config(format!("cannot build request path: {}", e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::Config("cannot build request path".to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(Error::Validation(format!(
                    "'{}' is not a usable index name or document id",
                    segment
                )));
            }
            path.push(segment);
        }
    }
    Ok(url.path().to_string())
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings and mapping for a new index
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexParam {
    number_of_shards: u32,
    number_of_replicas: u32,
    properties: Vec<Property>,
}

impl Default for CreateIndexParam {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS, DEFAULT_REPLICAS)
    }
}

impl CreateIndexParam {
    pub fn new(number_of_shards: u32, number_of_replicas: u32) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
            properties: Vec::new(),
        }
    }

    /// Add a top-level field, replacing one with the same name
    pub fn add_property(mut self, property: Property) -> Self {
        upsert_property(&mut self.properties, property);
        self
    }

    pub fn number_of_shards(&self) -> u32 {
        self.number_of_shards
    }

    pub fn number_of_replicas(&self) -> u32 {
        self.number_of_replicas
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "settings".into(),
            json!({
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas,
            }),
        );
        if !self.properties.is_empty() {
            body.insert(
                "mappings".into(),
                json!({"_doc": {"properties": properties_to_json(&self.properties)}}),
            );
        }
        Value::Object(body)
    }
}

/// Fields to add to an existing index mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutMappingParam {
    properties: Vec<Property>,
}

impl PutMappingParam {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property(mut self, property: Property) -> Self {
        upsert_property(&mut self.properties, property);
        self
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn to_json(&self) -> Value {
        json!({"properties": properties_to_json(&self.properties)})
    }
}

/// A search request: query, sort, paging and aggregations
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParam {
    index: String,
    query: Option<Query>,
    sort: Vec<(String, SortOrder)>,
    from: u64,
    size: u64,
    aggregations: Vec<Aggregation>,
}

impl SearchParam {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: None,
            sort: Vec::new(),
            from: DEFAULT_FROM,
            size: DEFAULT_SIZE,
            aggregations: Vec::new(),
        }
    }

    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sort on a field. Sorting again on the same field replaces the earlier
    /// entry without moving it.
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        let field = field.into();
        match self.sort.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = order,
            None => self.sort.push((field, order)),
        }
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = from;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Add a top-level aggregation, replacing one with the same name
    pub fn aggregation(mut self, agg: impl Into<Aggregation>) -> Self {
        let agg = agg.into();
        match self.aggregations.iter_mut().find(|a| a.name() == agg.name()) {
            Some(existing) => *existing = agg,
            None => self.aggregations.push(agg),
        }
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn path(&self) -> Result<String> {
        encode_path(&[self.index.as_str(), "_search"])
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(query) = &self.query {
            body.insert("query".into(), query.to_json());
        }
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|(field, order)| json!({ field.as_str(): order.as_str() }))
                .collect();
            body.insert("sort".into(), Value::Array(sort));
        }
        body.insert("from".into(), Value::from(self.from));
        body.insert("size".into(), Value::from(self.size));
        if !self.aggregations.is_empty() {
            body.insert("aggs".into(), aggregations_to_json(&self.aggregations));
        }
        Value::Object(body)
    }
}

/// Store a document, with a caller-chosen or server-assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexParam {
    pub index: String,
    pub id: Option<String>,
}

impl IndexParam {
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: Some(id.into()),
        }
    }

    /// Let the service pick the document id
    pub fn auto_id(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: None,
        }
    }

    pub fn path(&self) -> Result<String> {
        match &self.id {
            Some(id) => encode_path(&[self.index.as_str(), "_doc", id.as_str()]),
            None => encode_path(&[self.index.as_str(), "_doc"]),
        }
    }
}

macro_rules! document_param {
    ($(#[$meta:meta])* $name:ident, [$($suffix:expr),*]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub index: String,
            pub id: String,
        }

        impl $name {
            pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
                Self {
                    index: index.into(),
                    id: id.into(),
                }
            }

            pub fn path(&self) -> Result<String> {
                encode_path(&[self.index.as_str(), "_doc", self.id.as_str() $(, $suffix)*])
            }
        }
    };
}

document_param!(
    /// Fetch one document by id
    GetParam,
    []
);
document_param!(
    /// Remove one document by id
    DeleteParam,
    []
);
document_param!(
    /// Partially update one document by id
    UpdateParam,
    ["_update"]
);
