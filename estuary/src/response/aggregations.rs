//! Aggregation results
//!
//! The wire format has no discriminator between bucket and metric results,
//! so the variant is picked from the keys that are present.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const BUCKET_MARKERS: [&str; 3] = ["doc_count_error_upper_bound", "sum_other_doc_count", "buckets"];

/// One parsed aggregation result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregationsResponse {
    Bucket(BucketAggregationsResponse),
    Metrics(MetricsAggregationsResponse),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketAggregationsResponse {
    pub name: String,
    pub doc_count_error_upper_bound: i64,
    pub sum_other_doc_count: i64,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
    /// Nested aggregation results, by name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aggregations: BTreeMap<String, AggregationsResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsAggregationsResponse {
    pub name: String,
    /// `None` when the server reports `null`, e.g. an average over no documents
    pub value: Option<f64>,
}

impl AggregationsResponse {
    /// Parse a single `{name: result}` object.
    ///
    /// Any other number of top-level keys is a malformed response.
    pub fn from_json(json: &Value) -> Result<Self> {
        let map = json.as_object().ok_or_else(|| {
            Error::MalformedResponse("aggregation result is not a JSON object".to_string())
        })?;
        if map.len() != 1 {
            return Err(Error::MalformedResponse(format!(
                "aggregation result must have exactly one key, found {}",
                map.len()
            )));
        }
        let (name, content) = map
            .iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("empty aggregation result".to_string()))?;
        Self::parse_named(name, content)
    }

    /// Parse the `aggregations` object of a search response, which holds
    /// several named results side by side
    pub fn parse_all(json: &Value) -> Result<BTreeMap<String, AggregationsResponse>> {
        let mut out = BTreeMap::new();
        if let Some(map) = json.as_object() {
            for (name, content) in map.iter().filter(|(_, v)| v.is_object()) {
                out.insert(name.clone(), Self::parse_named(name, content)?);
            }
        }
        Ok(out)
    }

    pub fn name(&self) -> &str {
        match self {
            AggregationsResponse::Bucket(b) => &b.name,
            AggregationsResponse::Metrics(m) => &m.name,
        }
    }

    pub fn as_bucket(&self) -> Option<&BucketAggregationsResponse> {
        match self {
            AggregationsResponse::Bucket(b) => Some(b),
            AggregationsResponse::Metrics(_) => None,
        }
    }

    pub fn as_metrics(&self) -> Option<&MetricsAggregationsResponse> {
        match self {
            AggregationsResponse::Metrics(m) => Some(m),
            AggregationsResponse::Bucket(_) => None,
        }
    }

    fn parse_named(name: &str, content: &Value) -> Result<Self> {
        let is_bucket = BUCKET_MARKERS.iter().all(|k| content.get(*k).is_some());
        if !is_bucket {
            return Ok(AggregationsResponse::Metrics(MetricsAggregationsResponse {
                name: name.to_string(),
                value: content.get("value").and_then(Value::as_f64),
            }));
        }

        let buckets = match content.get("buckets").and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(Value::as_object)
                .map(parse_bucket)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(AggregationsResponse::Bucket(BucketAggregationsResponse {
            name: name.to_string(),
            doc_count_error_upper_bound: content
                .get("doc_count_error_upper_bound")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            sum_other_doc_count: content
                .get("sum_other_doc_count")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            buckets,
        }))
    }
}

fn parse_bucket(bucket: &Map<String, Value>) -> Result<Bucket> {
    let key = match bucket.get("key") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let doc_count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);

    let mut aggregations = BTreeMap::new();
    for (name, content) in bucket {
        if name == "key" || name == "doc_count" || !content.is_object() {
            continue;
        }
        aggregations.insert(
            name.clone(),
            AggregationsResponse::parse_named(name, content)?,
        );
    }

    Ok(Bucket {
        key,
        doc_count,
        aggregations,
    })
}
