//! Search responses

use super::aggregations::AggregationsResponse;
use super::documents::Shards;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One matching document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: T,
}

/// A page of hits plus aggregation results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse<T> {
    pub took: u64,
    pub timed_out: bool,
    pub shards: Shards,
    pub hits_total: u64,
    pub max_score: Option<f64>,
    pub hits: Vec<Hit<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<BTreeMap<String, AggregationsResponse>>,
}

/// `hits.total` is a bare count on older servers and `{"value": n}` on newer
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct WireHits<T> {
    total: Option<TotalHits>,
    #[serde(default)]
    max_score: Option<f64>,
    #[serde(default = "Vec::new")]
    hits: Vec<Hit<T>>,
}

impl<T> Default for WireHits<T> {
    fn default() -> Self {
        Self {
            total: None,
            max_score: None,
            hits: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct WireSearch<T> {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    timed_out: bool,
    #[serde(rename = "_shards", default)]
    shards: Shards,
    #[serde(default)]
    hits: WireHits<T>,
    #[serde(default)]
    aggregations: Option<Value>,
}

impl<T: DeserializeOwned> SearchResponse<T> {
    pub fn from_json(json: &Value) -> Result<Self> {
        let wire: WireSearch<T> = serde_json::from_value(json.clone())?;
        let aggregations = match &wire.aggregations {
            Some(aggs) => Some(AggregationsResponse::parse_all(aggs)?),
            None => None,
        };
        Ok(Self {
            took: wire.took,
            timed_out: wire.timed_out,
            shards: wire.shards,
            hits_total: match wire.hits.total {
                Some(TotalHits::Count(n)) | Some(TotalHits::Object { value: n }) => n,
                None => 0,
            },
            max_score: wire.hits.max_score,
            hits: wire.hits.hits,
            aggregations,
        })
    }
}

impl<T> SearchResponse<T> {
    /// Named aggregation result, if the search asked for it
    pub fn aggregation(&self, name: &str) -> Option<&AggregationsResponse> {
        self.aggregations.as_ref()?.get(name)
    }

    /// Stored documents, in hit order
    pub fn sources(&self) -> impl Iterator<Item = &T> {
        self.hits.iter().map(|h| &h.source)
    }
}
