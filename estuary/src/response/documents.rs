//! Document CRUD responses
//!
//! Every field is optional on the wire and defaults when absent.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result token reported for a missing document
pub const RESULT_NOT_FOUND: &str = "not_found";

/// Per-shard outcome of a write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shards {
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
}

/// Response to a document write (index, update or delete)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_primary_term")]
    pub primary_term: u64,
    #[serde(rename = "_seq_no")]
    pub seq_no: i64,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_shards")]
    pub shards: Shards,
    #[serde(rename = "_version")]
    pub version: i64,
    /// Status token such as `created`, `updated`, `deleted` or `not_found`
    pub result: String,
}

pub type IndexResponse = WriteResponse;
pub type UpdateResponse = WriteResponse;
pub type DeleteResponse = WriteResponse;

impl WriteResponse {
    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }

    pub fn is_not_found(&self) -> bool {
        self.result == RESULT_NOT_FOUND
    }
}

/// Response to fetching one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_primary_term")]
    pub primary_term: u64,
    #[serde(rename = "_seq_no")]
    pub seq_no: i64,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_version")]
    pub version: i64,
    /// Raw stored document
    #[serde(rename = "_source")]
    pub source: Value,
    pub found: bool,
}

impl GetResponse {
    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }

    /// Deserialize the stored document into a caller type
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.source.clone()).map_err(Error::from)
    }
}
