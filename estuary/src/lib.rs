//! Typed client for an Elasticsearch-style document search service
//!
//! Requests are built from typed parameter objects, sent through a
//! [`Transport`], and parsed back into typed responses.
//!
//! # Operations
//!
//! Indices ([`IndicesClient`]):
//! - `PUT /{index}` - create with settings and mapping
//! - `GET /{index}` - aliases, mapping and settings
//! - `PUT /{index}/_mapping/_doc` - add fields
//! - `DELETE /{index}`
//!
//! Documents ([`DocumentsClient`]):
//! - `POST /{index}/_doc/{id}` - index
//! - `GET /{index}/_doc/{id}` - get
//! - `POST /{index}/_doc/{id}/_update` - partial update
//! - `DELETE /{index}/_doc/{id}`
//! - `GET /{index}/_search` - query, sort, paging and aggregations
//!
//! Every operation is available as an async method, with success and
//! failure continuations (`*_with`), and as a blocking call (`*_blocking`).
//!
//! # Query DSL Support
//!
//! - `match_all` / `match` / `match_phrase` / `multi_match`
//! - `term` / `range`
//! - `bool` (must, should, must_not, filter)
//! - `geo_bounding_box` / `geo_distance`
//!
//! Supported aggregations:
//! - `terms` (with nested sub-aggregations)
//! - `avg`

pub mod aggregation;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod documents;
pub mod error;
pub mod indices;
pub mod property;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

pub use aggregation::{Aggregation, AvgAggregation, TermsAggregation};
pub use client::Client;
pub use config::ClientConfig;
pub use dispatch::Dispatcher;
pub use documents::DocumentsClient;
pub use error::{Error, Result};
pub use indices::IndicesClient;
pub use property::{Property, PropertyType};
pub use query::Query;
pub use request::{
    encode_path, CreateIndexParam, DeleteParam, GetParam, IndexParam, PutMappingParam,
    SearchParam, SortOrder, UpdateParam,
};
pub use transport::{HttpTransport, Method, Transport};
