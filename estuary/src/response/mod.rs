//! Typed views of the service's JSON responses

pub mod aggregations;
pub mod documents;
pub mod error;
pub mod indices;
pub mod search;

pub use aggregations::{
    AggregationsResponse, Bucket, BucketAggregationsResponse, MetricsAggregationsResponse,
};
pub use documents::{
    DeleteResponse, GetResponse, IndexResponse, Shards, UpdateResponse, WriteResponse,
};
pub use error::{check_server_error, ErrorCause};
pub use indices::{
    CreateIndexFailedResponse, CreateIndexResponse, CreateIndexSuccessResponse,
    DeleteIndexResponse, GetIndexResponse, PutMappingResponse, Settings,
};
pub use search::{Hit, SearchResponse};
