//! Query DSL expressions
//!
//! Each query node renders to the JSON fragment the search service expects
//! under the `query` key of a search body. Nodes are validated when they are
//! built, so a [`Query`] value that exists is always well formed.
//!
//! Supported query types:
//! - `match_all`
//! - `match` / `match_phrase` / `multi_match`
//! - `term`
//! - `range`
//! - `bool` (must, should, must_not, filter)
//! - `geo_bounding_box` / `geo_distance`

pub mod range;
pub mod types;

pub use range::{RangeQuery, RangeQueryBuilder};
pub use types::{
    BoolQuery, GeoBoundingBoxQuery, GeoDistanceQuery, GeoPoint, MatchPhraseQuery, MatchQuery,
    MultiMatchQuery, Query, TermQuery,
};
