//! Query node types

use super::range::RangeQuery;
use crate::error::{Error, Result};
use serde_json::{json, Map, Value};

/// A node of the query expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Match all documents
    MatchAll,

    /// Match query (analyzed full-text)
    Match(MatchQuery),

    /// Match phrase query
    MatchPhrase(MatchPhraseQuery),

    /// Multi-match across multiple fields
    MultiMatch(MultiMatchQuery),

    /// Term query (exact match, not analyzed)
    Term(TermQuery),

    /// Range query
    Range(RangeQuery),

    /// Bool query (must, should, must_not, filter)
    Bool(BoolQuery),

    GeoBoundingBox(GeoBoundingBoxQuery),

    GeoDistance(GeoDistanceQuery),
}

impl Query {
    pub fn match_all() -> Self {
        Query::MatchAll
    }

    /// Wire form of this node, not wrapped in a `query` key
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({"match_all": {}}),
            Query::Match(q) => q.to_json(),
            Query::MatchPhrase(q) => q.to_json(),
            Query::MultiMatch(q) => q.to_json(),
            Query::Term(q) => q.to_json(),
            Query::Range(q) => q.to_json(),
            Query::Bool(q) => q.to_json(),
            Query::GeoBoundingBox(q) => q.to_json(),
            Query::GeoDistance(q) => q.to_json(),
        }
    }
}

macro_rules! query_from {
    ($($variant:ident => $node:ty),* $(,)?) => {
        $(
            impl From<$node> for Query {
                fn from(node: $node) -> Query {
                    Query::$variant(node)
                }
            }
        )*
    };
}

query_from! {
    Match => MatchQuery,
    MatchPhrase => MatchPhraseQuery,
    MultiMatch => MultiMatchQuery,
    Term => TermQuery,
    Range => RangeQuery,
    Bool => BoolQuery,
    GeoBoundingBox => GeoBoundingBoxQuery,
    GeoDistance => GeoDistanceQuery,
}

/// `{"<kind>": {"<field>": <inner>}}`
fn field_keyed(kind: &str, field: &str, inner: Value) -> Value {
    let mut by_field = Map::new();
    by_field.insert(field.to_string(), inner);
    let mut outer = Map::new();
    outer.insert(kind.to_string(), Value::Object(by_field));
    Value::Object(outer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub field: String,
    pub query: String,
}

impl MatchQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        field_keyed("match", &self.field, Value::from(self.query.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhraseQuery {
    pub field: String,
    pub query: String,
}

impl MatchPhraseQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        field_keyed("match_phrase", &self.field, Value::from(self.query.as_str()))
    }
}

/// Full-text match over several fields
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchQuery {
    query: String,
    fields: Vec<String>,
}

impl MultiMatchQuery {
    /// Fails when `fields` is empty. A single field is accepted but logged,
    /// since a plain match query does the same job.
    pub fn new<I, S>(query: impl Into<String>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let query = query.into();
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::Validation(
                "multi_match query requires at least one field".to_string(),
            ));
        }
        if fields.len() == 1 {
            tracing::warn!(
                field = %fields[0],
                "multi_match query with a single field, a match query is enough"
            );
        }
        Ok(Self { query, fields })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// True when built with exactly one field
    pub fn is_single_field(&self) -> bool {
        self.fields.len() == 1
    }

    pub fn to_json(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.query,
                "fields": self.fields,
            }
        })
    }
}

/// Exact, unanalyzed match on one field
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    pub value: Value,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        field_keyed("term", &self.field, json!({"value": self.value}))
    }
}

/// Boolean composition of sub-queries. Empty clauses are left out of the
/// wire form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub filter: Vec<Query>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut clauses = Map::new();
        for (key, list) in [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
            ("filter", &self.filter),
        ] {
            if !list.is_empty() {
                clauses.insert(
                    key.to_string(),
                    Value::Array(list.iter().map(Query::to_json).collect()),
                );
            }
        }
        json!({"bool": clauses})
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn to_json(&self) -> Value {
        json!({"lat": self.lat, "lon": self.lon})
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoBoundingBoxQuery {
    pub field: String,
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

impl GeoBoundingBoxQuery {
    pub fn new(field: impl Into<String>, top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        Self {
            field: field.into(),
            top_left,
            bottom_right,
        }
    }

    pub fn to_json(&self) -> Value {
        field_keyed(
            "geo_bounding_box",
            &self.field,
            json!({
                "top_left": self.top_left.to_json(),
                "bottom_right": self.bottom_right.to_json(),
            }),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceQuery {
    pub field: String,
    /// Distance with unit, e.g. `"200km"`
    pub distance: String,
    pub point: GeoPoint,
}

impl GeoDistanceQuery {
    pub fn new(field: impl Into<String>, distance: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            field: field.into(),
            distance: distance.into(),
            point,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("distance".into(), Value::from(self.distance.as_str()));
        body.insert(self.field.clone(), self.point.to_json());
        json!({"geo_distance": body})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all() {
        assert_eq!(Query::match_all().to_json(), json!({"match_all": {}}));
    }

    #[test]
    fn test_match_and_phrase() {
        assert_eq!(
            Query::from(MatchQuery::new("age", "28")).to_json(),
            json!({"match": {"age": "28"}})
        );
        assert_eq!(
            Query::from(MatchPhraseQuery::new("address", "mill lane")).to_json(),
            json!({"match_phrase": {"address": "mill lane"}})
        );
    }

    #[test]
    fn test_multi_match_empty_fields_fails() {
        let err = MultiMatchQuery::new("river", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_multi_match_single_field_is_flagged() {
        let q = MultiMatchQuery::new("river", ["city"]).unwrap();
        assert!(q.is_single_field());
        assert_eq!(
            q.to_json(),
            json!({"multi_match": {"query": "river", "fields": ["city"]}})
        );
    }

    #[test]
    fn test_multi_match_keeps_field_order() {
        let fields = ["firstname", "lastname", "address", "city"];
        let q = MultiMatchQuery::new("river", fields).unwrap();
        assert!(!q.is_single_field());
        assert_eq!(
            q.to_json()["multi_match"]["fields"],
            json!(["firstname", "lastname", "address", "city"])
        );
    }

    #[test]
    fn test_term_wraps_value() {
        assert_eq!(
            TermQuery::new("address", "street").to_json(),
            json!({"term": {"address": {"value": "street"}}})
        );
        assert_eq!(
            TermQuery::new("age", 32).to_json(),
            json!({"term": {"age": {"value": 32}}})
        );
    }

    #[test]
    fn test_bool_omits_empty_clauses() {
        let q = BoolQuery::new()
            .must(MatchQuery::new("gender", "M"))
            .filter(TermQuery::new("state", "ID"));
        let json = q.to_json();
        assert_eq!(json["bool"]["must"], json!([{"match": {"gender": "M"}}]));
        assert_eq!(json["bool"]["filter"].as_array().unwrap().len(), 1);
        assert!(json["bool"].get("should").is_none());
        assert!(json["bool"].get("must_not").is_none());
    }

    #[test]
    fn test_empty_bool() {
        let q = BoolQuery::new();
        assert!(q.is_empty());
        assert_eq!(q.to_json(), json!({"bool": {}}));
    }

    #[test]
    fn test_nested_bool() {
        let inner = BoolQuery::new()
            .should(MatchQuery::new("employer", "Pyrami"))
            .should(MatchQuery::new("employer", "Netagy"));
        let outer = BoolQuery::new().must(inner).must_not(Query::match_all());
        let json = outer.to_json();
        assert_eq!(
            json["bool"]["must"][0]["bool"]["should"][1],
            json!({"match": {"employer": "Netagy"}})
        );
        assert_eq!(json["bool"]["must_not"][0], json!({"match_all": {}}));
    }

    #[test]
    fn test_geo_bounding_box() {
        let q = GeoBoundingBoxQuery::new(
            "location",
            GeoPoint::new(40.73, -74.1),
            GeoPoint::new(40.01, -71.12),
        );
        assert_eq!(
            q.to_json(),
            json!({"geo_bounding_box": {"location": {
                "top_left": {"lat": 40.73, "lon": -74.1},
                "bottom_right": {"lat": 40.01, "lon": -71.12}
            }}})
        );
    }

    #[test]
    fn test_geo_distance() {
        let q = GeoDistanceQuery::new("pin", "200km", GeoPoint::new(40.0, -70.0));
        assert_eq!(
            q.to_json(),
            json!({"geo_distance": {"distance": "200km", "pin": {"lat": 40.0, "lon": -70.0}}})
        );
    }
}
