//! Aggregation expressions
//!
//! An [`Aggregation`] renders as `{name: {...}}`. Bucketing aggregations can
//! carry named sub-aggregations, which nest under `aggs`.

use crate::request::SortOrder;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A node of the aggregation tree
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Terms bucketing aggregation
    Terms(TermsAggregation),

    /// Average metric aggregation
    Avg(AvgAggregation),
}

impl Aggregation {
    pub fn name(&self) -> &str {
        match self {
            Aggregation::Terms(agg) => &agg.name,
            Aggregation::Avg(agg) => &agg.name,
        }
    }

    /// The aggregation body without the name key
    pub fn body_json(&self) -> Value {
        match self {
            Aggregation::Terms(agg) => agg.body_json(),
            Aggregation::Avg(agg) => agg.body_json(),
        }
    }

    /// `{name: body}`
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.name().to_string(), self.body_json());
        Value::Object(map)
    }
}

impl From<TermsAggregation> for Aggregation {
    fn from(agg: TermsAggregation) -> Aggregation {
        Aggregation::Terms(agg)
    }
}

impl From<AvgAggregation> for Aggregation {
    fn from(agg: AvgAggregation) -> Aggregation {
        Aggregation::Avg(agg)
    }
}

/// Object of `{name: body}` entries for a set of aggregations
pub(crate) fn aggregations_to_json<'a>(aggs: impl IntoIterator<Item = &'a Aggregation>) -> Value {
    let map: Map<String, Value> = aggs
        .into_iter()
        .map(|agg| (agg.name().to_string(), agg.body_json()))
        .collect();
    Value::Object(map)
}

/// Groups documents by the distinct values of a field
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAggregation {
    name: String,
    field: String,
    size: Option<u32>,
    order: Option<(String, SortOrder)>,
    sub_aggregations: BTreeMap<String, Aggregation>,
}

impl TermsAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            size: None,
            order: None,
            sub_aggregations: BTreeMap::new(),
        }
    }

    /// Maximum number of buckets to return
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Order buckets by the value of a named sub-aggregation
    pub fn order(mut self, sub_aggregation: impl Into<String>, order: SortOrder) -> Self {
        self.order = Some((sub_aggregation.into(), order));
        self
    }

    /// Nest an aggregation under each bucket. Replaces an existing
    /// sub-aggregation of the same name.
    pub fn sub_aggregation(mut self, agg: impl Into<Aggregation>) -> Self {
        let agg = agg.into();
        self.sub_aggregations.insert(agg.name().to_string(), agg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn sub_aggregations(&self) -> impl Iterator<Item = &Aggregation> {
        self.sub_aggregations.values()
    }

    fn body_json(&self) -> Value {
        let mut terms = Map::new();
        terms.insert("field".into(), Value::from(self.field.as_str()));
        if let Some(size) = self.size {
            terms.insert("size".into(), Value::from(size));
        }
        if let Some((key, order)) = &self.order {
            terms.insert("order".into(), json!({ key.as_str(): order.as_str() }));
        }

        let mut body = Map::new();
        body.insert("terms".into(), Value::Object(terms));
        if !self.sub_aggregations.is_empty() {
            body.insert(
                "aggs".into(),
                aggregations_to_json(self.sub_aggregations.values()),
            );
        }
        Value::Object(body)
    }
}

/// Average of a numeric field
#[derive(Debug, Clone, PartialEq)]
pub struct AvgAggregation {
    name: String,
    field: String,
}

impl AvgAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn body_json(&self) -> Value {
        json!({"avg": {"field": self.field}})
    }
}
