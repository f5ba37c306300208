//! Range query with bound validation

use crate::error::{Error, Result};
use serde_json::{json, Map, Value};

/// Numeric range on one field. Only obtainable through [`RangeQueryBuilder`],
/// which rejects inconsistent bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    field: String,
    gt: Option<f64>,
    gte: Option<f64>,
    lt: Option<f64>,
    lte: Option<f64>,
}

impl RangeQuery {
    pub fn builder(field: impl Into<String>) -> RangeQueryBuilder {
        RangeQueryBuilder {
            field: field.into(),
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn gt(&self) -> Option<f64> {
        self.gt
    }

    pub fn gte(&self) -> Option<f64> {
        self.gte
    }

    pub fn lt(&self) -> Option<f64> {
        self.lt
    }

    pub fn lte(&self) -> Option<f64> {
        self.lte
    }

    /// `{"range": {field: {bounds}}}` with only the bounds that are set
    pub fn to_json(&self) -> Value {
        let mut bounds = Map::new();
        for (key, bound) in [
            ("gt", self.gt),
            ("gte", self.gte),
            ("lt", self.lt),
            ("lte", self.lte),
        ] {
            if let Some(v) = bound {
                bounds.insert(key.to_string(), json!(v));
            }
        }
        let mut by_field = Map::new();
        by_field.insert(self.field.clone(), Value::Object(bounds));
        json!({"range": by_field})
    }
}

#[derive(Debug, Clone)]
pub struct RangeQueryBuilder {
    field: String,
    gt: Option<f64>,
    gte: Option<f64>,
    lt: Option<f64>,
    lte: Option<f64>,
}

impl RangeQueryBuilder {
    pub fn gt(mut self, value: f64) -> Self {
        self.gt = Some(value);
        self
    }

    pub fn gte(mut self, value: f64) -> Self {
        self.gte = Some(value);
        self
    }

    pub fn lt(mut self, value: f64) -> Self {
        self.lt = Some(value);
        self
    }

    pub fn lte(mut self, value: f64) -> Self {
        self.lte = Some(value);
        self
    }

    /// Validate the bounds and finish the query.
    ///
    /// `gte`/`lte` may be equal; every other lower/upper pairing must be
    /// strictly increasing.
    pub fn build(self) -> Result<RangeQuery> {
        let invalid =
            |msg: String| Err(Error::Validation(format!("range on '{}': {}", self.field, msg)));

        if self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none() {
            return invalid("at least one bound is required".to_string());
        }
        if self.gt.is_some() && self.gte.is_some() {
            return invalid("gt and gte cannot both be set".to_string());
        }
        if self.lt.is_some() && self.lte.is_some() {
            return invalid("lt and lte cannot both be set".to_string());
        }

        match (self.gt, self.gte, self.lt, self.lte) {
            (_, Some(gte), _, Some(lte)) if gte > lte => {
                return invalid(format!("gte {} is greater than lte {}", gte, lte));
            }
            (_, Some(gte), Some(lt), _) if gte >= lt => {
                return invalid(format!("gte {} must be less than lt {}", gte, lt));
            }
            (Some(gt), _, _, Some(lte)) if gt >= lte => {
                return invalid(format!("gt {} must be less than lte {}", gt, lte));
            }
            (Some(gt), _, Some(lt), _) if gt >= lt => {
                return invalid(format!("gt {} must be less than lt {}", gt, lt));
            }
            _ => {}
        }

        Ok(RangeQuery {
            field: self.field,
            gt: self.gt,
            gte: self.gte,
            lt: self.lt,
            lte: self.lte,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bound_fails() {
        assert!(matches!(
            RangeQuery::builder("balance").build(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_gt_and_gte_conflict() {
        let result = RangeQuery::builder("balance").gt(1.0).gte(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_lt_and_lte_conflict() {
        let result = RangeQuery::builder("balance").lt(10.0).lte(20.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_lower_above_upper_fails() {
        let result = RangeQuery::builder("balance")
            .gte(20000.0)
            .lte(10000.0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_inclusive_bounds_serialize() {
        let q = RangeQuery::builder("balance")
            .gte(10000.0)
            .lte(20000.0)
            .build()
            .unwrap();
        assert_eq!(
            q.to_json(),
            json!({"range": {"balance": {"gte": 10000.0, "lte": 20000.0}}})
        );
    }

    #[test]
    fn test_equal_bounds_only_allowed_when_both_inclusive() {
        assert!(RangeQuery::builder("age").gte(30.0).lte(30.0).build().is_ok());
        assert!(RangeQuery::builder("age").gte(30.0).lt(30.0).build().is_err());
        assert!(RangeQuery::builder("age").gt(30.0).lte(30.0).build().is_err());
        assert!(RangeQuery::builder("age").gt(30.0).lt(30.0).build().is_err());
    }

    #[test]
    fn test_single_bound_is_enough() {
        let q = RangeQuery::builder("age").gt(21.0).build().unwrap();
        assert_eq!(q.gt(), Some(21.0));
        assert_eq!(q.to_json(), json!({"range": {"age": {"gt": 21.0}}}));
    }
}
