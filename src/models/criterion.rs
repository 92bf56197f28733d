//! Field/operator/value conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::CriterionValue;

/// Comparison operator of a criterion.
///
/// Identifiers are literal configuration values and serialize byte-for-byte
/// as written in rule definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "exists")]
    Exists,
    /// Any identifier this engine does not know. Never matches.
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// Configuration identifier.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::Exists => "exists",
            Operator::Unknown => "?",
        }
    }

    /// Human-readable phrase for rule previews.
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "is",
            Operator::Ne => "is not",
            Operator::Gt => "is greater than",
            Operator::Ge => "is greater than or equal to",
            Operator::Lt => "is less than",
            Operator::Le => "is less than or equal to",
            Operator::Between => "is between",
            Operator::In => "is in",
            Operator::Exists => "exists",
            Operator::Unknown => "(unknown operator)",
        }
    }

    /// Whether both sides are coerced to numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le | Operator::Between
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single condition on one field of an entity.
///
/// `F` is the closed field enum of the entity kind the criterion applies to
/// ([`ProductField`](super::ProductField) or [`LocationField`](super::LocationField)),
/// so a product criterion can never name a location attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion<F> {
    /// Field to read from the entity.
    pub field: F,
    /// Comparison operator.
    pub operator: Operator,
    /// Comparison operand. Ignored by `exists`.
    #[serde(default)]
    pub value: CriterionValue,
}

impl<F> Criterion<F> {
    /// Creates a criterion.
    pub fn new(field: F, operator: Operator, value: impl Into<CriterionValue>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: F, value: impl Into<CriterionValue>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    pub fn ne(field: F, value: impl Into<CriterionValue>) -> Self {
        Self::new(field, Operator::Ne, value)
    }

    pub fn gt(field: F, value: f64) -> Self {
        Self::new(field, Operator::Gt, value)
    }

    pub fn ge(field: F, value: f64) -> Self {
        Self::new(field, Operator::Ge, value)
    }

    pub fn lt(field: F, value: f64) -> Self {
        Self::new(field, Operator::Lt, value)
    }

    pub fn le(field: F, value: f64) -> Self {
        Self::new(field, Operator::Le, value)
    }

    pub fn between(field: F, min: f64, max: f64) -> Self {
        Self::new(field, Operator::Between, CriterionValue::range(min, max))
    }

    pub fn is_in<T: Into<super::Scalar>>(field: F, values: impl IntoIterator<Item = T>) -> Self {
        Self::new(field, Operator::In, CriterionValue::list(values))
    }

    pub fn exists(field: F) -> Self {
        Self::new(field, Operator::Exists, CriterionValue::default())
    }
}

impl<F: fmt::Display> fmt::Display for Criterion<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Exists => write!(f, "{} exists", self.field),
            Operator::Between => match self.value.as_list() {
                Some([min, max]) => write!(f, "{} is between {} and {}", self.field, min, max),
                _ => write!(f, "{} is between {}", self.field, self.value.loose_string()),
            },
            Operator::In => write!(f, "{} is in [{}]", self.field, self.value.loose_string()),
            op => write!(f, "{} {} {}", self.field, op.label(), self.value.loose_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationField, ProductField};

    #[test]
    fn test_operator_identifiers_round_trip() {
        for (op, text) in [
            (Operator::Eq, "\"=\""),
            (Operator::Ne, "\"!=\""),
            (Operator::Ge, "\">=\""),
            (Operator::Between, "\"between\""),
            (Operator::In, "\"in\""),
            (Operator::Exists, "\"exists\""),
        ] {
            assert_eq!(serde_json::to_string(&op).unwrap(), text);
        }
    }

    #[test]
    fn test_unknown_operator_deserializes() {
        let op: Operator = serde_json::from_str("\"contains\"").unwrap();
        assert_eq!(op, Operator::Unknown);
    }

    #[test]
    fn test_criterion_from_json() {
        let c: Criterion<ProductField> =
            serde_json::from_str(r#"{ "field": "weight", "operator": ">", "value": 20 }"#)
                .unwrap();
        assert_eq!(c, Criterion::gt(ProductField::Weight, 20.0));
    }

    #[test]
    fn test_criterion_rejects_foreign_field() {
        let parsed: Result<Criterion<ProductField>, _> =
            serde_json::from_str(r#"{ "field": "zone_id", "operator": "in", "value": ["Z"] }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_exists_without_value() {
        let c: Criterion<ProductField> =
            serde_json::from_str(r#"{ "field": "lot_id", "operator": "exists" }"#).unwrap();
        assert_eq!(c, Criterion::exists(ProductField::LotId));
    }

    #[test]
    fn test_display() {
        let c = Criterion::le(LocationField::LocationLevel, 2.0);
        assert_eq!(c.to_string(), "location_level is less than or equal to 2");
        let c = Criterion::is_in(LocationField::ZoneId, ["Hazmat_Cage"]);
        assert_eq!(c.to_string(), "zone_id is in [Hazmat_Cage]");
    }
}
