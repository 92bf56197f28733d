//! Criteria evaluation.
//!
//! A criteria list is a conjunction: an entity matches when every criterion
//! holds, and an empty list matches everything. Evaluation never fails. A
//! criterion that is malformed for its operator (a `between` without a
//! two-item range, an `in` without a list, a non-numeric operand for a
//! numeric comparison, an unknown operator) simply does not match, so a
//! badly configured rule stops applying instead of aborting the putaway.

use crate::models::{Criterion, CriterionValue, FieldValue, Operator, Record, Scalar};

/// Whether `entity` satisfies every criterion.
///
/// # Examples
///
/// ```
/// use u_putaway::criteria::matches;
/// use u_putaway::models::{Criterion, Product, ProductField};
///
/// let heavy = Product::new("SKU-1", "Pact").with_weight(50.0);
/// assert!(matches(&[Criterion::gt(ProductField::Weight, 20.0)], &heavy));
/// assert!(matches(&[], &heavy));
/// ```
pub fn matches<R: Record>(criteria: &[Criterion<R::Field>], entity: &R) -> bool {
    criteria.iter().all(|c| evaluate(c, entity))
}

/// Evaluates one criterion.
pub fn evaluate<R: Record>(criterion: &Criterion<R::Field>, entity: &R) -> bool {
    let actual = entity.field(&criterion.field);
    compare(&actual, criterion.operator, &criterion.value)
}

/// Applies `operator` to an entity value and a rule value.
pub fn compare(actual: &FieldValue, operator: Operator, expected: &CriterionValue) -> bool {
    match operator {
        Operator::Eq => actual.loose_string() == expected.loose_string(),
        Operator::Ne => actual.loose_string() != expected.loose_string(),
        Operator::Gt => actual.to_number() > expected.to_number(),
        Operator::Ge => actual.to_number() >= expected.to_number(),
        Operator::Lt => actual.to_number() < expected.to_number(),
        Operator::Le => actual.to_number() <= expected.to_number(),
        Operator::Between => match expected.as_list() {
            Some([min, max]) => {
                let n = actual.to_number();
                n >= min.to_number() && n <= max.to_number()
            }
            _ => false,
        },
        Operator::In => match expected.as_list() {
            Some(members) => is_member(actual, members),
            None => false,
        },
        Operator::Exists => actual.is_present(),
        Operator::Unknown => false,
    }
}

// Multi-valued fields match when any of their values is a member.
fn is_member(actual: &FieldValue, members: &[Scalar]) -> bool {
    let contains = |v: &Scalar| members.iter().any(|m| m.same_value(v));
    match actual {
        FieldValue::Missing => false,
        FieldValue::Scalar(v) => contains(v),
        FieldValue::List(values) => values.iter().any(contains),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BinStatus, Location, LocationField, Product, ProductField};

    fn product() -> Product {
        Product::new("TEST-HEAVY-001", "Pact")
            .with_weight(50.0)
            .with_abc_code("C")
            .with_oversized(true)
            .with_hazmat_class("NONE")
    }

    fn location() -> Location {
        Location::new("BIN-011", "Zone_B_Standard")
            .with_group("heavy_duty")
            .with_group("bulk_storage")
            .with_level(2)
            .with_status(BinStatus::Partial)
            .with_distance(33.0)
    }

    #[test]
    fn test_empty_criteria_match() {
        assert!(matches(&[], &product()));
        assert!(matches(&[], &location()));
    }

    #[test]
    fn test_conjunction() {
        let p = product();
        let ok = Criterion::gt(ProductField::Weight, 20.0);
        let bad = Criterion::eq(ProductField::AbcCode, "A");
        assert!(matches(&[ok.clone()], &p));
        assert!(!matches(&[ok.clone(), bad.clone()], &p));
        assert!(!matches(&[bad, ok], &p));
    }

    #[test]
    fn test_eq_is_loose() {
        let loc = location();
        assert!(matches(&[Criterion::eq(LocationField::LocationLevel, "2")], &loc));
        assert!(matches(&[Criterion::eq(LocationField::LocationLevel, 2)], &loc));
        assert!(matches(&[Criterion::eq(ProductField::IsOversized, "true")], &product()));
        assert!(matches(&[Criterion::eq(ProductField::IsOversized, true)], &product()));
    }

    #[test]
    fn test_ne() {
        let p = product();
        assert!(!matches(&[Criterion::ne(ProductField::HazmatClass, "NONE")], &p));
        assert!(matches(&[Criterion::ne(ProductField::AbcCode, "A")], &p));
    }

    #[test]
    fn test_numeric_operators() {
        let loc = location();
        assert!(matches(&[Criterion::le(LocationField::LocationLevel, 2.0)], &loc));
        assert!(matches(&[Criterion::ge(LocationField::LocationLevel, 2.0)], &loc));
        assert!(!matches(&[Criterion::lt(LocationField::LocationLevel, 2.0)], &loc));
        assert!(!matches(&[Criterion::gt(LocationField::LocationLevel, 2.0)], &loc));
        assert!(matches(&[Criterion::lt(LocationField::DistanceShipping, 40.0)], &loc));
    }

    #[test]
    fn test_numeric_with_text_operand() {
        let loc = location();
        let c = Criterion::new(LocationField::LocationLevel, Operator::Le, "3");
        assert!(matches(&[c], &loc));
        let c = Criterion::new(LocationField::LocationLevel, Operator::Le, "three");
        assert!(!matches(&[c.clone()], &loc));
        let c = Criterion::new(LocationField::LocationLevel, Operator::Gt, "three");
        assert!(!matches(&[c], &loc));
    }

    #[test]
    fn test_number_text_edges() {
        let far = Location::new("BIN-900", "Zone_X").with_distance(1e21);
        assert!(matches(&[Criterion::eq(LocationField::DistanceShipping, "1e+21")], &far));
        assert!(!matches(&[Criterion::eq(LocationField::DistanceShipping, "1000000000000000000000")], &far));

        let loc = location();
        let c = Criterion::new(LocationField::LocationLevel, Operator::Le, "0x10");
        assert!(matches(&[c], &loc));
        let c = Criterion::new(LocationField::LocationLevel, Operator::Gt, "0b1");
        assert!(matches(&[c], &loc));
    }

    #[test]
    fn test_numeric_on_missing_value() {
        // No weight recorded: every numeric comparison fails.
        let p = Product::new("S", "M");
        assert!(!matches(&[Criterion::gt(ProductField::Weight, 20.0)], &p));
        assert!(!matches(&[Criterion::lt(ProductField::Weight, 20.0)], &p));
        assert!(!matches(&[Criterion::between(ProductField::Weight, -1.0, 1.0)], &p));
        assert!(!matches(&[Criterion::exists(ProductField::Weight)], &p));
        assert!(matches(&[Criterion::ne(ProductField::AbcCode, "A")], &p));
        assert!(!matches(&[Criterion::is_in(ProductField::AbcCode, ["A"])], &p));
    }

    #[test]
    fn test_numeric_on_text_field_is_false() {
        let loc = location();
        assert!(!matches(&[Criterion::gt(LocationField::ZoneId, 0.0)], &loc));
        assert!(!matches(&[Criterion::le(LocationField::ZoneId, 0.0)], &loc));
    }

    #[test]
    fn test_between_inclusive() {
        let p = product();
        assert!(matches(&[Criterion::between(ProductField::Weight, 50.0, 60.0)], &p));
        assert!(matches(&[Criterion::between(ProductField::Weight, 40.0, 50.0)], &p));
        assert!(!matches(&[Criterion::between(ProductField::Weight, 51.0, 60.0)], &p));
    }

    #[test]
    fn test_between_requires_pair() {
        let p = product();
        let scalar = Criterion::new(ProductField::Weight, Operator::Between, 50.0);
        assert!(!matches(&[scalar], &p));
        let triple = Criterion::new(
            ProductField::Weight,
            Operator::Between,
            CriterionValue::list([0.0, 50.0, 100.0]),
        );
        assert!(!matches(&[triple], &p));
    }

    #[test]
    fn test_in_scalar_field() {
        let loc = location();
        assert!(matches(
            &[Criterion::is_in(LocationField::ZoneId, ["Zone_A_Golden", "Zone_B_Standard"])],
            &loc
        ));
        assert!(!matches(
            &[Criterion::is_in(LocationField::ZoneId, ["Zone_Deep_Freeze"])],
            &loc
        ));
    }

    #[test]
    fn test_in_multi_valued_field() {
        let loc = location();
        assert!(matches(
            &[Criterion::is_in(LocationField::LocationGroupId, ["bulk_storage"])],
            &loc
        ));
        assert!(!matches(
            &[Criterion::is_in(LocationField::LocationGroupId, ["pick_faces"])],
            &loc
        ));
        let ungrouped = Location::new("L", "Z");
        assert!(!matches(
            &[Criterion::is_in(LocationField::LocationGroupId, ["pick_faces"])],
            &ungrouped
        ));
    }

    #[test]
    fn test_in_requires_list() {
        let c = Criterion::new(LocationField::ZoneId, Operator::In, "Zone_B_Standard");
        assert!(!matches(&[c], &location()));
    }

    #[test]
    fn test_in_is_type_strict() {
        let c = Criterion::is_in(LocationField::LocationLevel, ["2"]);
        assert!(!matches(&[c], &location()));
        let c = Criterion::is_in(LocationField::LocationLevel, [2]);
        assert!(matches(&[c], &location()));
    }

    #[test]
    fn test_exists() {
        let p = Product::new("S", "M").with_lot("LOT-1");
        assert!(matches(&[Criterion::exists(ProductField::LotId)], &p));
        assert!(!matches(&[Criterion::exists(ProductField::LotId)], &Product::new("S", "M")));
        assert!(!matches(&[Criterion::exists(LocationField::AisleId)], &Location::new("L", "Z")));
    }

    #[test]
    fn test_unknown_operator_fails_closed() {
        let c = Criterion::new(ProductField::SkuId, Operator::Unknown, "TEST-HEAVY-001");
        assert!(!matches(&[c], &product()));
    }
}
