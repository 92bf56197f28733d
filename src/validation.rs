//! Rule-set validation.
//!
//! Checks a rule set when it is authored or saved, so that a badly formed
//! rule is rejected up front instead of silently never matching at
//! putaway time. Detects:
//! - Duplicate rule IDs
//! - Empty rule names
//! - Preference priorities that are not a dense 1..N sequence
//! - Operators not offered for a field
//! - Values that do not fit their operator
//! - `exclude` constraints on fields that only support `limit_to`
//! - Blank or unrecognized sort strategies

use std::collections::HashSet;

use crate::models::{Criterion, Operator, RuleAction, RuleField, RuleSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two rules share the same ID.
    DuplicateId,
    /// A rule has a blank name.
    EmptyName,
    /// Preference priorities are not 1..N in list order.
    PriorityGap,
    /// The operator is unknown or not offered for the field.
    OperatorNotAllowed,
    /// The value does not fit the operator.
    MalformedValue,
    /// An `exclude` constraint uses a field that only supports `limit_to`.
    ExcludeNotSupported,
    /// A sort key names no known strategy.
    UnknownSortStrategy,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a rule set.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_rule_set(rules: &RuleSet) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for c in &rules.constraints {
        if !ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate constraint ID: {}", c.id),
            ));
        }
        check_name(&c.id, &c.name, &mut errors);
        check_criteria(&c.name, &c.product_criteria, &mut errors);
        check_criteria(&c.name, &c.location_criteria, &mut errors);

        if c.action == RuleAction::Exclude {
            for criterion in &c.location_criteria {
                if !criterion.field.supports_exclude() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::ExcludeNotSupported,
                        format!(
                            "Rule '{}': field '{}' only supports limit_to",
                            c.name, criterion.field
                        ),
                    ));
                }
            }
        }
    }

    for p in &rules.preferences {
        if !ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate preference ID: {}", p.id),
            ));
        }
        check_name(&p.id, &p.name, &mut errors);
        check_criteria(&p.name, &p.product_criteria, &mut errors);
        check_criteria(&p.name, &p.location_criteria, &mut errors);

        for (slot, key) in p.order_by.as_slice().iter().enumerate() {
            if !key.strategy.is_known() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSortStrategy,
                    format!("Preference '{}': sort key {} has no strategy", p.name, slot + 1),
                ));
            }
        }
    }

    for (i, p) in rules.preferences.iter().enumerate() {
        let expected = i as u32 + 1;
        if p.priority != expected {
            errors.push(ValidationError::new(
                ValidationErrorKind::PriorityGap,
                format!(
                    "Preference '{}' has priority {}, expected {}",
                    p.name, p.priority, expected
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_name(id: &str, name: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyName,
            format!("Rule '{id}' has an empty name"),
        ));
    }
}

fn check_criteria<F: RuleField>(
    rule_name: &str,
    criteria: &[Criterion<F>],
    errors: &mut Vec<ValidationError>,
) {
    for c in criteria {
        if let Err(e) = check_criterion(c) {
            errors.push(ValidationError::new(e.kind, format!("Rule '{rule_name}': {}", e.message)));
        }
    }
}

/// Validates one criterion against its field's authoring metadata.
pub fn check_criterion<F: RuleField>(criterion: &Criterion<F>) -> Result<(), ValidationError> {
    let op = criterion.operator;
    let field = criterion.field;

    if op == Operator::Unknown {
        return Err(ValidationError::new(
            ValidationErrorKind::OperatorNotAllowed,
            format!("unknown operator on field '{field}'"),
        ));
    }
    if op != Operator::Exists && !field.allowed_operators().contains(&op) {
        return Err(ValidationError::new(
            ValidationErrorKind::OperatorNotAllowed,
            format!("operator '{op}' is not allowed for field '{field}'"),
        ));
    }

    let malformed = |detail: &str| {
        Err(ValidationError::new(
            ValidationErrorKind::MalformedValue,
            format!("field '{field}' {op}: {detail}"),
        ))
    };

    match op {
        Operator::Between => match criterion.value.as_list() {
            Some([min, max]) => {
                let (lo, hi) = (min.to_number(), max.to_number());
                if lo.is_nan() || hi.is_nan() {
                    malformed("range bounds must be numbers")
                } else if lo > hi {
                    malformed("range minimum exceeds maximum")
                } else {
                    Ok(())
                }
            }
            _ => malformed("expected a [min, max] pair"),
        },
        Operator::In => match criterion.value.as_list() {
            Some([]) => malformed("expected at least one value"),
            Some(_) => Ok(()),
            None => malformed("expected a list of values"),
        },
        Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
            if criterion.value.to_number().is_nan() {
                malformed("expected a number")
            } else {
                Ok(())
            }
        }
        Operator::Eq | Operator::Ne | Operator::Exists | Operator::Unknown => Ok(()),
    }
}
