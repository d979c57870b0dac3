//! Synchronous field validation.
//!
//! Rules run on every keystroke against the draft and are re-run in full at
//! save time; a failing save never reaches the network.

use std::collections::BTreeMap;

use crate::resource::{FieldSpec, Rule};

/// Check one rule against a raw string value. Returns the message to attach
/// to the field, or `None` when the value passes.
///
/// Apart from `Required`, rules are skipped for empty values so optional
/// fields stay optional.
pub fn check(rule: &Rule, label: &str, value: &str) -> Option<String> {
    let v = value.trim();
    match rule {
        Rule::Required => {
            if v.is_empty() {
                return Some(format!("{label} is required"));
            }
        }
        _ if v.is_empty() => {}
        Rule::MinLen(n) => {
            if v.chars().count() < *n {
                return Some(format!("{label} must be at least {n} characters"));
            }
        }
        Rule::Digits(n) => {
            if v.len() != *n || !v.bytes().all(|b| b.is_ascii_digit()) {
                return Some(format!("{label} must be exactly {n} digits"));
            }
        }
        Rule::Email => {
            let mut parts = v.splitn(2, '@');
            let local = parts.next().unwrap_or("");
            let domain = parts.next().unwrap_or("");
            if local.is_empty() || domain.is_empty() {
                return Some(format!("{label} must be a valid email address"));
            }
        }
        Rule::NonNegativeNumber => match v.parse::<f64>() {
            Ok(n) if n >= 0.0 => {}
            _ => return Some(format!("{label} must be a non-negative number")),
        },
    }
    None
}

/// Validate one field against all of its rules; first failure wins.
pub fn check_field(spec: &FieldSpec, value: &str) -> Option<String> {
    spec.rules.iter().find_map(|r| check(r, spec.label, value))
}

/// Validate a whole draft. Returns a field-key -> message map; empty means
/// the draft may be submitted.
pub fn validate_all<'a, I>(fields: I) -> BTreeMap<&'static str, String>
where
    I: IntoIterator<Item = (&'a FieldSpec, &'a str)>,
{
    let mut errors = BTreeMap::new();
    for (spec, value) in fields {
        if let Some(msg) = check_field(spec, value) {
            errors.insert(spec.key, msg);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: FieldSpec = FieldSpec {
        key: "phone",
        label: "Phone",
        rules: &[Rule::Required, Rule::Digits(10)],
        editable: true,
        column: true,
    };
    const EMAIL: FieldSpec = FieldSpec {
        key: "email",
        label: "Email",
        rules: &[Rule::Email],
        editable: true,
        column: true,
    };

    #[test]
    fn phone_must_be_ten_digits() {
        assert!(check_field(&PHONE, "0123456789").is_none());
        assert!(check_field(&PHONE, "12345").is_some());
        assert!(check_field(&PHONE, "01234567ab").is_some());
        assert!(check_field(&PHONE, "").is_some()); // required
    }

    #[test]
    fn optional_rules_skip_empty_values() {
        assert!(check_field(&EMAIL, "").is_none());
        assert!(check_field(&EMAIL, "not-an-email").is_some());
        assert!(check_field(&EMAIL, "@nodomain").is_some());
        assert!(check_field(&EMAIL, "a@b").is_none());
    }

    #[test]
    fn validate_all_collects_per_field_messages() {
        let errors = validate_all([(&PHONE, "123"), (&EMAIL, "a@b.c")]);
        assert_eq!(errors.len(), 1);
        assert!(errors["phone"].contains("10 digits"));
    }

    #[test]
    fn non_negative_number_rejects_negatives_and_text() {
        let spec = FieldSpec {
            key: "price",
            label: "Price",
            rules: &[Rule::NonNegativeNumber],
            editable: true,
            column: true,
        };
        assert!(check_field(&spec, "12.5").is_none());
        assert!(check_field(&spec, "-1").is_some());
        assert!(check_field(&spec, "free").is_some());
    }
}
