//! Default validation engine.

use tracing::debug;

use super::coercion::coerce_value;
use super::{ErrorBag, Validated, ValidationEngine};
use crate::rules::{RuleSet, RuleSpec, RuleToken};
use crate::value::{Fields, Value};

/// Evaluates the rule tokens produced by [`crate::rules::compile_rules`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        RuleValidator
    }
}

impl ValidationEngine for RuleValidator {
    fn validate(&self, input: &Fields, rules: &RuleSet) -> Validated {
        let mut fields = Fields::new();
        let mut errors = ErrorBag::new();

        // Whole fields first, so element rules see the coerced parent.
        for (field, spec) in rules.iter().filter(|(f, _)| !is_element_rule(f)) {
            if let Some(value) = validate_field(field, input.get(field), spec, &mut errors) {
                fields.insert(field.to_string(), value);
            }
        }

        for (pattern, spec) in rules.iter().filter(|(f, _)| is_element_rule(f)) {
            let parent = &pattern[..pattern.len() - 2];
            if let Some(container) = fields.get_mut(parent) {
                validate_elements(parent, container, spec, &mut errors);
            }
        }

        debug!(
            rules = rules.len(),
            passed = fields.len(),
            failed = errors.len(),
            "validated input"
        );

        Validated { fields, errors }
    }
}

fn is_element_rule(field: &str) -> bool {
    field.ends_with(".*")
}

/// Validate one field. Returns the value to keep, or `None` when the field
/// failed or was optional and omitted.
fn validate_field(
    attribute: &str,
    value: Option<&Value>,
    spec: &RuleSpec,
    errors: &mut ErrorBag,
) -> Option<Value> {
    let presence = spec.presence();

    let value = match value {
        None => {
            if presence == Some(RuleToken::Required) {
                errors.add(attribute, required_message(attribute));
            }
            return None;
        }
        Some(v) if v.is_blank() && presence == Some(RuleToken::Required) => {
            errors.add(attribute, required_message(attribute));
            return None;
        }
        Some(Value::Null) if presence == Some(RuleToken::Nullable) => return Some(Value::Null),
        Some(v) => v,
    };

    match spec {
        RuleSpec::Tokens(tokens) => {
            let mut current = value.clone();
            let mut failed = false;
            for token in tokens.iter().filter(|t| !t.is_presence()) {
                match coerce_value(attribute, &current, *token) {
                    Ok(coerced) => current = coerced,
                    Err(message) => {
                        errors.add(attribute, message);
                        failed = true;
                    }
                }
            }
            (!failed).then_some(current)
        }
        RuleSpec::Union { predicate, .. } => {
            let mut failed = false;
            predicate.check(attribute, value, &mut |message: String| {
                errors.add(attribute, message);
                failed = true;
            });
            (!failed).then(|| value.clone())
        }
    }
}

/// Apply an element rule (`field.*`) to every member of a validated array
/// or object, replacing members with their coerced form.
fn validate_elements(parent: &str, container: &mut Value, spec: &RuleSpec, errors: &mut ErrorBag) {
    match container {
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                let attribute = format!("{}.{}", parent, i);
                if let Some(coerced) = validate_field(&attribute, Some(item), spec, errors) {
                    *item = coerced;
                }
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                let attribute = format!("{}.{}", parent, key);
                if let Some(coerced) = validate_field(&attribute, Some(item), spec, errors) {
                    *item = coerced;
                }
            }
        }
        _ => {}
    }
}

fn required_message(attribute: &str) -> String {
    format!("The {} field is required.", attribute)
}
