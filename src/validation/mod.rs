//! Validation of raw input against a compiled [`RuleSet`].
//!
//! The dispatcher only depends on the [`ValidationEngine`] trait. The
//! bundled [`RuleValidator`] understands the tokens the rule compiler emits,
//! coerces string input into the declared kinds and reports errors with
//! Laravel-style messages.

mod coercion;
mod validator;

use indexmap::IndexMap;
use serde::Serialize;

use crate::rules::RuleSet;
use crate::value::Fields;

pub use coercion::coerce_value;
pub use validator::RuleValidator;

/// Validation messages per field, in the order they were raised.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorBag {
    messages: IndexMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self {
            messages: IndexMap::new(),
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.messages.get(field).map(|m| m.as_slice())
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|m| m.first())
            .map(|m| m.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.messages.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Result of running a validation engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Validated {
    /// Fields that passed, after coercion. Only fields named by the rules.
    pub fields: Fields,
    pub errors: ErrorBag,
}

impl Validated {
    pub fn passes(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fails(&self) -> bool {
        !self.passes()
    }
}

/// Anything that can evaluate a [`RuleSet`] against raw input.
///
/// Contract: a field absent from `errors` is present and type-correct in
/// `fields` (unless it was optional and omitted), and union predicates are
/// called as `(field, value, fail)`.
pub trait ValidationEngine {
    fn validate(&self, input: &Fields, rules: &RuleSet) -> Validated;
}
