//! Membership predicate for union-typed parameters.

use std::fmt;

use super::RuleToken;
use crate::signature::PrimitiveKind;
use crate::value::Value;

/// Accepts a value when its runtime kind is one of the declared kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionRule {
    kinds: Vec<PrimitiveKind>,
}

impl UnionRule {
    pub fn new(kinds: &[PrimitiveKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
        }
    }

    pub fn kinds(&self) -> &[PrimitiveKind] {
        &self.kinds
    }

    /// Compare through the token table, so `Null` in the union admits a
    /// null value and `Any` admits everything.
    pub fn accepts(&self, value: &Value) -> bool {
        if self.kinds.contains(&PrimitiveKind::Any) {
            return true;
        }
        let token = RuleToken::for_kind(value.kind());
        self.kinds
            .iter()
            .any(|kind| RuleToken::for_kind(*kind) == token)
    }

    /// Run the predicate, reporting through `fail` when the value is not a
    /// member of the union.
    pub fn check(&self, attribute: &str, value: &Value, fail: &mut dyn FnMut(String)) {
        if !self.accepts(value) {
            fail(format!("The {} must be a type of {}.", attribute, self));
        }
    }
}

impl fmt::Display for UnionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .kinds
            .iter()
            .filter_map(|k| RuleToken::for_kind(*k))
            .map(|t| t.as_str())
            .collect();
        write!(f, "{}", names.join(" or "))
    }
}
