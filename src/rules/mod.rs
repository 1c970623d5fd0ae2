//! Compilation of parameter descriptors into validation rules.

mod union;

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::signature::{ParameterDescriptor, PrimitiveKind};

pub use union::UnionRule;

/// A single rule understood by the validation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleToken {
    Required,
    Nullable,
    Integer,
    String,
    Boolean,
    Float,
    Array,
    Object,
}

impl RuleToken {
    /// The token a declared kind maps to. `Any` maps to nothing.
    pub fn for_kind(kind: PrimitiveKind) -> Option<Self> {
        match kind {
            PrimitiveKind::Integer => Some(RuleToken::Integer),
            PrimitiveKind::String => Some(RuleToken::String),
            PrimitiveKind::Boolean => Some(RuleToken::Boolean),
            PrimitiveKind::Float => Some(RuleToken::Float),
            PrimitiveKind::Array => Some(RuleToken::Array),
            PrimitiveKind::Object => Some(RuleToken::Object),
            PrimitiveKind::Null => Some(RuleToken::Nullable),
            PrimitiveKind::Any => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleToken::Required => "required",
            RuleToken::Nullable => "nullable",
            RuleToken::Integer => "integer",
            RuleToken::String => "string",
            RuleToken::Boolean => "boolean",
            RuleToken::Float => "float",
            RuleToken::Array => "array",
            RuleToken::Object => "object",
        }
    }

    /// Presence tokens decide what happens to a missing field; the rest
    /// constrain the value's type.
    pub fn is_presence(&self) -> bool {
        matches!(self, RuleToken::Required | RuleToken::Nullable)
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The rules for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSpec {
    /// Ordered rule tokens, presence token first when there is one.
    Tokens(Vec<RuleToken>),
    /// A union-typed field: a presence token plus a membership predicate.
    Union {
        presence: RuleToken,
        predicate: UnionRule,
    },
}

impl RuleSpec {
    pub fn presence(&self) -> Option<RuleToken> {
        match self {
            RuleSpec::Tokens(tokens) => tokens.iter().copied().find(RuleToken::is_presence),
            RuleSpec::Union { presence, .. } => Some(*presence),
        }
    }

    pub fn contains(&self, token: RuleToken) -> bool {
        match self {
            RuleSpec::Tokens(tokens) => tokens.contains(&token),
            RuleSpec::Union { presence, .. } => *presence == token,
        }
    }
}

impl Serialize for RuleSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleSpec::Tokens(tokens) => serializer.collect_seq(tokens.iter().map(|t| t.as_str())),
            RuleSpec::Union {
                presence,
                predicate,
            } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(presence.as_str())?;
                seq.serialize_element(&predicate.to_string())?;
                seq.end()
            }
        }
    }
}

/// Field name (or `field.*`) to rules, in parameter order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    entries: IndexMap<String, RuleSpec>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, spec: RuleSpec) {
        self.entries.insert(field.into(), spec);
    }

    pub fn get(&self, field: &str) -> Option<&RuleSpec> {
        self.entries.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive the rule set for a method from its ordered parameters.
///
/// Every parameter gets `required` or, when it has a default, `nullable`.
/// Variadic parameters also get `array`, plus a `name.*` entry constraining
/// each element when they are typed with a single concrete kind. A single
/// concrete kind adds its token; a union becomes a membership predicate.
pub fn compile_rules(parameters: &[ParameterDescriptor]) -> RuleSet {
    let mut rules = RuleSet::new();

    for param in parameters {
        let presence = if param.has_default() {
            RuleToken::Nullable
        } else {
            RuleToken::Required
        };

        if param.is_variadic() {
            rules.insert(param.name(), RuleSpec::Tokens(vec![presence, RuleToken::Array]));
            if let Some(token) = param.single_kind().and_then(RuleToken::for_kind) {
                rules.insert(format!("{}.*", param.name()), RuleSpec::Tokens(vec![token]));
            }
            continue;
        }

        if param.is_union() {
            rules.insert(
                param.name(),
                RuleSpec::Union {
                    presence,
                    predicate: UnionRule::new(param.types()),
                },
            );
            continue;
        }

        let mut tokens = vec![presence];
        tokens.extend(param.single_kind().and_then(RuleToken::for_kind));
        rules.insert(param.name(), RuleSpec::Tokens(tokens));
    }

    rules
}
