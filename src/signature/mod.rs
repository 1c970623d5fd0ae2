//! Method signature descriptions.
//!
//! Targets declare a schema for each dispatchable method instead of being
//! reflected at runtime. A schema is an ordered list of
//! [`ParameterDescriptor`]s, built by hand or parsed from a manifest line
//! such as `intOrFloatParam(param: int|float)`.

mod parser;

use std::fmt;

use crate::error::SignatureError;
use crate::target::TargetClass;
use crate::value::Value;

pub use parser::parse_signature;

/// The closed set of kinds a parameter can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Integer,
    String,
    Boolean,
    Float,
    Array,
    Object,
    /// No constraint.
    Any,
    /// Only meaningful inside a union; makes the parameter nullable.
    Null,
}

impl PrimitiveKind {
    /// Resolve a declared type name. Returns `None` for class names, which
    /// callers treat as [`PrimitiveKind::String`].
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(PrimitiveKind::Integer),
            "string" | "str" => Some(PrimitiveKind::String),
            "bool" | "boolean" => Some(PrimitiveKind::Boolean),
            "float" | "double" => Some(PrimitiveKind::Float),
            "array" => Some(PrimitiveKind::Array),
            "object" => Some(PrimitiveKind::Object),
            "mixed" | "any" => Some(PrimitiveKind::Any),
            "null" => Some(PrimitiveKind::Null),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Integer => "int",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Any => "mixed",
            PrimitiveKind::Null => "null",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One declared parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    types: Vec<PrimitiveKind>,
    default: Option<Value>,
    variadic: bool,
}

impl ParameterDescriptor {
    /// A parameter accepting any of `types`, in declared order. Duplicates
    /// are dropped; an empty list means untyped.
    pub fn new(name: impl Into<String>, types: impl IntoIterator<Item = PrimitiveKind>) -> Self {
        let mut kinds: Vec<PrimitiveKind> = Vec::new();
        for kind in types {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            kinds.push(PrimitiveKind::Any);
        }
        Self {
            name: name.into(),
            types: kinds,
            default: None,
            variadic: false,
        }
    }

    pub fn typed(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, [kind])
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, [])
    }

    /// `?T`, i.e. the union `{T, Null}`.
    pub fn nullable(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, [kind, PrimitiveKind::Null])
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[PrimitiveKind] {
        &self.types
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn is_union(&self) -> bool {
        self.types.len() > 1
    }

    /// The declared kind when the parameter is not a union.
    pub fn single_kind(&self) -> Option<PrimitiveKind> {
        match self.types.as_slice() {
            [kind] => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            write!(f, "...")?;
        }
        write!(f, "{}", self.name)?;
        if self.single_kind() != Some(PrimitiveKind::Any) {
            let names: Vec<&str> = self.types.iter().map(|k| k.name()).collect();
            write!(f, ": {}", names.join("|"))?;
        }
        if let Some(default) = &self.default {
            match default {
                // Literals have no escapes, so quote with whichever
                // character the string does not contain.
                Value::String(s) if s.contains('"') && !s.contains('\'') => {
                    write!(f, " = '{}'", s)?
                }
                Value::String(s) => write!(f, " = \"{}\"", s)?,
                other => write!(f, " = {}", other)?,
            }
        }
        Ok(())
    }
}

/// A named, validated parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    name: String,
    parameters: Vec<ParameterDescriptor>,
}

impl MethodSignature {
    /// Build a signature, checking that names are unique and that at most
    /// one parameter is variadic and it comes last.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterDescriptor>,
    ) -> Result<Self, SignatureError> {
        let last = parameters.len().saturating_sub(1);
        for (i, param) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(SignatureError::DuplicateParameter(param.name.clone()));
            }
            if param.variadic {
                if i != last {
                    return Err(SignatureError::VariadicNotLast(param.name.clone()));
                }
                if param.default.is_some() {
                    return Err(SignatureError::VariadicWithDefault(param.name.clone()));
                }
            }
        }
        Ok(Self {
            name: name.into(),
            parameters,
        })
    }

    /// Parse a manifest line, e.g. `stringVariadicParam(...param: string)`.
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        parse_signature(text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn variadic_parameter(&self) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.variadic)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Ordered parameters of `method` on `class`, or `None` when the class does
/// not expose that method.
pub fn describe_parameters<'a>(
    class: &'a TargetClass,
    method: &str,
) -> Option<&'a [ParameterDescriptor]> {
    class.method(method).map(|m| m.signature().parameters())
}

/// Ordered constructor parameters, or `None` when the class declares no
/// constructor.
pub fn describe_constructor_parameters(class: &TargetClass) -> Option<&[ParameterDescriptor]> {
    class.constructor_signature().map(|s| s.parameters())
}
