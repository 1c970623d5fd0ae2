//! Type coercion for validation.

use crate::rules::RuleToken;
use crate::value::Value;

/// Check `value` against a type token, converting string and numeric input
/// into the expected kind. Returns the error message on failure. Presence
/// tokens pass the value through unchanged.
pub fn coerce_value(attribute: &str, value: &Value, token: RuleToken) -> Result<Value, String> {
    match token {
        RuleToken::Required | RuleToken::Nullable => Ok(value.clone()),
        RuleToken::Integer => coerce_to_int(value)
            .ok_or_else(|| format!("The {} must be an integer.", attribute)),
        RuleToken::Float => coerce_to_float(value)
            .ok_or_else(|| format!("The {} must be a number.", attribute)),
        RuleToken::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(format!("The {} must be a string.", attribute)),
        },
        RuleToken::Boolean => coerce_to_bool(value)
            .ok_or_else(|| format!("The {} field must be true or false.", attribute)),
        RuleToken::Array => match value {
            Value::Array(_) | Value::Object(_) => Ok(value.clone()),
            _ => Err(format!("The {} must be an array.", attribute)),
        },
        RuleToken::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(format!("The {} must be an object.", attribute)),
        },
    }
}

fn coerce_to_int(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) => Some(value.clone()),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some(Value::Int(*f as i64))
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Int),
        _ => None,
    }
}

fn coerce_to_float(value: &Value) -> Option<Value> {
    match value {
        Value::Float(_) => Some(value.clone()),
        Value::Int(n) => Some(Value::Float(*n as f64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float),
        _ => None,
    }
}

fn coerce_to_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Int(0) => Some(Value::Bool(false)),
        Value::Int(1) => Some(Value::Bool(true)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}
