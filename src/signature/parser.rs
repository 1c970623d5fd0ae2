//! Parser for one-line signature manifests.
//!
//! ```text
//! noParams()
//! intOrFloatParam(param: int|float)
//! stringOrNullParam(param: ?string)
//! mixedParamWithDefaultAndVariadic(param = null, ...other)
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use super::{MethodSignature, ParameterDescriptor, PrimitiveKind};
use crate::error::SignatureError;
use crate::value::Value;

lazy_static! {
    static ref SIGNATURE_RE: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)\s*$").unwrap();
    static ref PARAM_RE: Regex = Regex::new(
        r"^(\.\.\.)?\s*\$?([A-Za-z_][A-Za-z0-9_]*)\s*(?::\s*([^=]+?))?\s*(?:=\s*(.+?))?\s*$"
    )
    .unwrap();
    static ref TYPE_NAME_RE: Regex = Regex::new(r"^[A-Za-z_\\][A-Za-z0-9_\\:]*$").unwrap();
}

/// Parse a full signature line into a [`MethodSignature`].
pub fn parse_signature(text: &str) -> Result<MethodSignature, SignatureError> {
    let caps = SIGNATURE_RE
        .captures(text)
        .ok_or_else(|| SignatureError::malformed(text, "expected `name(parameters)`"))?;
    let name = &caps[1];
    let body = caps[2].trim();

    let mut parameters = Vec::new();
    if !body.is_empty() {
        for raw in split_parameters(text, body)? {
            parameters.push(parse_parameter(text, raw.trim())?);
        }
    }

    MethodSignature::new(name, parameters)
}

/// Split on top-level commas, leaving commas inside quotes or brackets alone.
fn split_parameters<'a>(signature: &str, body: &'a str) -> Result<Vec<&'a str>, SignatureError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SignatureError::malformed(signature, "unbalanced `]`"))?;
            }
            (None, ',') if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(SignatureError::malformed(signature, "unterminated string"));
    }
    if depth != 0 {
        return Err(SignatureError::malformed(signature, "unbalanced `[`"));
    }
    parts.push(&body[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(SignatureError::malformed(signature, "empty parameter"));
    }
    Ok(parts)
}

fn parse_parameter(signature: &str, raw: &str) -> Result<ParameterDescriptor, SignatureError> {
    let caps = PARAM_RE.captures(raw).ok_or_else(|| {
        SignatureError::malformed(signature, format!("cannot read parameter `{}`", raw))
    })?;

    let variadic = caps.get(1).is_some();
    let name = &caps[2];
    let types = match caps.get(3) {
        Some(types) => parse_types(signature, types.as_str())?,
        None => Vec::new(),
    };

    let mut param = ParameterDescriptor::new(name, types);
    if variadic {
        param = param.variadic();
    }
    if let Some(literal) = caps.get(4) {
        let default = parse_literal(literal.as_str())
            .ok_or_else(|| SignatureError::invalid_default(name, literal.as_str()))?;
        param = param.with_default(default);
    }
    Ok(param)
}

/// `int|float`, `?string`, `\App\Invoice`.
fn parse_types(signature: &str, text: &str) -> Result<Vec<PrimitiveKind>, SignatureError> {
    let mut kinds = Vec::new();
    for part in text.split('|') {
        let part = part.trim();
        let (nullable, type_name) = match part.strip_prefix('?') {
            Some(rest) => (true, rest.trim()),
            None => (false, part),
        };
        if !TYPE_NAME_RE.is_match(type_name) {
            return Err(SignatureError::malformed(
                signature,
                format!("invalid type `{}`", part),
            ));
        }
        // Unrecognized (class) names fall back to `string`.
        kinds.push(PrimitiveKind::from_type_name(type_name).unwrap_or(PrimitiveKind::String));
        if nullable {
            kinds.push(PrimitiveKind::Null);
        }
    }
    Ok(kinds)
}

fn parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();
    match text.to_ascii_lowercase().as_str() {
        "null" => return Some(Value::Null),
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "[]" => return Some(Value::Array(Vec::new())),
        _ => {}
    }

    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return Some(Value::String(text[1..text.len() - 1].to_string()));
        }
    }

    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Int(n));
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            return Some(Value::Float(f));
        }
    }
    None
}
