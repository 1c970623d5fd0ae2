//! Turning validated fields back into positional arguments.

use crate::signature::ParameterDescriptor;
use crate::value::{Fields, Value};

/// Lay out validated data as the positional argument list for a method.
///
/// Non-variadic parameters take one position each, in declaration order.
/// An omitted optional parameter gets its declared default so later
/// positions stay aligned. The variadic parameter's elements are appended
/// one by one; an omitted variadic adds nothing.
pub fn destructure(parameters: &[ParameterDescriptor], validated: &Fields) -> Vec<Value> {
    let mut args = Vec::with_capacity(parameters.len());

    for param in parameters {
        let value = validated.get(param.name());

        if param.is_variadic() {
            match value {
                Some(Value::Array(items)) => args.extend(items.iter().cloned()),
                Some(Value::Object(map)) => args.extend(map.values().cloned()),
                Some(Value::Null) | None => {}
                Some(other) => args.push(other.clone()),
            }
            continue;
        }

        let value = value
            .cloned()
            .or_else(|| param.default_value().cloned())
            .unwrap_or(Value::Null);
        args.push(value);
    }

    args
}
