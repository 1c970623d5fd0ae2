//! Constructor argument checks run before a target is instantiated.

use crate::error::SetupError;
use crate::signature::describe_constructor_parameters;
use crate::target::TargetClass;
use crate::value::Value;

/// Verify that every constructor parameter without a default has a
/// positional argument in `supplied`. Types are left to the constructor.
pub fn check_constructor_parameters(
    class: &TargetClass,
    supplied: &[Value],
) -> Result<(), SetupError> {
    let Some(parameters) = describe_constructor_parameters(class) else {
        return Ok(());
    };

    for (i, parameter) in parameters.iter().enumerate() {
        if parameter.has_default() {
            continue;
        }
        if supplied.get(i).is_none() {
            return Err(SetupError::missing_argument(
                class.name(),
                parameter.name(),
                i + 1,
            ));
        }
    }

    Ok(())
}
