//! Class controllers.
//!
//! A [`ClassController`] wraps a registered target class and exposes every
//! method on it as a callable endpoint. For each call the method's declared
//! parameters are compiled into validation rules, the inbound fields are
//! validated, and the validated values are laid out positionally (variadic
//! parameters spread) before the method is invoked.
//!
//! ```ignore
//! struct InvoiceClassController;
//! impl ControllerDefinition for InvoiceClassController {}
//!
//! let mut controller = ClassController::new(&InvoiceClassController, &registry)?;
//! let reply = controller.call(&InboundCall::json("total").with_field("id", 7))?;
//! ```

mod arguments;
mod constructor;
mod dispatcher;
mod reply;
mod resolver;

#[cfg(test)]
mod tests;

pub use arguments::destructure;
pub use constructor::check_constructor_parameters;
pub use dispatcher::{ClassController, ControllerDefinition};
pub use reply::{Flash, InboundCall, Outcome, Reply};
pub use resolver::{infer_from_type_name, resolve_target_class};
