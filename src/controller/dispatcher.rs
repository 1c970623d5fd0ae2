//! The class controller: binds a target instance and dispatches calls to it.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::arguments::destructure;
use super::constructor::check_constructor_parameters;
use super::reply::{InboundCall, Outcome, Reply};
use super::resolver::resolve_target_class;
use crate::config::ControllerConfig;
use crate::error::{DispatchError, SetupError};
use crate::rules::compile_rules;
use crate::target::{ClassRegistry, Instance, TargetClass};
use crate::validation::{RuleValidator, ValidationEngine};
use crate::value::Value;

/// Hooks a concrete controller can override.
///
/// With every default in place the target is inferred from the
/// implementing type's name: `TestClassController` is backed by `Test`.
pub trait ControllerDefinition {
    /// Explicit target class name. Takes precedence over inference.
    fn inherited_class(&self) -> Option<&str> {
        None
    }

    /// Positional constructor arguments for the target.
    fn class_parameters(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Runs once on the fresh instance, after construction.
    fn post_class_setup(&self, _instance: &mut dyn Any) -> Result<(), String> {
        Ok(())
    }

    /// Type name used for suffix inference.
    fn controller_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A controller bound to one constructed target instance.
///
/// Setup either succeeds completely or returns a [`SetupError`]; a
/// half-initialised controller is never handed out.
pub struct ClassController {
    class: Rc<TargetClass>,
    instance: Instance,
    validator: Box<dyn ValidationEngine>,
}

impl ClassController {
    /// Set up a controller with the default configuration.
    pub fn new<D>(definition: &D, registry: &ClassRegistry) -> Result<Self, SetupError>
    where
        D: ControllerDefinition + ?Sized,
    {
        Self::with_config(definition, registry, &ControllerConfig::default())
    }

    pub fn with_config<D>(
        definition: &D,
        registry: &ClassRegistry,
        config: &ControllerConfig,
    ) -> Result<Self, SetupError>
    where
        D: ControllerDefinition + ?Sized,
    {
        let suffix = config.controller_suffix.as_str();
        let caller = if config.infer_target_from_name {
            definition.controller_name()
        } else {
            ""
        };
        let class_name = resolve_target_class(definition.inherited_class(), caller, suffix)
            .ok_or_else(|| SetupError::not_configured(suffix))?;

        let class = registry
            .get(&class_name)
            .ok_or_else(|| SetupError::class_not_found(&class_name))?;

        let arguments = definition.class_parameters();
        check_constructor_parameters(&class, &arguments)?;

        let mut instance = class
            .instantiate(arguments)
            .map_err(|message| SetupError::construction_failed(class.name(), message))?;

        definition
            .post_class_setup(&mut *instance)
            .map_err(|message| SetupError::construction_failed(class.name(), message))?;

        info!(
            controller = definition.controller_name(),
            class = class.name(),
            "class controller ready"
        );

        Ok(Self {
            class,
            instance,
            validator: Box::new(RuleValidator::new()),
        })
    }

    /// Controller for an explicitly named class with no constructor
    /// arguments and no hooks.
    pub fn for_class(name: &str, registry: &ClassRegistry) -> Result<Self, SetupError> {
        Self::with_config(&Explicit(name), registry, &ControllerConfig::explicit_only())
    }

    /// Replace the validation engine.
    pub fn with_validator(mut self, validator: impl ValidationEngine + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn target(&self) -> &TargetClass {
        &self.class
    }

    /// The target instance, if it is a `T`.
    pub fn instance<T: 'static>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    pub fn instance_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.instance.downcast_mut::<T>()
    }

    /// Validate the call's input against the method's signature and invoke
    /// the method with the destructured arguments.
    pub fn dispatch(&mut self, call: &InboundCall) -> Result<Outcome, DispatchError> {
        let class = Rc::clone(&self.class);
        let method = class
            .method(call.method())
            .ok_or_else(|| DispatchError::unknown_method(class.name(), call.method()))?;

        let parameters = method.signature().parameters();
        let rules = compile_rules(parameters);
        let validated = self.validator.validate(call.fields(), &rules);

        if validated.fails() {
            debug!(
                class = class.name(),
                method = call.method(),
                fields = ?validated.errors.fields().collect::<Vec<_>>(),
                "validation failed"
            );
            return Ok(Outcome::Invalid(validated.errors));
        }

        let arguments = destructure(parameters, &validated.fields);
        match method.invoke(&mut *self.instance, arguments) {
            Ok(value) => {
                debug!(class = class.name(), method = call.method(), "method returned");
                Ok(Outcome::Success(value))
            }
            Err(message) => {
                warn!(
                    class = class.name(),
                    method = call.method(),
                    error = %message,
                    "method failed"
                );
                Ok(Outcome::Failed(message))
            }
        }
    }

    /// Dispatch and shape the outcome for the caller.
    pub fn call(&mut self, call: &InboundCall) -> Result<Reply, DispatchError> {
        Ok(self.dispatch(call)?.into_reply(call.expects_json()))
    }

    /// Like [`ClassController::call`], with dispatch errors folded into a
    /// server-error reply.
    pub fn handle(&mut self, call: &InboundCall) -> Reply {
        self.call(call).unwrap_or_else(|err| {
            warn!(method = call.method(), error = %err, "dispatch error");
            Reply::from(err)
        })
    }
}

impl fmt::Debug for ClassController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassController")
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}

struct Explicit<'a>(&'a str);

impl ControllerDefinition for Explicit<'_> {
    fn inherited_class(&self) -> Option<&str> {
        Some(self.0)
    }
}
