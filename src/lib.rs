//! Class controllers: expose the methods of a plain type as validated
//! endpoints.
//!
//! Each dispatchable method declares its parameter signature. From it the
//! crate derives validation rules, validates inbound fields, coerces them to
//! the declared kinds and calls the method with positional arguments.
//!
//! # Pieces
//!
//! - [`signature`]: parameter descriptors and the signature manifest parser
//! - [`rules`]: descriptors to rule sets
//! - [`validation`]: the validation engine trait and its default engine
//! - [`target`]: target classes and the registry controllers resolve against
//! - [`controller`]: target resolution, setup and dispatch

#![allow(clippy::new_without_default)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod controller;
pub mod error;
pub mod rules;
pub mod signature;
pub mod target;
pub mod validation;
pub mod value;

pub use config::ControllerConfig;
pub use controller::{ClassController, ControllerDefinition, Flash, InboundCall, Outcome, Reply};
pub use error::{ConfigError, DispatchError, SetupError, SignatureError};
pub use rules::{compile_rules, RuleSet, RuleSpec, RuleToken};
pub use signature::{MethodSignature, ParameterDescriptor, PrimitiveKind};
pub use target::{ClassRegistry, TargetClass};
pub use validation::{ErrorBag, RuleValidator, Validated, ValidationEngine};
pub use value::{Fields, Value};
