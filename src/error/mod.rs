//! Error types for target registration, controller setup and dispatch.

use thiserror::Error;

/// Errors raised while reading a method signature manifest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignatureError {
    #[error("Malformed signature '{signature}': {message}")]
    Malformed { signature: String, message: String },

    #[error("Parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    #[error("Variadic parameter '{0}' must be the last parameter")]
    VariadicNotLast(String),

    #[error("Variadic parameter '{0}' cannot have a default value")]
    VariadicWithDefault(String),

    #[error("Invalid default value '{literal}' for parameter '{parameter}'")]
    InvalidDefault { parameter: String, literal: String },
}

impl SignatureError {
    pub fn malformed(signature: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            signature: signature.into(),
            message: message.into(),
        }
    }

    pub fn invalid_default(parameter: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::InvalidDefault {
            parameter: parameter.into(),
            literal: literal.into(),
        }
    }
}

/// Errors that leave a controller unusable. They are raised while the
/// controller is being built, so a failed controller never exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error(
        "The target class is not defined. You can either define the inherited class or end your controller name with {suffix}"
    )]
    TargetNotConfigured { suffix: String },

    #[error("The class {0} does not exist.")]
    TargetClassNotFound(String),

    #[error(
        "The class {class} requires the parameter {parameter} to be set as the {position} parameter. Define class_parameters() on your controller in the same order as the constructor parameters."
    )]
    MissingConstructorArgument {
        class: String,
        parameter: String,
        position: usize,
    },

    #[error("The class {class} could not be constructed: {message}")]
    ConstructionFailed { class: String, message: String },
}

impl SetupError {
    pub fn not_configured(suffix: impl Into<String>) -> Self {
        Self::TargetNotConfigured {
            suffix: suffix.into(),
        }
    }

    pub fn class_not_found(class: impl Into<String>) -> Self {
        Self::TargetClassNotFound(class.into())
    }

    pub fn missing_argument(
        class: impl Into<String>,
        parameter: impl Into<String>,
        position: usize,
    ) -> Self {
        Self::MissingConstructorArgument {
            class: class.into(),
            parameter: parameter.into(),
            position,
        }
    }

    pub fn construction_failed(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            class: class.into(),
            message: message.into(),
        }
    }

    /// HTTP status a transport should use when reporting this error.
    pub fn status_code(&self) -> u16 {
        500
    }
}

/// Errors surfaced by a dispatch call that are not part of the reply
/// contract. Validation and invocation failures are replies, not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Method {method} does not exist in class {class}")]
    UnknownMethod { class: String, method: String },
}

impl DispatchError {
    pub fn unknown_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// HTTP status a transport should use when reporting this error.
    pub fn status_code(&self) -> u16 {
        500
    }
}

/// Errors raised while loading controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for {variable}")]
    InvalidEnv { variable: String, value: String },
}

impl ConfigError {
    pub fn invalid_env(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            variable: variable.into(),
            value: value.into(),
        }
    }
}
