//! Inbound calls and the replies a controller hands back to its transport.

use indexmap::IndexMap;

use crate::error::{DispatchError, SetupError};
use crate::validation::ErrorBag;
use crate::value::{Fields, Value};

/// One call against a controller: the method name, the raw input fields and
/// whether the caller wants a structured (JSON) reply.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCall {
    method: String,
    fields: Fields,
    expects_json: bool,
}

impl InboundCall {
    pub fn new(method: impl Into<String>, fields: Fields, expects_json: bool) -> Self {
        Self {
            method: method.into(),
            fields,
            expects_json,
        }
    }

    /// A call from a client that wants JSON back.
    pub fn json(method: impl Into<String>) -> Self {
        Self::new(method, Fields::new(), true)
    }

    /// A call from a form post, answered by redirecting back.
    pub fn form(method: impl Into<String>) -> Self {
        Self::new(method, Fields::new(), false)
    }

    /// Decode a JSON object body into the call's fields.
    pub fn from_json_body(
        method: impl Into<String>,
        body: &str,
        expects_json: bool,
    ) -> Result<Self, serde_json::Error> {
        let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(body)?;
        let fields = raw.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
        Ok(Self::new(method, fields, expects_json))
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Merge route parameters over the body fields. Route values win.
    pub fn merge_route_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in parameters {
            self.fields.insert(name.into(), value.into());
        }
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn expects_json(&self) -> bool {
        self.expects_json
    }
}

/// Data flashed to the session when redirecting back.
#[derive(Debug, Clone, PartialEq)]
pub enum Flash {
    Success(Value),
    Errors(ErrorBag),
}

/// What the transport should send.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json { status: u16, body: Value },
    /// Redirect back to the previous page with flashed data.
    Back { flash: Flash },
    /// Abort with a status and a plain message.
    Abort { status: u16, message: String },
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Json { status, .. } | Reply::Abort { status, .. } => *status,
            Reply::Back { .. } => 302,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status())
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    pub fn is_unprocessable(&self) -> bool {
        self.status() == 422
    }

    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }

    pub fn json_body(&self) -> Option<&Value> {
        match self {
            Reply::Json { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn flash(&self) -> Option<&Flash> {
        match self {
            Reply::Back { flash } => Some(flash),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Reply::Abort { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<DispatchError> for Reply {
    fn from(err: DispatchError) -> Self {
        Reply::Abort {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl From<SetupError> for Reply {
    fn from(err: SetupError) -> Self {
        Reply::Abort {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

/// Result of one dispatch, before it is shaped for a particular caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The method ran and returned this value.
    Success(Value),
    /// Input did not pass validation.
    Invalid(ErrorBag),
    /// The method ran and reported an error.
    Failed(String),
}

impl Outcome {
    pub fn into_reply(self, expects_json: bool) -> Reply {
        match (self, expects_json) {
            (Outcome::Success(value), true) => Reply::Json {
                status: 200,
                body: value,
            },
            (Outcome::Success(value), false) => Reply::Back {
                flash: Flash::Success(value),
            },
            (Outcome::Invalid(errors), true) => Reply::Json {
                status: 422,
                body: errors_body(&errors),
            },
            (Outcome::Invalid(errors), false) => Reply::Back {
                flash: Flash::Errors(errors),
            },
            (Outcome::Failed(message), _) => Reply::Abort {
                status: 400,
                message,
            },
        }
    }
}

/// `{"errors": {field: [messages]}}`
fn errors_body(errors: &ErrorBag) -> Value {
    let fields: IndexMap<String, Value> = errors
        .iter()
        .map(|(field, messages)| {
            let messages = messages.iter().map(|m| Value::from(m.as_str())).collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect();
    let mut body = IndexMap::new();
    body.insert("errors".to_string(), Value::Object(fields));
    Value::Object(body)
}
