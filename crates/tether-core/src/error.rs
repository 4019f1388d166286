//! Error types shared across the Tether crates.
//!
//! Tool-scoped failures (`ToolError`, `ValidationError`) are never fatal to a
//! turn: the agent loop folds them into the working context. Connection and
//! model failures are surfaced to the caller.

use crate::schema::PrimitiveKind;
use thiserror::Error;

/// A single reason a set of call arguments was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldIssue {
    /// Arguments were not a JSON object.
    #[error("expected an object of named arguments, found {found}")]
    NotAnObject { found: &'static str },

    /// A required parameter was absent.
    #[error("missing required parameter '{field}'")]
    Missing { field: String },

    /// A parameter was present with the wrong JSON type.
    #[error("parameter '{field}' must be a {expected}, found {found}")]
    WrongType {
        field: String,
        expected: PrimitiveKind,
        found: &'static str,
    },
}

impl FieldIssue {
    /// Name of the offending parameter, if the issue is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            FieldIssue::NotAnObject { .. } => None,
            FieldIssue::Missing { field } | FieldIssue::WrongType { field, .. } => Some(field),
        }
    }
}

/// Call arguments failed a translated parameter specification.
///
/// All issues found in one pass are reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// Returns true if any issue concerns the named parameter.
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field() == Some(field))
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while invoking a single capability.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The model asked for a capability the registry does not expose.
    #[error("Capability '{name}' not found")]
    NotFound { name: String },

    /// Arguments failed the capability's parameter specification.
    #[error("Capability '{tool}' received invalid arguments: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: ValidationError,
    },

    /// The transport or the provider failed while executing the call.
    #[error("Capability '{tool}' execution failed: {message}")]
    ExecutionFailed { tool: String, message: String },
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        ToolError::NotFound { name: name.into() }
    }

    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Name of the capability involved in the failure.
    pub fn tool_name(&self) -> &str {
        match self {
            ToolError::NotFound { name } => name,
            ToolError::InvalidArguments { tool, .. } | ToolError::ExecutionFailed { tool, .. } => {
                tool
            }
        }
    }

    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "TOOL_NOT_FOUND",
            ToolError::InvalidArguments { .. } => "VALIDATION_ERROR",
            ToolError::ExecutionFailed { .. } => "TOOL_EXECUTION_ERROR",
        }
    }
}

/// Result type for capability invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// The capability provider could not be reached or did not complete its
/// handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Connection error: {message}")]
pub struct ConnectionError {
    pub message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced at the model invocation boundary.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The request never produced a response (transport, HTTP status).
    #[error("Model request failed: {0}")]
    Request(String),

    /// A response arrived but could not be understood.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// The model backend refused to serve the request.
    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// Result type for model invocations.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            FieldIssue::Missing {
                field: "username".to_string(),
            },
            FieldIssue::WrongType {
                field: "amount".to_string(),
                expected: PrimitiveKind::Number,
                found: "string",
            },
        ]);

        let rendered = err.to_string();
        assert!(rendered.contains("missing required parameter 'username'"));
        assert!(rendered.contains("parameter 'amount' must be a number, found string"));
        assert!(err.mentions("amount"));
        assert!(!err.mentions("category"));
    }

    #[test]
    fn test_tool_error_display_and_code() {
        let err = ToolError::not_found("list_expenses");
        assert_eq!(err.to_string(), "Capability 'list_expenses' not found");
        assert_eq!(err.error_code(), "TOOL_NOT_FOUND");
        assert_eq!(err.tool_name(), "list_expenses");

        let err = ToolError::execution_failed("create_expense", "broken pipe");
        assert!(err.to_string().contains("execution failed: broken pipe"));
        assert_eq!(err.error_code(), "TOOL_EXECUTION_ERROR");
    }

    #[test]
    fn test_invalid_arguments_keeps_source() {
        let err = ToolError::InvalidArguments {
            tool: "list_expenses_by_category".to_string(),
            source: ValidationError::new(vec![FieldIssue::Missing {
                field: "category".to_string(),
            }]),
        };

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("missing required parameter 'category'"));
    }
}
