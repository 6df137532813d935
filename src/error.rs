use std::path::Path;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("unknown content type: {0}")]
    UnknownKind(String),

    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Protocol(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::NotFound { .. } => "not_found",
            CoreError::UnknownKind(_) => "unknown_kind",
            CoreError::UnsupportedLocale(_) => "unsupported_locale",
            CoreError::Io { .. } => "io",
            CoreError::Json { .. } => "json",
            CoreError::Mail(_) => "mail",
            CoreError::Config(_) => "config",
            CoreError::Protocol(_) => "bad_request",
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        CoreError::Json {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CoreError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let err = CoreError::Validation(vec![
            FieldError::new("email", "invalid address"),
            FieldError::new("message", "too short"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: email: invalid address; message: too short"
        );
        assert_eq!(err.code(), "validation");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn not_found_names_kind_and_id() {
        let err = CoreError::NotFound {
            kind: "projects",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "projects not found: abc");
        assert!(err.field_errors().is_empty());
    }
}
