use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("field `{field}` is required")]
    MissingField { field: &'static str },
    #[error("field `{field}` is invalid: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => field,
        }
    }
}

/// Unwrap a required text field. Missing and blank values fail alike.
pub fn require_text(value: Option<String>, field: &'static str) -> Result<String, DomainError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(DomainError::missing(field)),
    }
}
