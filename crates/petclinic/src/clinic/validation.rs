use serde::{Deserialize, Serialize};

/// Input fields a rejection can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Description,
    Time,
    VetName,
    FirstName,
    LastName,
    Specialty,
}

/// Machine-readable reason codes surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Required,
    InvalidFormat,
    Past,
    Weekend,
    NotFound,
    MultiFound,
    Taken,
}

impl ErrorCode {
    pub const fn code(self) -> &'static str {
        match self {
            ErrorCode::Required => "required",
            ErrorCode::InvalidFormat => "invalidFormat",
            ErrorCode::Past => "past",
            ErrorCode::Weekend => "weekend",
            ErrorCode::NotFound => "notFound",
            ErrorCode::MultiFound => "multiFound",
            ErrorCode::Taken => "taken",
        }
    }
}

/// A rejection attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FormField,
    pub code: ErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FormField, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }

    pub fn required(field: FormField) -> Self {
        Self::new(field, ErrorCode::Required, "must not be empty")
    }
}

/// Trimmed, non-blank value of an optional form input.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
