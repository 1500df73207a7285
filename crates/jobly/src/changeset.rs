//! Changeset-style validation error types.
//!
//! `New*` inputs collect every problem in one pass instead of stopping at
//! the first, so a client sees all rejected fields at once.

use serde::Serialize;
use std::fmt;

/// A machine-friendly validation code.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCode {
    Required,
    Len,
    Range,
    Email,
    Regex,
    Url,
    OneOf,
    Custom(String),
}

impl ValidationCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Len => "len",
            Self::Range => "range",
            Self::Email => "email",
            Self::Regex => "regex",
            Self::Url => "url",
            Self::OneOf => "one_of",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl Serialize for ValidationCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// A collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.items.push(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.items.iter()
    }

    /// Record an error for `field`.
    pub fn add(&mut self, field: &str, code: ValidationCode, message: impl Into<String>) {
        self.push(ValidationError::new(field, code, message));
    }

    /// Require a non-blank string of at most `max` characters.
    pub fn check_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, ValidationCode::Required, format!("{} is required", field));
        } else if value.chars().count() > max {
            self.add(
                field,
                ValidationCode::Len,
                format!("{} must be at most {} characters", field, max),
            );
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.items.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
