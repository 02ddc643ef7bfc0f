#![forbid(unsafe_code)]

//! Error types for configuration parsing and validation.
//!
//! The drawer runtime itself never fails: absent options fall back to
//! computed defaults and malformed geometry degrades to permanent
//! overscroll. These errors only surface from the opt-in
//! [`DrawerConfig::validate`](crate::config::DrawerConfig::validate) pass and
//! from parsing snap targets out of strings.

use std::fmt;

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(
        field: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// A string did not name one of the four snap targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTargetError {
    input: String,
}

impl ParseTargetError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown snap target {:?} (expected start, middle, end or closed)",
            self.input
        )
    }
}

impl std::error::Error for ParseTargetError {}
