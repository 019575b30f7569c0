use crate::Error;
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

/// The entity declaration itself is broken (missing table name, no columns, unknown field).
///
/// This is a defect in the program and never becomes an [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub message: Cow<'static, str>,
}

impl ConfigurationError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigurationError {}

/// The request was rejected before reaching the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: Cow<'static, str>,
}

impl ValidationError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn is_configuration_error(error: &Error) -> bool {
    error.downcast_ref::<ConfigurationError>().is_some()
}

pub fn is_validation_error(error: &Error) -> bool {
    error.downcast_ref::<ValidationError>().is_some()
}
