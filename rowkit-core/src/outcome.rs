use std::fmt::{self, Display};

/// Classification of every service and executor call.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    #[default]
    Success = 0,
    Failed,
    NotFound,
    Invalid,
    Unauthorized,
    Warning,
}

impl Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeStatus::Success => "Success",
            OutcomeStatus::Failed => "Failed",
            OutcomeStatus::NotFound => "NotFound",
            OutcomeStatus::Invalid => "Invalid",
            OutcomeStatus::Unauthorized => "Unauthorized",
            OutcomeStatus::Warning => "Warning",
        })
    }
}

/// Uniform result of a data access call: a status, a human readable message and an optional payload.
///
/// Failures never travel as `Err`, they are folded into the status. `Failed` and `Invalid`
/// outcomes carry no payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub status: OutcomeStatus,
    pub message: String,
    pub payload: Option<T>,
}

impl<T> Outcome<T> {
    pub fn new(status: OutcomeStatus, message: impl Into<String>, payload: Option<T>) -> Self {
        Self {
            status,
            message: message.into(),
            payload,
        }
    }

    pub fn success(payload: T) -> Self {
        Self::success_with(payload, "Success")
    }

    pub fn success_with(payload: T, message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Success, message, Some(payload))
    }

    /// Successful, but the caller should look at the message.
    pub fn warning(payload: Option<T>, message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Warning, message, payload)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Failed, message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::NotFound, message, None)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Invalid, message, None)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Unauthorized, message, None)
    }

    /// True for `Success` and `Warning`.
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success | OutcomeStatus::Warning)
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Transform the payload keeping status and message.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            status: self.status,
            message: self.message,
            payload: self.payload.map(f),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// `NotFound` carrying the empty payload (`vec![]`, `0`).
    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::NotFound, message, Some(T::default()))
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::new(OutcomeStatus::Success, "Success", None)
    }
}

impl<T> Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}
