//! Result type for calls whose failures are absorbed rather than raised.

/// Outcome of an operation that may fall back to a default instead of erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation produced its real value.
    Succeeded(T),
    /// The operation failed, and a fallback value stands in for the real one.
    Degraded { value: T, reason: String },
    /// The operation failed and there is nothing to stand in for it.
    Failed { reason: String },
}

impl<T> Outcome<T> {
    pub fn succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Why the operation did not succeed, if it didn't.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Succeeded(_) => None,
            Outcome::Degraded { reason, .. } | Outcome::Failed { reason } => Some(reason),
        }
    }

    /// The value carried by a succeeded or degraded outcome.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Succeeded(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Succeeded(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Failed { .. } => None,
        }
    }
}
