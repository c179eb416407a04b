/// Progress of a single request flow (login, analyze, ...).
///
/// Each flow owns one instance; instances of different flows are independent.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    InFlight,
    Succeeded(T),
    /// Display-ready error message.
    Failed(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
