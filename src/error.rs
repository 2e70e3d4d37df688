/// Failure taxonomy for a dispatched request. `Canceled` is reserved for
/// failures whose root cause is the coordinator's own cancellation signal;
/// every other kind originates from the transport.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("network failure: {0}")]
    Network(String),
    #[error("unexpected status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("request canceled")]
    Canceled,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    pub fn canceled() -> Self {
        Self::new(ErrorKind::Canceled)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// True when the request failed because it was superseded by an
    /// identical request or swept up by `cancel_all_pending_requests`.
    pub fn is_canceled(&self) -> bool {
        matches!(self.kind, ErrorKind::Canceled)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
