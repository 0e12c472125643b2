use thiserror::Error;

/// Input problems caught before the store or the remote is touched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocalValidationError {
    #[error("Please enter a name")]
    EmptyName,
    #[error("Please enter a valid limit greater than 0 (got {0})")]
    NonPositiveLimit(f64),
    #[error("`{0}` already exists")]
    DuplicateName(String),
    #[error("Start day must be between 1 and 28 (got {0})")]
    StartDayOutOfRange(u32),
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("Please choose an account")]
    MissingAccount,
}

/// Failure reported by a [`RemoteClient`](crate::remote::RemoteClient) call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteFailure {
    /// The server answered with a structured `detail` message.
    #[error("{detail}")]
    Rejected { detail: String },
    /// No response was obtained.
    #[error("transport error: {0}")]
    Transport(String),
    /// A response arrived but could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteFailure {
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::Rejected {
            detail: detail.into(),
        }
    }
}

/// Terminal failure of one optimistic mutation. The store has already been
/// restored to its pre-mutation snapshot when this is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("{0}")]
    ValidationRejected(String),
    #[error("the server could not be reached")]
    TransportFailure,
    #[error("unexpected response: {0}")]
    Unexpected(String),
    /// Another mutation on the same key has not settled yet.
    #[error("a change to `{0}` is still pending")]
    InFlight(String),
    /// A rename targeted a key another entry already holds.
    #[error("`{0}` already exists")]
    KeyTaken(String),
}

impl MutationError {
    /// Text to show the user. Server details are shown verbatim; anything
    /// without a structured reason falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            MutationError::ValidationRejected(detail) => detail.clone(),
            MutationError::InFlight(_) | MutationError::KeyTaken(_) => self.to_string(),
            MutationError::TransportFailure | MutationError::Unexpected(_) => fallback.to_string(),
        }
    }
}

impl From<RemoteFailure> for MutationError {
    fn from(failure: RemoteFailure) -> Self {
        match failure {
            RemoteFailure::Rejected { detail } => MutationError::ValidationRejected(detail),
            RemoteFailure::Transport(_) => MutationError::TransportFailure,
            RemoteFailure::Malformed(reason) => MutationError::Unexpected(reason),
        }
    }
}

/// Errors raised while loading or saving client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Error type returned by the session operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Local(#[from] LocalValidationError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Text to show the user, falling back to `fallback` when the failure
    /// carries no reason of its own.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Local(err) => err.to_string(),
            ClientError::Mutation(err) => err.user_message(fallback),
            ClientError::Remote(RemoteFailure::Rejected { detail }) => detail.clone(),
            ClientError::Remote(_) | ClientError::Config(_) => fallback.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
