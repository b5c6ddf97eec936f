use thiserror::Error;

use crate::types::SessionId;

#[derive(Error, Debug)]
pub enum DcastError {
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] NumericError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Registry misconfiguration. A path reached the registry that was never
/// declared in it, which is a programmer error, not user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    Unknown(String),
}

/// Expected, user-recoverable failures while building a session view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// The ledger has no session record for the requested id.
    #[error("Voting session with ID {0} does not exist")]
    SessionNotFound(SessionId),
}

/// Data-integrity defects at the wire-numeric boundary. These are surfaced,
/// never clamped or defaulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    /// A 256-bit ledger value does not fit a displayable integer.
    #[error("Value of `{field}` exceeds the displayable integer range")]
    Overflow { field: &'static str },

    /// The session carried a phase discriminant outside the known lifecycle.
    #[error("Unknown voting phase discriminant: {0}")]
    UnknownPhase(u8),

    /// A unix timestamp that chrono cannot represent.
    #[error("Timestamp of `{field}` is out of range")]
    TimestampOutOfRange { field: &'static str },
}

/// Wallet / account-provider failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The user declined the connection prompt.
    #[error("Wallet connection rejected")]
    ConnectionRejected,

    /// An operation that needs an account ran without one connected.
    #[error("No account connected")]
    NotConnected,
}

/// Transient failures of the external ledger collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DcastError>;
