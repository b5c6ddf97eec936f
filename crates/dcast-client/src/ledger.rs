//! Contracts for the external collaborators this core consumes.
//!
//! The concrete bindings (browser wallet, JSON-RPC ledger client) live
//! outside this crate; everything here is expressed against these traits so
//! the core stays pure and testable with in-memory fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;

use dcast_shared::{
    Address, CandidateRecord, LedgerError, SessionId, SessionRecord, VoterId, VoterRecord,
    WalletError,
};

/// The wallet: which account is active, and the connect flow.
///
/// Account *changes* are pushed by the shell into
/// [`IdentityResolver::account_changed`](crate::identity::IdentityResolver::account_changed);
/// this trait only answers the pull side.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    fn current_account(&self) -> Option<Address>;

    /// Prompt the user to connect. Fails with
    /// [`WalletError::ConnectionRejected`] if they decline.
    async fn connect(&self) -> Result<Address, WalletError>;
}

/// Account classification as recorded on the contract ("OWNER", "ADMIN",
/// "VOTER", ...). `None` means the contract knows nothing about the address.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn classify(&self, account: &Address) -> Result<Option<String>, LedgerError>;
}

/// Read-only view of the voting contract's storage.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// `None` when no session exists under `id`.
    async fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, LedgerError>;

    async fn candidates(&self, id: SessionId) -> Result<Vec<CandidateRecord>, LedgerError>;

    async fn voters(&self, id: SessionId) -> Result<Vec<VoterRecord>, LedgerError>;

    /// Declared winners of `id`. Meaningful only once the session is closed;
    /// callers must not read this for earlier phases.
    async fn winner_ids(&self, id: SessionId) -> Result<BTreeSet<u64>, LedgerError>;

    /// Global voter id registered for `account`, if any.
    async fn voter_id(&self, account: &Address) -> Result<Option<VoterId>, LedgerError>;

    /// Sessions `account` is registered in as a voter.
    async fn voter_sessions(&self, account: &Address) -> Result<Vec<SessionId>, LedgerError>;

    /// `account`'s voter record within one session (weight and vote), or
    /// `None` if it is not registered there.
    async fn voter_in_session(
        &self,
        id: SessionId,
        account: &Address,
    ) -> Result<Option<VoterRecord>, LedgerError>;
}
