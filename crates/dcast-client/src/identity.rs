//! Role resolution for the active wallet account.
//!
//! The contract classifies accounts with free-form strings ("OWNER",
//! "ADMIN", "VOTER"); [`normalize_classification`] folds those into the
//! closed [`Role`] enum, totally — every input maps somewhere, unknown
//! strings fail closed to guest. [`IdentityResolver`] caches the resolved
//! role for the active account and drops it the moment the account changes,
//! so consumers never observe a stale role against new-account data.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use dcast_shared::{Address, Role, RoleState, WalletError};

use crate::events::{ClientEvent, EventBus};
use crate::ledger::{AccountProvider, ClassificationService};
use crate::lock;

/// Fold a raw contract classification into a [`Role`].
///
/// Total: `None` (no connected account / unregistered) is guest, owner and
/// admin collapse to admin, voter is voter, and anything unrecognised is
/// guest rather than an unmapped case.
pub fn normalize_classification(raw: Option<&str>) -> Role {
    match raw {
        None => Role::Guest,
        Some(s) => match s.trim().to_ascii_lowercase().as_str() {
            "owner" | "admin" => Role::Admin,
            "voter" => Role::Voter,
            "guest" => Role::Guest,
            other => {
                if !other.is_empty() {
                    warn!(classification = other, "Unrecognised account classification");
                }
                Role::Guest
            }
        },
    }
}

struct Inner {
    account: Option<Address>,
    role: RoleState,
    /// The cached role came out of a failed classification. It is served
    /// fail-closed, but the next resolve re-queries instead of trusting it.
    degraded: bool,
}

/// Maps the active account to a [`RoleState`].
pub struct IdentityResolver {
    accounts: Arc<dyn AccountProvider>,
    classifier: Arc<dyn ClassificationService>,
    events: EventBus,
    inner: Mutex<Inner>,
}

impl IdentityResolver {
    pub fn new(
        accounts: Arc<dyn AccountProvider>,
        classifier: Arc<dyn ClassificationService>,
        events: EventBus,
    ) -> Self {
        let account = accounts.current_account();
        Self {
            accounts,
            classifier,
            events,
            inner: Mutex::new(Inner {
                account,
                role: RoleState::Unresolved,
                degraded: false,
            }),
        }
    }

    /// Snapshot of the current role state. Never blocks on the ledger.
    pub fn role(&self) -> RoleState {
        lock(&self.inner).role
    }

    /// The account the current role state belongs to.
    pub fn account(&self) -> Option<Address> {
        lock(&self.inner).account
    }

    /// The wallet reported a different active account (or disconnected).
    /// The cached role is invalidated immediately; readers observe
    /// [`RoleState::Unresolved`] until [`resolve`](Self::resolve) completes
    /// for the new account.
    pub fn account_changed(&self, account: Option<Address>) {
        {
            let mut inner = lock(&self.inner);
            if inner.account == account {
                return;
            }
            inner.account = account;
            inner.role = RoleState::Unresolved;
            inner.degraded = false;
        }
        info!(account = ?account.map(|a| a.short()), "Active account changed");
        self.events.emit(ClientEvent::AccountChanged { account });
    }

    /// Resolve the role for the active account.
    ///
    /// No account resolves to guest without touching the classifier. A
    /// classifier failure also resolves to guest — elevated access is never
    /// granted on a failed classification — but that outcome is not trusted
    /// as a cache: the next resolve re-queries, so a recovered classifier
    /// restores the real role on retry. If the account changes while the
    /// query is in flight the result is discarded and the state stays
    /// unresolved for the new account.
    pub async fn resolve(&self) -> RoleState {
        let account = {
            let inner = lock(&self.inner);
            if let RoleState::Resolved(_) = inner.role {
                if !inner.degraded {
                    return inner.role;
                }
            }
            inner.account
        };

        let (role, degraded) = match account {
            None => (Role::Guest, false),
            Some(addr) => match self.classifier.classify(&addr).await {
                Ok(classification) => {
                    (normalize_classification(classification.as_deref()), false)
                }
                Err(e) => {
                    warn!(account = %addr.short(), error = %e, "Classification failed, failing closed to guest");
                    (Role::Guest, true)
                }
            },
        };

        let mut inner = lock(&self.inner);
        if inner.account != account {
            // Superseded by an account change mid-query.
            return inner.role;
        }
        inner.role = RoleState::Resolved(role);
        inner.degraded = degraded;
        drop(inner);

        info!(role = %role, "Resolved account role");
        self.events.emit(ClientEvent::RoleResolved { role });
        RoleState::Resolved(role)
    }

    /// Run the wallet connect flow, then adopt the connected account.
    pub async fn connect(&self) -> Result<Address, WalletError> {
        let account = self.accounts.connect().await?;
        self.account_changed(Some(account));
        Ok(account)
    }
}
