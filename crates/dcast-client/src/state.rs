//! Application state wiring the core components together.
//!
//! [`AppState`] is the composition root a frontend holds on to: it owns the
//! identity resolver, the session loader, and the event bus they publish
//! on, all built over the caller-supplied collaborator implementations.

use std::sync::Arc;

use dcast_shared::{Address, RoleState};

use crate::access::{self, GuardDecision, Route};
use crate::config::ClientConfig;
use crate::events::{ClientEvent, EventBus};
use crate::identity::IdentityResolver;
use crate::ledger::{AccountProvider, ClassificationService, LedgerReader};
use crate::loader::SessionLoader;

/// Central application state.
pub struct AppState {
    pub config: ClientConfig,
    pub identity: Arc<IdentityResolver>,
    pub sessions: Arc<SessionLoader>,
    events: EventBus,
}

impl AppState {
    pub fn new(
        config: ClientConfig,
        accounts: Arc<dyn AccountProvider>,
        classifier: Arc<dyn ClassificationService>,
        ledger: Arc<dyn LedgerReader>,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);
        let identity = Arc::new(IdentityResolver::new(accounts, classifier, events.clone()));
        let sessions = Arc::new(SessionLoader::new(ledger, events.clone()));
        Self {
            config,
            identity,
            sessions,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Guard `route` against the current role state, emitting the denial
    /// event the shell reacts to (redirect home, show a notice).
    pub fn guard_route(&self, route: Route) -> GuardDecision {
        let decision = access::guard(route, self.identity.role());
        if decision == GuardDecision::Deny {
            self.events.emit(ClientEvent::AccessDenied { route });
        }
        decision
    }

    /// The navigation menu for the current role state. An unresolved role
    /// renders the guest menu until resolution lands; the guard keeps the
    /// actual pages deferred meanwhile.
    pub fn menu(&self) -> Vec<Route> {
        let role = match self.identity.role() {
            RoleState::Resolved(role) => role,
            RoleState::Unresolved => dcast_shared::Role::Guest,
        };
        access::visible_routes(role)
    }

    /// Push an account change reported by the wallet shell.
    pub fn account_changed(&self, account: Option<Address>) {
        self.identity.account_changed(account);
    }
}
