//! Events pushed from the core to whatever shell is rendering it.
//!
//! The string constants are the event names a JS/desktop shell subscribes
//! under; the payload enum carries the same data for in-process Rust
//! consumers over a tokio broadcast channel.

use serde::Serialize;
use tokio::sync::broadcast;

use dcast_shared::{Address, Role, SessionId};

use crate::access::Route;

pub const EVENT_ACCOUNT_CHANGED: &str = "account-changed";
pub const EVENT_ROLE_RESOLVED: &str = "role-resolved";
pub const EVENT_SESSION_LOADED: &str = "session-loaded";
pub const EVENT_ACCESS_DENIED: &str = "access-denied";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// The wallet reported a different active account (or none). Consumers
    /// should treat any role they hold as stale.
    AccountChanged { account: Option<Address> },
    /// Role resolution for the active account completed.
    RoleResolved { role: Role },
    /// A session view model was committed as the displayed one.
    SessionLoaded { session_id: SessionId },
    /// A guard denied a route; the shell should go home and show a notice.
    AccessDenied { route: Route },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountChanged { .. } => EVENT_ACCOUNT_CHANGED,
            Self::RoleResolved { .. } => EVENT_ROLE_RESOLVED,
            Self::SessionLoaded { .. } => EVENT_SESSION_LOADED,
            Self::AccessDenied { .. } => EVENT_ACCESS_DENIED,
        }
    }
}

/// Fan-out handle for [`ClientEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. A send with no live subscribers is not an error for
    /// the core; it is logged and dropped.
    pub fn emit(&self, event: ClientEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            tracing::debug!(event = name, "No subscribers for event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(ClientEvent::SessionLoaded {
            session_id: SessionId(3),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            ClientEvent::SessionLoaded {
                session_id: SessionId(3)
            }
        );
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.emit(ClientEvent::AccountChanged { account: None });
    }

    #[test]
    fn test_event_names() {
        let event = ClientEvent::AccessDenied { route: Route::CastVote };
        assert_eq!(event.name(), EVENT_ACCESS_DENIED);
    }
}
