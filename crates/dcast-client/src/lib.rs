//! Headless client core for the DCast voting dApp.
//!
//! The authoritative state lives on an external ledger contract; this crate
//! is everything a frontend needs between that ledger and the screen:
//! route access decisions, role resolution for the connected account, and
//! projection of raw session records into display-ready view models.
//! Wallet plumbing, the ledger binding, and the rendering shell stay behind
//! the collaborator traits in [`ledger`].

pub mod access;
pub mod config;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod loader;
pub mod projector;
pub mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing_subscriber::{fmt, EnvFilter};

/// Lock a mutex, recovering the guard if a previous holder panicked.
/// Every value guarded in this crate is replaced by a single assignment,
/// so a poisoned lock cannot expose a torn state.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG`; falls back to a per-crate default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dcast_client=debug,dcast_shared=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Starting DCast client core");
}
