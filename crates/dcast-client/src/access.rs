//! Static route registry and the role-based navigation gate.
//!
//! Every page of the app is declared here with its display title and the
//! role it requires. The table is fixed at compile time; menu order follows
//! declaration order and is significant. The guard only *decides* — the
//! navigation shell is responsible for redirecting on a denial.

use serde::{Deserialize, Serialize};

use dcast_shared::{Role, RoleState, RouteError};

/// A navigable page of the app.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Home,
    AddVotingSession,
    RegisterVoterCandidate,
    UpdateVotingPhase,
    AddAccount,
    ViewAccounts,
    MyVotingSessions,
    CastVote,
}

impl Route {
    /// All registered routes, in menu order.
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::AddVotingSession,
        Route::RegisterVoterCandidate,
        Route::UpdateVotingPhase,
        Route::AddAccount,
        Route::ViewAccounts,
        Route::MyVotingSessions,
        Route::CastVote,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::AddVotingSession => "/add-voting-session",
            Self::RegisterVoterCandidate => "/register-voter-candidate",
            Self::UpdateVotingPhase => "/update-voting-phase",
            Self::AddAccount => "/add-account",
            Self::ViewAccounts => "/view-accounts",
            Self::MyVotingSessions => "/my-voting-sessions",
            Self::CastVote => "/cast-vote",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Check Voting Session",
            Self::AddVotingSession => "Add Voting Session",
            Self::RegisterVoterCandidate => "Register Voter/Candidate",
            Self::UpdateVotingPhase => "Update Voting Phase",
            Self::AddAccount => "Add Account",
            Self::ViewAccounts => "View Accounts",
            Self::MyVotingSessions => "My Voting Sessions",
            Self::CastVote => "Cast Vote",
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Self::Home => Role::Guest,
            Self::AddVotingSession
            | Self::RegisterVoterCandidate
            | Self::UpdateVotingPhase
            | Self::AddAccount
            | Self::ViewAccounts => Role::Admin,
            Self::MyVotingSessions | Self::CastVote => Role::Voter,
        }
    }

    /// Look up a route by its path. Unknown paths are a registry
    /// misconfiguration, not user input.
    pub fn from_path(path: &str) -> Result<Self, RouteError> {
        Self::ALL
            .iter()
            .copied()
            .find(|route| route.path() == path)
            .ok_or_else(|| RouteError::Unknown(path.to_string()))
    }
}

/// True iff `role` may see and use `route`. Home is reachable by everyone.
pub fn is_allowed(route: Route, role: Role) -> bool {
    route == Route::Home || route.required_role() == role
}

/// The routes `role` should see in the navigation menu, in declaration
/// order. Always contains [`Route::Home`].
pub fn visible_routes(role: Role) -> Vec<Route> {
    Route::ALL
        .iter()
        .copied()
        .filter(|route| is_allowed(*route, role))
        .collect()
}

/// Outcome of a navigation guard check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuardDecision {
    Allow,
    /// The shell should redirect home and surface a denial notice.
    Deny,
    /// Role resolution is still in flight; hold the page, decide later.
    /// Denying here would flash-redirect on every load before identity
    /// is known.
    Pending,
}

/// Decide whether the current actor may stay on `route`.
pub fn guard(route: Route, role: RoleState) -> GuardDecision {
    match role.role() {
        None => GuardDecision::Pending,
        Some(role) if is_allowed(route, role) => GuardDecision::Allow,
        Some(_) => GuardDecision::Deny,
    }
}
