//! Asynchronous session loading.
//!
//! One "load session" action fans out the ledger reads it needs, joins them
//! fail-fast, projects, and then decides whether the result is still the
//! one the user asked for last. Requests are identified by a monotonically
//! increasing sequence number taken at issue time, so the displayed view
//! model follows request order, not completion order.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dcast_shared::{
    Address, DcastError, LedgerError, Phase, ProjectionError, SessionId, VoterId,
};

use crate::events::{ClientEvent, EventBus};
use crate::lock;
use crate::ledger::LedgerReader;
use crate::projector::{project, vote_status, SessionViewModel, VoteStatus};

/// One row of the "My Voting Sessions" table: the session plus this
/// voter's standing in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MySessionRow {
    pub session_id: SessionId,
    pub session_name: String,
    pub phase: Phase,
    pub weight: u64,
    pub vote: VoteStatus,
}

/// Loads sessions from the ledger and tracks which view model is the one
/// currently displayed.
pub struct SessionLoader {
    ledger: Arc<dyn LedgerReader>,
    events: EventBus,
    /// Sequence number of the most recently issued load request.
    seq: AtomicU64,
    /// `(request seq, view model)` of the committed display state.
    current: Mutex<Option<(u64, SessionViewModel)>>,
}

impl SessionLoader {
    pub fn new(ledger: Arc<dyn LedgerReader>, events: EventBus) -> Self {
        Self {
            ledger,
            events,
            seq: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// The view model the page should currently render, if any.
    pub fn current_view(&self) -> Option<SessionViewModel> {
        lock(&self.current)
            .as_ref()
            .map(|(_, vm)| vm.clone())
    }

    /// Load `id` and, if this is still the newest request by the time it
    /// completes, commit it as the displayed view model.
    ///
    /// Returns `Ok(None)` when the result was superseded by a later
    /// request; the caller should simply not render it. All ledger reads
    /// for one load are joined fail-fast, and a missing session surfaces as
    /// [`ProjectionError::SessionNotFound`], never as an empty view model.
    pub async fn load(&self, id: SessionId) -> Result<Option<SessionViewModel>, DcastError> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(session = %id, seq, "Loading voting session");

        let vm = match self.fetch(id).await {
            Ok(vm) => vm,
            Err(e) => {
                // The user's latest request failed; whatever was displayed
                // before must not stay on screen behind the error message.
                // An already-superseded request has no claim on the display.
                let mut current = lock(&self.current);
                if seq == self.seq.load(Ordering::SeqCst) {
                    *current = None;
                }
                return Err(e);
            }
        };

        {
            let mut current = lock(&self.current);
            if seq != self.seq.load(Ordering::SeqCst) {
                debug!(session = %id, seq, "Load superseded by a newer request");
                return Ok(None);
            }
            if matches!(*current, Some((committed, _)) if committed > seq) {
                return Ok(None);
            }
            *current = Some((seq, vm.clone()));
        }

        info!(session = %id, candidates = vm.candidates.len(), voters = vm.voters.len(), "Session loaded");
        self.events.emit(ClientEvent::SessionLoaded { session_id: id });
        Ok(Some(vm))
    }

    /// Fan out the reads for one session and project them. No display
    /// state is touched here; [`load`](Self::load) decides what to commit.
    async fn fetch(&self, id: SessionId) -> Result<SessionViewModel, DcastError> {
        let (session, candidates, voters) = tokio::try_join!(
            self.ledger.session(id),
            self.ledger.candidates(id),
            self.ledger.voters(id),
        )?;

        let session = session.ok_or(ProjectionError::SessionNotFound(id))?;

        // Winners exist only for closed sessions; don't read them earlier.
        let winner_ids = if Phase::from_wire(session.phase)? == Phase::Closed {
            self.ledger.winner_ids(id).await?
        } else {
            BTreeSet::new()
        };

        project(&session, &candidates, &voters, &winner_ids)
    }

    /// The voter id registered for `account`, shown in the My Voting
    /// Sessions header. `None` when the account is not registered anywhere.
    pub async fn voter_id(&self, account: &Address) -> Result<Option<VoterId>, DcastError> {
        Ok(self.ledger.voter_id(account).await?)
    }

    /// Build the "My Voting Sessions" rows for `account`: every session the
    /// account is registered in as a voter, with its weight and vote there.
    /// Per-session reads run concurrently and fail fast.
    pub async fn my_sessions(&self, account: &Address) -> Result<Vec<MySessionRow>, DcastError> {
        let session_ids = self.ledger.voter_sessions(account).await?;
        debug!(account = %account.short(), sessions = session_ids.len(), "Loading voter sessions");

        futures::future::try_join_all(
            session_ids
                .into_iter()
                .map(|sid| self.my_session_row(sid, account)),
        )
        .await
    }

    async fn my_session_row(
        &self,
        id: SessionId,
        account: &Address,
    ) -> Result<MySessionRow, DcastError> {
        let (session, voter) = tokio::try_join!(
            self.ledger.session(id),
            self.ledger.voter_in_session(id, account),
        )?;

        let session = session.ok_or(ProjectionError::SessionNotFound(id))?;
        // The session listed this account as a voter; a missing record here
        // is ledger inconsistency, not a user condition.
        let voter = voter.ok_or_else(|| {
            LedgerError::Unavailable(format!("voter record missing in session {id}"))
        })?;

        Ok(MySessionRow {
            session_id: SessionId(session.id.to_u64("sessionId")?),
            session_name: session.name,
            phase: Phase::from_wire(session.phase)?,
            weight: voter.weight.to_u64("weight")?,
            vote: vote_status(voter.voted_candidate_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use dcast_shared::{CandidateRecord, CandidateId, SessionRecord, Uint256, VoterId, VoterRecord};

    #[derive(Default)]
    struct FakeLedger {
        sessions: HashMap<u64, SessionRecord>,
        candidates: HashMap<u64, Vec<CandidateRecord>>,
        voters: HashMap<u64, Vec<VoterRecord>>,
        winners: HashMap<u64, BTreeSet<u64>>,
        registrations: HashMap<Address, Vec<u64>>,
        /// Artificial latency per session id, to stage races.
        delay_ms: HashMap<u64, u64>,
        fail_candidates: bool,
        winner_reads: AtomicUsize,
    }

    impl FakeLedger {
        fn with_session(mut self, id: u64, phase: u8) -> Self {
            self.sessions.insert(
                id,
                SessionRecord {
                    id: Uint256::from_u64(id),
                    name: format!("Session {id}"),
                    phase,
                    registered_at: Uint256::from_u64(1_700_000_000),
                    voting_at: Uint256::from_u64(1_700_100_000),
                    closed_at: Uint256::from_u64(1_700_200_000),
                },
            );
            self
        }

        async fn stall(&self, id: SessionId) {
            if let Some(&ms) = self.delay_ms.get(&id.0) {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
    }

    #[async_trait]
    impl LedgerReader for FakeLedger {
        async fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, LedgerError> {
            self.stall(id).await;
            Ok(self.sessions.get(&id.0).cloned())
        }

        async fn candidates(&self, id: SessionId) -> Result<Vec<CandidateRecord>, LedgerError> {
            if self.fail_candidates {
                return Err(LedgerError::Unavailable("candidate read failed".into()));
            }
            Ok(self.candidates.get(&id.0).cloned().unwrap_or_default())
        }

        async fn voters(&self, id: SessionId) -> Result<Vec<VoterRecord>, LedgerError> {
            Ok(self.voters.get(&id.0).cloned().unwrap_or_default())
        }

        async fn winner_ids(&self, id: SessionId) -> Result<BTreeSet<u64>, LedgerError> {
            self.winner_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.winners.get(&id.0).cloned().unwrap_or_default())
        }

        async fn voter_id(&self, _account: &Address) -> Result<Option<VoterId>, LedgerError> {
            Ok(Some(VoterId(1)))
        }

        async fn voter_sessions(&self, account: &Address) -> Result<Vec<SessionId>, LedgerError> {
            Ok(self
                .registrations
                .get(account)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(SessionId)
                .collect())
        }

        async fn voter_in_session(
            &self,
            id: SessionId,
            account: &Address,
        ) -> Result<Option<VoterRecord>, LedgerError> {
            Ok(self
                .voters
                .get(&id.0)
                .and_then(|vs| vs.iter().find(|v| &v.address == account))
                .cloned())
        }
    }

    fn loader(ledger: FakeLedger) -> SessionLoader {
        SessionLoader::new(Arc::new(ledger), EventBus::default())
    }

    #[tokio::test]
    async fn test_missing_session_surfaces_not_found() {
        let loader = loader(FakeLedger::default());
        let err = loader.load(SessionId(404)).await.unwrap_err();
        assert!(matches!(
            err,
            DcastError::Projection(ProjectionError::SessionNotFound(SessionId(404)))
        ));
        assert!(loader.current_view().is_none());
    }

    #[tokio::test]
    async fn test_load_commits_view_model() {
        let loader = loader(FakeLedger::default().with_session(1, 1));
        let vm = loader.load(SessionId(1)).await.unwrap().unwrap();
        assert_eq!(vm.id, SessionId(1));
        assert_eq!(vm.phase, Phase::Voting);
        assert_eq!(loader.current_view().unwrap(), vm);
    }

    #[tokio::test]
    async fn test_winners_read_only_for_closed_sessions() {
        let ledger = FakeLedger::default().with_session(1, 1).with_session(2, 2);
        let reads = Arc::new(ledger);
        let loader = SessionLoader::new(reads.clone(), EventBus::default());

        loader.load(SessionId(1)).await.unwrap();
        assert_eq!(reads.winner_reads.load(Ordering::SeqCst), 0);

        loader.load(SessionId(2)).await.unwrap();
        assert_eq!(reads.winner_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ledger_failure_fails_fast() {
        let mut ledger = FakeLedger::default().with_session(1, 0);
        ledger.fail_candidates = true;
        let loader = loader(ledger);

        let err = loader.load(SessionId(1)).await.unwrap_err();
        assert!(matches!(err, DcastError::Ledger(_)));
        assert!(loader.current_view().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_discards_displayed_view() {
        let loader = loader(FakeLedger::default().with_session(1, 1));
        loader.load(SessionId(1)).await.unwrap();
        assert!(loader.current_view().is_some());

        // The next thing the user asked for does not exist; the old view
        // model must not linger behind the not-found message.
        let err = loader.load(SessionId(404)).await.unwrap_err();
        assert!(matches!(
            err,
            DcastError::Projection(ProjectionError::SessionNotFound(SessionId(404)))
        ));
        assert!(loader.current_view().is_none());
    }

    #[tokio::test]
    async fn test_superseded_failure_does_not_discard_newer_view() {
        let mut ledger = FakeLedger::default().with_session(2, 1);
        // The doomed request is slow; a successful one overtakes it.
        ledger.delay_ms.insert(404, 80);
        let loader = Arc::new(SessionLoader::new(Arc::new(ledger), EventBus::default()));

        let doomed = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(SessionId(404)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        loader.load(SessionId(2)).await.unwrap();

        // The stale failure resolves afterwards; the committed view stays.
        assert!(doomed.await.unwrap().is_err());
        assert_eq!(loader.current_view().unwrap().id, SessionId(2));
    }

    #[tokio::test]
    async fn test_last_request_wins_regardless_of_completion_order() {
        let mut ledger = FakeLedger::default().with_session(1, 1).with_session(2, 1);
        // Session 1 reads are slow; session 2 completes first.
        ledger.delay_ms.insert(1, 80);
        let loader = Arc::new(SessionLoader::new(Arc::new(ledger), EventBus::default()));

        let first = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(SessionId(1)).await })
        };
        // Make sure the first request is issued before the second.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = loader.load(SessionId(2)).await.unwrap().unwrap();
        assert_eq!(second.id, SessionId(2));

        // The earlier, slower request resolves afterwards and is discarded.
        let first = first.await.unwrap().unwrap();
        assert_eq!(first, None);
        assert_eq!(loader.current_view().unwrap().id, SessionId(2));
    }

    #[tokio::test]
    async fn test_my_sessions_rows() {
        let account = Address([7u8; 20]);
        let mut ledger = FakeLedger::default().with_session(1, 1).with_session(3, 2);
        ledger.registrations.insert(account, vec![1, 3]);
        ledger.voters.insert(
            1,
            vec![VoterRecord {
                id: Uint256::from_u64(1),
                address: account,
                weight: Uint256::from_u64(2),
                voted_candidate_id: Uint256::from_u64(0),
            }],
        );
        ledger.voters.insert(
            3,
            vec![VoterRecord {
                id: Uint256::from_u64(1),
                address: account,
                weight: Uint256::from_u64(5),
                voted_candidate_id: Uint256::from_u64(4),
            }],
        );

        let rows = loader(ledger).my_sessions(&account).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].session_id, SessionId(1));
        assert_eq!(rows[0].weight, 2);
        assert_eq!(rows[0].vote, VoteStatus::None);
        assert_eq!(rows[1].session_id, SessionId(3));
        assert_eq!(rows[1].phase, Phase::Closed);
        assert_eq!(rows[1].vote, VoteStatus::Cast(CandidateId(4)));
    }

    #[tokio::test]
    async fn test_voter_id_lookup() {
        let loader = loader(FakeLedger::default());
        let id = loader.voter_id(&Address([7u8; 20])).await.unwrap();
        assert_eq!(id, Some(VoterId(1)));
    }

    #[tokio::test]
    async fn test_my_sessions_missing_session_fails() {
        let account = Address([9u8; 20]);
        let mut ledger = FakeLedger::default();
        ledger.registrations.insert(account, vec![42]);

        let err = loader(ledger).my_sessions(&account).await.unwrap_err();
        assert!(matches!(
            err,
            DcastError::Projection(ProjectionError::SessionNotFound(SessionId(42)))
        ));
    }
}
