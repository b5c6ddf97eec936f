//! Pure projection of raw ledger records into a display-ready view model.
//!
//! The contract hands back tuples whose fields are only meaningful for the
//! phase the session has actually reached; [`project`] is the single place
//! that gating happens, so nothing downstream ever shows a voting timestamp
//! for a session still in registration, or a winner badge before close.
//! It is also the numeric conversion boundary: every 256-bit wire value is
//! narrowed here, checked.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use dcast_shared::{
    Address, CandidateId, CandidateRecord, DcastError, NumericError, Phase, SessionId,
    SessionRecord, Uint256, VoterId, VoterRecord,
};

pub const NO_CANDIDATES_NOTICE: &str = "There are no candidates registered.";
pub const NO_VOTERS_NOTICE: &str = "There are no voter accounts registered.";

/// Result standing of a candidate, for display only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    /// The session is not closed yet; results do not exist.
    Undetermined,
    Won,
    Lost,
}

impl Standing {
    /// Badge text as the original UI renders it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Undetermined => "-",
            Self::Won => "Won",
            Self::Lost => "Lose",
        }
    }
}

/// Whether a voter has cast their vote, and for whom. Knowable in every
/// phase once cast; this replaces the contract's zero-id sentinel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "candidateId", rename_all = "lowercase")]
pub enum VoteStatus {
    None,
    Cast(CandidateId),
}

impl VoteStatus {
    pub fn label(&self) -> String {
        match self {
            Self::None => "No Vote".to_string(),
            Self::Cast(id) => format!("Voted: {id}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub id: CandidateId,
    pub name: String,
    pub description: String,
    pub image_ref: String,
    pub vote_count: u64,
    pub standing: Standing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoterRow {
    pub id: VoterId,
    pub address: Address,
    pub weight: u64,
    pub vote: VoteStatus,
}

/// Display-ready aggregate for one voting session. Rebuilt on every query,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionViewModel {
    pub id: SessionId,
    pub name: String,
    pub phase: Phase,
    pub registered_at: DateTime<Utc>,
    /// Present only once the session has reached the voting phase.
    pub voting_at: Option<DateTime<Utc>>,
    /// Present only once the session is closed.
    pub closed_at: Option<DateTime<Utc>>,
    pub candidates: Vec<CandidateRow>,
    pub voters: Vec<VoterRow>,
}

impl SessionViewModel {
    /// Placeholder the page shows instead of an empty candidate table.
    pub fn candidates_notice(&self) -> Option<&'static str> {
        self.candidates.is_empty().then_some(NO_CANDIDATES_NOTICE)
    }

    /// Placeholder the page shows instead of an empty voter table.
    pub fn voters_notice(&self) -> Option<&'static str> {
        self.voters.is_empty().then_some(NO_VOTERS_NOTICE)
    }
}

/// Render a session timestamp the way the original UI does:
/// `MM/DD/YYYY hh:mm AM/PM`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%m/%d/%Y %I:%M %p").to_string()
}

fn timestamp(value: Uint256, field: &'static str) -> Result<DateTime<Utc>, NumericError> {
    let secs = value.to_u64(field)?;
    let secs = i64::try_from(secs).map_err(|_| NumericError::TimestampOutOfRange { field })?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(NumericError::TimestampOutOfRange { field })
}

pub(crate) fn vote_status(voted_candidate_id: Uint256) -> Result<VoteStatus, NumericError> {
    if voted_candidate_id.is_zero() {
        Ok(VoteStatus::None)
    } else {
        Ok(VoteStatus::Cast(CandidateId(
            voted_candidate_id.to_u64("votedCandidateId")?,
        )))
    }
}

/// Build the view model for one session.
///
/// Pure function of its inputs. `winner_ids` is consulted only when the
/// session is closed; for any earlier phase results are reported as
/// [`Standing::Undetermined`] no matter what the set contains.
pub fn project(
    session: &SessionRecord,
    candidates: &[CandidateRecord],
    voters: &[VoterRecord],
    winner_ids: &BTreeSet<u64>,
) -> Result<SessionViewModel, DcastError> {
    let phase = Phase::from_wire(session.phase)?;

    let registered_at = timestamp(session.registered_at, "registrationTimestamp")?;
    let voting_at = (phase >= Phase::Voting)
        .then(|| timestamp(session.voting_at, "votingTimestamp"))
        .transpose()?;
    let closed_at = (phase == Phase::Closed)
        .then(|| timestamp(session.closed_at, "closeTimestamp"))
        .transpose()?;

    let candidates = candidates
        .iter()
        .map(|c| {
            let id = c.id.to_u64("candidateId")?;
            let standing = if phase == Phase::Closed {
                if winner_ids.contains(&id) {
                    Standing::Won
                } else {
                    Standing::Lost
                }
            } else {
                Standing::Undetermined
            };
            Ok(CandidateRow {
                id: CandidateId(id),
                name: c.name.clone(),
                description: c.description.clone(),
                image_ref: c.image_ref.clone(),
                vote_count: c.vote_count.to_u64("voteCount")?,
                standing,
            })
        })
        .collect::<Result<Vec<_>, NumericError>>()?;

    let voters = voters
        .iter()
        .map(|v| {
            Ok(VoterRow {
                id: VoterId(v.id.to_u64("voterId")?),
                address: v.address,
                weight: v.weight.to_u64("weight")?,
                vote: vote_status(v.voted_candidate_id)?,
            })
        })
        .collect::<Result<Vec<_>, NumericError>>()?;

    Ok(SessionViewModel {
        id: SessionId(session.id.to_u64("sessionId")?),
        name: session.name.clone(),
        phase,
        registered_at,
        voting_at,
        closed_at,
        candidates,
        voters,
    })
}
