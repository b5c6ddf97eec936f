use serde::{Deserialize, Serialize};

use crate::error::NumericError;

/// Identifier of a voting session on the DCast contract (1-based).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// Identifier of a candidate, unique within its session (1-based).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

/// Identifier of a voter, unique within its session (1-based).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct VoterId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Account address = 20 raw bytes, hex-encoded with a 0x prefix for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != 20 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Abbreviated form for badges and logs, e.g. `0x12345678…9abcdef0`.
    pub fn short(&self) -> String {
        let full = self.to_hex();
        format!("{}…{}", &full[..10], &full[full.len() - 8..])
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Big-endian 256-bit unsigned integer, the ledger's wire representation of
/// every numeric field. Conversion to a displayable `u64` is explicit and
/// checked; an out-of-range value is reported, never truncated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Uint256(pub [u8; 32]);

impl Uint256 {
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Checked narrowing. `field` names the wire field for the error report.
    pub fn to_u64(&self, field: &'static str) -> Result<u64, NumericError> {
        if self.0[..24].iter().any(|&b| b != 0) {
            return Err(NumericError::Overflow { field });
        }
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&self.0[24..]);
        Ok(u64::from_be_bytes(tail))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<u64> for Uint256 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

/// Lifecycle phase of a voting session. Strictly forward-moving on the
/// contract; this client only observes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Registration = 0,
    Voting = 1,
    Closed = 2,
}

impl Phase {
    pub fn from_wire(value: u8) -> Result<Self, NumericError> {
        match value {
            0 => Ok(Self::Registration),
            1 => Ok(Self::Voting),
            2 => Ok(Self::Closed),
            other => Err(NumericError::UnknownPhase(other)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Display string used by the original UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Registration => "Registration",
            Self::Voting => "Voting",
            Self::Closed => "Close",
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = NumericError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_wire(value)
    }
}

/// Access level of the current actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Voter,
    Guest,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Voter => "Voter",
            Self::Guest => "Guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a consumer observes while role resolution may still be in flight.
/// `Unresolved` is not a role; route guards defer on it instead of denying.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "state", content = "role")]
pub enum RoleState {
    Unresolved,
    Resolved(Role),
}

impl RoleState {
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(role) => Some(*role),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw ledger records
//
// These mirror the contract's detail tuples field-for-field, before any
// phase gating or numeric narrowing. Timestamps for phases the session has
// not reached are present on the wire but garbage; the projector decides
// what is exposable.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: Uint256,
    pub name: String,
    pub phase: u8,
    /// Unix seconds when the session entered registration.
    pub registered_at: Uint256,
    /// Unix seconds when voting opened. Valid only once phase >= Voting.
    pub voting_at: Uint256,
    /// Unix seconds when the session closed. Valid only once phase == Closed.
    pub closed_at: Uint256,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateRecord {
    pub id: Uint256,
    pub name: String,
    pub description: String,
    pub image_ref: String,
    pub vote_count: Uint256,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterRecord {
    pub id: Uint256,
    pub address: Address,
    pub weight: Uint256,
    /// Wire sentinel: zero means "has not voted" (candidate ids are 1-based
    /// on this contract). Replaced by a tagged optional at projection time.
    pub voted_candidate_id: Uint256,
}
