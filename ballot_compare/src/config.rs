// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One row of the normalized ballot table, as supplied by the ingestion layer.
///
/// Ranks are expected to be dense per ballot id, starting at 1, with the same
/// weight repeated on every row of a ballot. The builder checks all of this.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedRow {
    pub ballot_id: String,
    pub rank: u32,
    pub candidate: String,
    pub weight: u64,
}

/// A distinct ballot pattern together with the number of voters who submitted
/// that exact pattern.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotGroup {
    /// Candidate names in preference order, most preferred first.
    pub choices: Vec<String>,
    /// Total voter count behind this pattern. Always >= 1.
    pub weight: u64,
}

// ******** Output data structures *********

/// A full ranking under one method: (candidate, place) with place 1 the
/// winner. Ties share a place. Sorted by (place, candidate).
pub type Placement = Vec<(String, u32)>;

/// The head-to-head record for one ordered pair of distinct candidates.
///
/// `n_wins` is the total ballot weight preferring `bird` over `opponent`,
/// either by explicit order or because `opponent` was left off the ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseRecord {
    pub bird: String,
    pub opponent: String,
    pub n_wins: u64,
    pub n_losses: u64,
}

/// One row of the combined result table. A method missing a candidate is
/// represented as `None`, never an error.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MethodRow {
    pub candidate: String,
    pub ir: Option<u32>,
    pub copeland: Option<u32>,
    pub approval: Option<u32>,
    pub plurality: Option<u32>,
}

/// Everything the engine produces for one election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ComparisonResult {
    /// The candidate universe, lexicographically sorted.
    pub candidates: Vec<String>,
    pub ir: Placement,
    pub copeland: Placement,
    pub approval: Placement,
    pub plurality: Placement,
    /// Zero-filled grid over all ordered pairs of distinct candidates.
    pub pairwise: Vec<PairwiseRecord>,
    /// The four placements outer-joined by candidate, sorted by IR place.
    pub table: Vec<MethodRow>,
}

/// Errors that prevent the engine from completing successfully.
///
/// Malformed input is a caller bug, not a transient fault: the engine never
/// retries and never returns a partial ranking.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CompareErrors {
    /// The ballot table violates the input contract (non-dense ranks,
    /// duplicate candidate on one ballot, non-positive or inconsistent
    /// weight).
    MalformedBallot { ballot_id: String, reason: String },
    /// No candidate appears on any ballot.
    EmptyCandidateUniverse,
}

impl Error for CompareErrors {}

impl Display for CompareErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareErrors::MalformedBallot { ballot_id, reason } => {
                write!(f, "malformed ballot {}: {}", ballot_id, reason)
            }
            CompareErrors::EmptyCandidateUniverse => {
                write!(f, "no candidates found in the ballot data")
            }
        }
    }
}
