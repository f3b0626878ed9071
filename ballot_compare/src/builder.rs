pub use crate::config::*;
use crate::{BallotStore, CandidateId, GroupInternal, Weight};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A builder for assembling the ballot store from normalized rows.
///
/// The builder is the only way to obtain a [`BallotStore`]: it enforces the
/// ballot table contract (dense ranks starting at 1, no duplicate candidate
/// within a ballot, positive and consistent weight per ballot id) and merges
/// identical ballot patterns into weighted groups.
///
/// ```
/// use ballot_compare::Builder;
/// # use ballot_compare::CompareErrors;
///
/// let mut builder = Builder::new();
/// builder.add_ballot(&["Kea".to_string(), "Kakapo".to_string()], 3);
/// builder.add_ballot(&["Kakapo".to_string()], 1);
/// let store = builder.build()?;
/// assert_eq!(store.total_weight(), 4);
/// # Ok::<(), CompareErrors>(())
/// ```
pub struct Builder {
    rows: Vec<RankedRow>,
    declared: Option<Vec<String>>,
    next_synthetic_id: u64,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            rows: Vec::new(),
            declared: None,
            next_synthetic_id: 0,
        }
    }

    /// Pre-registers the candidate universe.
    ///
    /// Candidates declared here are part of the election even if no ballot
    /// ever mentions them; they simply score zero under every method.
    pub fn candidates(mut self, names: &[String]) -> Builder {
        self.declared = Some(names.to_vec());
        self
    }

    /// Adds one row of the long-format ballot table.
    pub fn add_row(&mut self, ballot_id: &str, rank: u32, candidate: &str, weight: u64) {
        self.rows.push(RankedRow {
            ballot_id: ballot_id.to_string(),
            rank,
            candidate: candidate.to_string(),
            weight,
        });
    }

    /// Adds a complete ballot as an ordered preference list, most preferred
    /// first, with the given voter count. Ranks are generated densely.
    pub fn add_ballot(&mut self, choices: &[String], weight: u64) {
        let ballot_id = format!("synthetic-{:08}", self.next_synthetic_id);
        self.next_synthetic_id += 1;
        for (idx, candidate) in choices.iter().enumerate() {
            self.add_row(&ballot_id, (idx + 1) as u32, candidate, weight);
        }
    }

    /// Validates the contract and produces the immutable store.
    pub fn build(self) -> Result<BallotStore, CompareErrors> {
        // Group the rows per ballot id, keeping the rows in input order.
        let mut per_ballot: BTreeMap<String, Vec<RankedRow>> = BTreeMap::new();
        for row in self.rows {
            per_ballot.entry(row.ballot_id.clone()).or_default().push(row);
        }

        let mut patterns: HashMap<Vec<String>, u64> = HashMap::new();
        for (ballot_id, mut rows) in per_ballot {
            let weight = rows[0].weight;
            if weight == 0 {
                return Err(CompareErrors::MalformedBallot {
                    ballot_id,
                    reason: "non-positive weight".to_string(),
                });
            }
            if rows.iter().any(|r| r.weight != weight) {
                return Err(CompareErrors::MalformedBallot {
                    ballot_id,
                    reason: "inconsistent weight across rows".to_string(),
                });
            }
            rows.sort_by_key(|r| r.rank);
            for (idx, row) in rows.iter().enumerate() {
                if row.rank != (idx + 1) as u32 {
                    return Err(CompareErrors::MalformedBallot {
                        ballot_id,
                        reason: format!(
                            "ranks are not dense: expected rank {}, found {}",
                            idx + 1,
                            row.rank
                        ),
                    });
                }
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for row in rows.iter() {
                if !seen.insert(row.candidate.as_str()) {
                    return Err(CompareErrors::MalformedBallot {
                        ballot_id,
                        reason: format!("candidate {} appears twice", row.candidate),
                    });
                }
            }
            let pattern: Vec<String> = rows.into_iter().map(|r| r.candidate).collect();
            *patterns.entry(pattern).or_insert(0) += weight;
        }

        // The candidate universe: everything on any ballot, plus the declared
        // candidates, in lexicographic order. The resulting index order is
        // the deterministic tie-break key used by the rankers.
        let mut universe: BTreeSet<String> = patterns.keys().flatten().cloned().collect();
        if let Some(declared) = self.declared {
            universe.extend(declared);
        }
        if universe.is_empty() {
            return Err(CompareErrors::EmptyCandidateUniverse);
        }
        let candidates: Vec<String> = universe.into_iter().collect();
        let index: HashMap<&str, CandidateId> = candidates
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), CandidateId(idx as u32)))
            .collect();

        let mut groups: Vec<GroupInternal> = patterns
            .into_iter()
            .map(|(pattern, weight)| GroupInternal {
                choices: pattern.iter().map(|name| index[name.as_str()]).collect(),
                weight: Weight(weight),
            })
            .collect();
        // Deterministic group order so that identical inputs produce
        // bit-identical stores.
        groups.sort_by(|a, b| a.choices.cmp(&b.choices));

        Ok(BallotStore { candidates, groups })
    }
}
