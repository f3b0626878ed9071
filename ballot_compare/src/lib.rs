//! Comparison engine for ranked-ballot elections.
//!
//! Given one set of weighted ranked ballots, the engine produces a full
//! ranking of the candidates under four methods: instant-runoff (iterative
//! elimination), Copeland (net head-to-head wins), approval (appearance
//! weight) and plurality (first-place weight), plus the raw pairwise
//! win/loss grid, and joins the four rankings into one table per candidate.
//!
//! The whole computation is a deterministic batch transformation over an
//! in-memory snapshot: no I/O, no shared mutable state, every ranker takes
//! the same immutable [`BallotStore`].

mod builder;
mod config;

use log::{debug, info};

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::ops::{Add, AddAssign};

pub use crate::builder::Builder;
pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub(crate) struct CandidateId(pub(crate) u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
pub(crate) struct Weight(pub(crate) u64);

impl Weight {
    const EMPTY: Weight = Weight(0);
}

impl std::iter::Sum for Weight {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Weight(iter.map(|w| w.0).sum())
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Weight) {
        self.0 += rhs.0;
    }
}

impl Add for Weight {
    type Output = Weight;
    fn add(self: Weight, rhs: Weight) -> Weight {
        Weight(self.0 + rhs.0)
    }
}

// Invariant: choices is non-empty, contains no duplicate, and only holds ids
// below the size of the candidate universe.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct GroupInternal {
    pub(crate) choices: Vec<CandidateId>,
    pub(crate) weight: Weight,
}

/// The normalized, immutable ballot dataset all rankers operate on.
///
/// Candidates are interned in lexicographic name order; identical ballot
/// patterns are merged into one weighted group. Constructed through
/// [`Builder`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotStore {
    pub(crate) candidates: Vec<String>,
    pub(crate) groups: Vec<GroupInternal>,
}

impl BallotStore {
    /// The candidate universe, lexicographically sorted.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The distinct ballot patterns with their voter counts.
    pub fn groups(&self) -> Vec<BallotGroup> {
        self.groups
            .iter()
            .map(|g| BallotGroup {
                choices: g.choices.iter().map(|&cid| self.name(cid).to_string()).collect(),
                weight: g.weight.0,
            })
            .collect()
    }

    /// Total voter count across all groups. Conserved by every later
    /// transformation of the dataset.
    pub fn total_weight(&self) -> u64 {
        self.groups.iter().map(|g| g.weight).sum::<Weight>().0
    }

    fn name(&self, cid: CandidateId) -> &str {
        &self.candidates[cid.0 as usize]
    }

    fn all_ids(&self) -> Vec<CandidateId> {
        (0..self.candidates.len() as u32).map(CandidateId).collect()
    }
}

// **** Rankers ****

/// Computes the full instant-runoff elimination order.
///
/// Each round tallies the weighted first choices of every candidate still in
/// the race, eliminates the candidate with the minimum tally and assigns it
/// the lowest unassigned place (the first elimination gets place N, the last
/// survivor place 1). Eliminated candidates are removed from all ballots and
/// the remaining ranks close up; ballots with no remaining choice drop out.
/// A candidate left with no ballots keeps tallying zero and is eliminated in
/// a later round rather than crashing the procedure.
///
/// Minimum-tally ties are broken lexicographically on the candidate name:
/// the smallest name is eliminated first.
pub fn get_places_ir(store: &BallotStore) -> Result<Placement, CompareErrors> {
    let n = store.candidates.len();
    if n == 0 {
        return Err(CompareErrors::EmptyCandidateUniverse);
    }
    info!(
        "get_places_ir: {} candidates, {} ballot groups, total weight {}",
        n,
        store.groups.len(),
        store.total_weight()
    );

    let mut remaining: Vec<CandidateId> = store.all_ids();
    let mut ballots: Vec<(Vec<CandidateId>, Weight)> = store
        .groups
        .iter()
        .map(|g| (g.choices.clone(), g.weight))
        .collect();
    let mut placed: Vec<(CandidateId, u32)> = Vec::new();
    let mut next_place = n as u32;

    while !remaining.is_empty() {
        let mut tally: HashMap<CandidateId, Weight> =
            remaining.iter().map(|&cid| (cid, Weight::EMPTY)).collect();
        for (choices, weight) in ballots.iter() {
            // Every surviving ballot starts with a remaining candidate.
            if let Some(first) = choices.first() {
                if let Some(t) = tally.get_mut(first) {
                    *t += *weight;
                }
            }
        }
        let round = (n + 1 - remaining.len()) as u32;
        debug!("get_places_ir: round {}: tally {:?}", round, tally);

        let loser = remaining
            .iter()
            .copied()
            .min_by_key(|cid| (tally[cid], *cid))
            .unwrap();
        debug!(
            "get_places_ir: round {}: eliminating {} with {:?} at place {}",
            round,
            store.name(loser),
            tally[&loser],
            next_place
        );
        placed.push((loser, next_place));
        next_place -= 1;
        remaining.retain(|&cid| cid != loser);

        // Remove the loser from every ballot and close the gap; ballots left
        // without any choice are exhausted.
        let mut kept: Vec<(Vec<CandidateId>, Weight)> = Vec::new();
        for (mut choices, weight) in ballots {
            choices.retain(|&cid| cid != loser);
            if !choices.is_empty() {
                kept.push((choices, weight));
            }
        }
        ballots = kept;
    }

    Ok(to_placement(store, placed))
}

/// Derives the head-to-head record for every ordered pair of distinct
/// candidates.
///
/// A candidate ranked at some position is preferred over every candidate
/// ranked below it on the same ballot, and over every candidate of the
/// universe absent from that ballot. The output grid is zero-filled: every
/// ordered pair is present even with no evidence either way, and
/// `n_wins(A, B) == n_losses(B, A)` for all pairs.
pub fn pairwise_records(store: &BallotStore) -> Result<Vec<PairwiseRecord>, CompareErrors> {
    let wins = pairwise_wins(store)?;
    let ids = store.all_ids();
    let mut records: Vec<PairwiseRecord> = Vec::new();
    for &bird in ids.iter() {
        for &opponent in ids.iter() {
            if bird == opponent {
                continue;
            }
            records.push(PairwiseRecord {
                bird: store.name(bird).to_string(),
                opponent: store.name(opponent).to_string(),
                n_wins: wins.get(&(bird, opponent)).copied().unwrap_or(Weight::EMPTY).0,
                n_losses: wins.get(&(opponent, bird)).copied().unwrap_or(Weight::EMPTY).0,
            });
        }
    }
    Ok(records)
}

fn pairwise_wins(
    store: &BallotStore,
) -> Result<HashMap<(CandidateId, CandidateId), Weight>, CompareErrors> {
    if store.candidates.is_empty() {
        return Err(CompareErrors::EmptyCandidateUniverse);
    }
    let ids = store.all_ids();
    let mut wins: HashMap<(CandidateId, CandidateId), Weight> = HashMap::new();
    for group in store.groups.iter() {
        let listed: HashSet<CandidateId> = group.choices.iter().copied().collect();
        for (pos, &preferred) in group.choices.iter().enumerate() {
            for &below in group.choices[pos + 1..].iter() {
                *wins.entry((preferred, below)).or_insert(Weight::EMPTY) += group.weight;
            }
            // Absence counts as implicit non-preference: a listed candidate
            // beats every candidate left off this ballot.
            for &absent in ids.iter() {
                if !listed.contains(&absent) {
                    *wins.entry((preferred, absent)).or_insert(Weight::EMPTY) += group.weight;
                }
            }
        }
    }
    Ok(wins)
}

/// Ranks by Copeland score: opponents strictly beaten head-to-head minus
/// opponents strictly beating the candidate. Ties share a place.
pub fn get_places_copeland(store: &BallotStore) -> Result<Placement, CompareErrors> {
    let wins = pairwise_wins(store)?;
    let ids = store.all_ids();
    let scores: Vec<(CandidateId, i64)> = ids
        .iter()
        .map(|&cid| {
            let mut score: i64 = 0;
            for &other in ids.iter() {
                if other == cid {
                    continue;
                }
                let w = wins.get(&(cid, other)).copied().unwrap_or(Weight::EMPTY);
                let l = wins.get(&(other, cid)).copied().unwrap_or(Weight::EMPTY);
                if w > l {
                    score += 1;
                } else if l > w {
                    score -= 1;
                }
            }
            (cid, score)
        })
        .collect();
    debug!("get_places_copeland: scores {:?}", scores);
    Ok(to_placement(store, competition_ranking(scores)))
}

/// Ranks by approval score: the total weight of ballots on which the
/// candidate appears at any rank.
pub fn get_places_approval(store: &BallotStore) -> Result<Placement, CompareErrors> {
    score_ranking(store, |group, scores| {
        for &cid in group.choices.iter() {
            scores[cid.0 as usize] += group.weight;
        }
    })
}

/// Ranks by plurality score: the total weight of ballots on which the
/// candidate is ranked first.
pub fn get_places_plurality(store: &BallotStore) -> Result<Placement, CompareErrors> {
    score_ranking(store, |group, scores| {
        if let Some(&first) = group.choices.first() {
            scores[first.0 as usize] += group.weight;
        }
    })
}

// Shared single-pass scoring for the weight-based static rankers. Candidates
// absent from the aggregate keep a score of zero rather than going missing.
fn score_ranking(
    store: &BallotStore,
    accumulate: impl Fn(&GroupInternal, &mut [Weight]),
) -> Result<Placement, CompareErrors> {
    if store.candidates.is_empty() {
        return Err(CompareErrors::EmptyCandidateUniverse);
    }
    let mut scores: Vec<Weight> = vec![Weight::EMPTY; store.candidates.len()];
    for group in store.groups.iter() {
        accumulate(group, &mut scores);
    }
    let scored: Vec<(CandidateId, Weight)> = scores
        .into_iter()
        .enumerate()
        .map(|(idx, w)| (CandidateId(idx as u32), w))
        .collect();
    Ok(to_placement(store, competition_ranking(scored)))
}

// Standard competition ranking over descending scores: tied candidates share
// a place and the next distinct score jumps by the number of tied candidates.
fn competition_ranking<S: Ord + Copy>(mut scores: Vec<(CandidateId, S)>) -> Vec<(CandidateId, u32)> {
    scores.sort_by_key(|&(cid, score)| (Reverse(score), cid));
    let mut placed: Vec<(CandidateId, u32)> = Vec::new();
    let mut current_place = 1;
    for (idx, &(cid, score)) in scores.iter().enumerate() {
        if idx > 0 && scores[idx - 1].1 != score {
            current_place = (idx + 1) as u32;
        }
        placed.push((cid, current_place));
    }
    placed
}

fn to_placement(store: &BallotStore, placed: Vec<(CandidateId, u32)>) -> Placement {
    let mut placement: Placement = placed
        .into_iter()
        .map(|(cid, place)| (store.name(cid).to_string(), place))
        .collect();
    placement.sort();
    placement.sort_by_key(|(_, place)| *place);
    placement
}

// **** Result combiner ****

/// Runs all four rankers plus the pairwise calculator on the same snapshot
/// and outer-joins the placements into one row per candidate, sorted by IR
/// place. A method missing a candidate leaves a `None` in that column.
pub fn run_method_comparison(store: &BallotStore) -> Result<ComparisonResult, CompareErrors> {
    info!(
        "run_method_comparison: {} candidates, {} ballot groups",
        store.candidates.len(),
        store.groups.len()
    );
    let ir = get_places_ir(store)?;
    let copeland = get_places_copeland(store)?;
    let approval = get_places_approval(store)?;
    let plurality = get_places_plurality(store)?;
    let pairwise = pairwise_records(store)?;

    let by_name = |placement: &Placement| -> HashMap<String, u32> {
        placement.iter().cloned().collect()
    };
    let ir_places = by_name(&ir);
    let copeland_places = by_name(&copeland);
    let approval_places = by_name(&approval);
    let plurality_places = by_name(&plurality);

    // Union of the candidate universes. The methods should all cover the
    // store's universe, but a missing entry becomes None, not an error.
    let mut names: HashSet<String> = store.candidates.iter().cloned().collect();
    for placement in [&ir, &copeland, &approval, &plurality] {
        names.extend(placement.iter().map(|(name, _)| name.clone()));
    }
    let mut table: Vec<MethodRow> = names
        .into_iter()
        .map(|candidate| MethodRow {
            ir: ir_places.get(&candidate).copied(),
            copeland: copeland_places.get(&candidate).copied(),
            approval: approval_places.get(&candidate).copied(),
            plurality: plurality_places.get(&candidate).copied(),
            candidate,
        })
        .collect();
    table.sort_by(|a, b| {
        (a.ir.unwrap_or(u32::MAX), &a.candidate).cmp(&(b.ir.unwrap_or(u32::MAX), &b.candidate))
    });

    Ok(ComparisonResult {
        candidates: store.candidates.clone(),
        ir,
        copeland,
        approval,
        plurality,
        pairwise,
        table,
    })
}
