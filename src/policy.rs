//! Victim-selection policies.
//!
//! Greedy, Cost-Benefit and CAT share one contract (`on_put` / `on_erase` /
//! `select`) so the migration engine never needs to know which is active.
//! The choice is made once, at construction, and held for the instance's
//! lifetime — no runtime switching mid-run.

use crate::block::BlockNo;
use crate::clock::ActivityClock;
use crate::index::CandidateIndex;
use crate::scoring::{cat_score, cost_benefit_score};

/// Which age table a policy consults, so `GarbageCollector::put` knows
/// whether a qualifying `Put` should stamp the block's age entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeSource {
    /// No per-block age table; score is implicit in the bucket itself.
    None,
    /// Stamped only when the block is erased (Cost-Benefit).
    LastErase,
    /// Stamped on every qualifying `Put` and reset on erase (CAT).
    LastInvalid,
}

pub trait VictimPolicy {
    fn age_source(&self) -> AgeSource;

    /// Called after the activity clock advances for a `Put(die, block, count>0)`.
    fn on_put(&mut self, die: usize, block: BlockNo, tick: u64);

    /// Called once the victim's erase completes, to reset its age baseline.
    fn on_erase(&mut self, die: usize, block: BlockNo, tick: u64);

    /// Picks and detaches a victim from `index`, or returns `None` if the
    /// die has no candidate in any of buckets `1..=slices_per_block`.
    fn select(&mut self, index: &mut CandidateIndex, die: usize, clock: &ActivityClock) -> Option<BlockNo>;
}

fn per_die_table(user_dies: usize, user_blocks_per_die: usize) -> Vec<Vec<u64>> {
    vec![vec![0u64; user_blocks_per_die]; user_dies]
}

/// Build-time choice of which policy a [`crate::gc::GarbageCollector`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Greedy,
    CostBenefit,
    Cat,
}

pub fn build(kind: PolicyKind, user_dies: usize, user_blocks_per_die: usize) -> Box<dyn VictimPolicy> {
    match kind {
        PolicyKind::Greedy => Box::new(GreedyPolicy),
        PolicyKind::CostBenefit => Box::new(CostBenefitPolicy {
            last_erase_tick: per_die_table(user_dies, user_blocks_per_die),
        }),
        PolicyKind::Cat => Box::new(CatPolicy {
            last_invalid_tick: per_die_table(user_dies, user_blocks_per_die),
        }),
    }
}

/// Pops the head of the highest non-empty bucket. O(1), no per-candidate
/// scoring, FIFO within a bucket.
pub struct GreedyPolicy;

impl VictimPolicy for GreedyPolicy {
    fn age_source(&self) -> AgeSource {
        AgeSource::None
    }

    fn on_put(&mut self, _die: usize, _block: BlockNo, _tick: u64) {}

    fn on_erase(&mut self, _die: usize, _block: BlockNo, _tick: u64) {}

    fn select(&mut self, index: &mut CandidateIndex, die: usize, _clock: &ActivityClock) -> Option<BlockNo> {
        let victim = index.pick_highest_non_empty(die)?;
        index.detach(die, victim);
        Some(victim)
    }
}

/// Scores every candidate by reclaim yield, migration cost and time since
/// the block was last freshly erased; detaches the strict maximum.
pub struct CostBenefitPolicy {
    last_erase_tick: Vec<Vec<u64>>,
}

impl VictimPolicy for CostBenefitPolicy {
    fn age_source(&self) -> AgeSource {
        AgeSource::LastErase
    }

    fn on_put(&mut self, _die: usize, _block: BlockNo, _tick: u64) {}

    fn on_erase(&mut self, die: usize, block: BlockNo, tick: u64) {
        self.last_erase_tick[die][block as usize] = tick;
    }

    fn select(&mut self, index: &mut CandidateIndex, die: usize, clock: &ActivityClock) -> Option<BlockNo> {
        let pages_per_block = index.slices_per_block() as u32;
        let mut best_block = None;
        let mut best_score = 0u32;
        index.iterate_candidates_descending(die, |b| {
            let block = index.block(die, b);
            let invalid = block.invalid_slice_count;
            let valid = pages_per_block - invalid;
            let age = clock.age_since(self.last_erase_tick[die][b as usize]);
            let score = cost_benefit_score(invalid, valid, age, pages_per_block);
            if score > best_score {
                best_score = score;
                best_block = Some(b);
            }
        });
        let victim = best_block?;
        index.detach(die, victim);
        Some(victim)
    }
}

/// Like Cost-Benefit, but ages off last-invalidation time and additionally
/// penalizes high erase counts to spread wear.
pub struct CatPolicy {
    last_invalid_tick: Vec<Vec<u64>>,
}

impl VictimPolicy for CatPolicy {
    fn age_source(&self) -> AgeSource {
        AgeSource::LastInvalid
    }

    fn on_put(&mut self, die: usize, block: BlockNo, tick: u64) {
        self.last_invalid_tick[die][block as usize] = tick;
    }

    fn on_erase(&mut self, die: usize, block: BlockNo, tick: u64) {
        self.last_invalid_tick[die][block as usize] = tick;
    }

    fn select(&mut self, index: &mut CandidateIndex, die: usize, clock: &ActivityClock) -> Option<BlockNo> {
        let pages_per_block = index.slices_per_block() as u32;
        let mut best_block = None;
        let mut best_score = 0u32;
        index.iterate_candidates_descending(die, |b| {
            let block = index.block(die, b);
            let invalid = block.invalid_slice_count;
            let valid = pages_per_block - invalid;
            let wear = block.erase_count;
            let age = clock.age_since(self.last_invalid_tick[die][b as usize]);
            let score = cat_score(invalid, valid, age, wear);
            if score > best_score {
                best_score = score;
                best_block = Some(b);
            }
        });
        let victim = best_block?;
        index.detach(die, victim);
        Some(victim)
    }
}
