//! The GC's public surface: `init`, `put`, `detach`, `get_victim`, `run_gc`.
//!
//! One [`GarbageCollector`] value owns everything the GC core needs —
//! the candidate index, the activity clock, the active policy and its
//! age table, and this instance's own stats. There is no global; a
//! caller constructs one explicitly and keeps the handle.

use crate::block::BlockNo;
use crate::clock::ActivityClock;
use crate::config::Config;
use crate::index::CandidateIndex;
use crate::policy::{self, PolicyKind, VictimPolicy};
use crate::prelude::*;
use crate::request::{AddressTranslator, DestinationAllocator, MappingTable, NandDevice, RequestScheduler};
use crate::stats::GcStats;
use crate::migration;

pub struct GarbageCollector {
    config: Config,
    index: CandidateIndex,
    clock: ActivityClock,
    policy: Box<dyn VictimPolicy>,
    stats: GcStats,
}

impl GarbageCollector {
    /// Zeros the candidate index, the age tables and the activity clock
    /// across all configured dies, and fixes the active policy for this
    /// instance's lifetime.
    pub fn init(config: Config, policy_kind: PolicyKind) -> Self {
        let index = CandidateIndex::new(
            config.user_dies,
            config.user_blocks_per_die,
            config.slices_per_block,
        );
        let policy = policy::build(policy_kind, config.user_dies, config.user_blocks_per_die);
        Self {
            config,
            index,
            clock: ActivityClock::new(),
            policy,
            stats: GcStats::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    fn check_die(&self, die: usize) -> Result<()> {
        if die >= self.config.user_dies {
            return Err(Error::with_msg(InvalidDie, "die index out of range"));
        }
        Ok(())
    }

    fn check_block(&self, block: BlockNo) -> Result<()> {
        if block as usize >= self.config.user_blocks_per_die {
            return Err(Error::with_msg(InvalidBlock, "block index out of range"));
        }
        Ok(())
    }

    /// Inserts `block` at the tail of bucket `count` on `die`. Advances
    /// the activity clock, and stamps the active policy's age table,
    /// only when `count > 0`.
    pub fn put(&mut self, die: usize, block: BlockNo, count: u32) -> Result<()> {
        self.check_die(die)?;
        self.check_block(block)?;
        self.index.put(die, block, count);
        if count > 0 {
            let tick = self.clock.advance();
            self.policy.on_put(die, block, tick);
        }
        Ok(())
    }

    /// Unlinks `block` from its current bucket without otherwise touching it.
    pub fn detach(&mut self, die: usize, block: BlockNo) -> Result<()> {
        self.check_die(die)?;
        self.check_block(block)?;
        self.index.detach(die, block);
        Ok(())
    }

    /// Runs the active policy's selection over `die`. Fatal if no
    /// candidate exists in any bucket `1..=slices_per_block`.
    pub fn get_victim(&mut self, die: usize) -> Result<BlockNo> {
        self.check_die(die)?;
        match self.policy.select(&mut self.index, die, &self.clock) {
            Some(victim) => Ok(victim),
            None => {
                log::error!("gc: die {die} has no reclaimable block in any bucket");
                Err(Error::new(Errno::NoVictimAvailable))
            }
        }
    }

    /// Selects a victim on `die`, migrates its live pages through the
    /// supplied collaborators, erases it, and resets its age baseline.
    /// Returns the erased block number.
    pub fn run_gc(
        &mut self,
        die: usize,
        translator: &dyn AddressTranslator,
        mapping: &mut dyn MappingTable,
        scheduler: &mut dyn RequestScheduler,
        destination: &mut dyn DestinationAllocator,
        nand: &mut dyn NandDevice,
    ) -> Result<BlockNo> {
        let victim = self.get_victim(die)?;
        let invalid_slice_count = self.index.block(die, victim).invalid_slice_count;

        migration::run_gc(
            die,
            victim,
            invalid_slice_count,
            self.config.slices_per_block,
            translator,
            mapping,
            scheduler,
            destination,
            nand,
            &self.stats,
        );

        self.index.record_erase(die, victim);
        self.policy.on_erase(die, victim, self.clock.now());
        Ok(victim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{init_logger, MockDestinationAllocator, MockMapping, MockNand, MockScheduler, MockTranslator};

    fn config(user_dies: usize, user_blocks_per_die: usize, slices_per_block: usize) -> Config {
        Config {
            user_dies,
            user_blocks_per_die,
            slices_per_block,
        }
    }

    struct Harness {
        translator: MockTranslator,
        mapping: MockMapping,
        scheduler: MockScheduler,
        destination: MockDestinationAllocator,
        nand: MockNand,
    }

    impl Harness {
        fn new(user_dies: usize, user_blocks_per_die: usize, slices_per_block: usize) -> Self {
            let stride = (user_blocks_per_die + 1) * slices_per_block;
            Self {
                translator: MockTranslator::new(slices_per_block, user_blocks_per_die),
                mapping: MockMapping::new(user_dies * stride, 64),
                scheduler: MockScheduler::new(),
                destination: MockDestinationAllocator::new(slices_per_block, user_blocks_per_die),
                nand: MockNand::new(),
            }
        }
    }

    #[test]
    fn all_invalid_victim_skips_copy_loop_and_erases() {
        init_logger();
        let mut gc = GarbageCollector::init(config(1, 4, 4), PolicyKind::Greedy);
        gc.put(0, 0, 4).unwrap();

        let mut h = Harness::new(1, 4, 4);
        let erased = gc
            .run_gc(0, &h.translator, &mut h.mapping, &mut h.scheduler, &mut h.destination, &mut h.nand)
            .unwrap();
        assert_eq!(erased, 0);
        assert_eq!(gc.stats().blocks_erased(), 1);
        assert_eq!(gc.stats().slices_migrated(), 0);
        assert_eq!(h.scheduler.submitted.len(), 0);
    }

    #[test]
    fn mixed_victim_migrates_one_live_page() {
        init_logger();
        let mut gc = GarbageCollector::init(config(1, 4, 4), PolicyKind::Greedy);
        let mut h = Harness::new(1, 4, 4);
        // block 0, page 3 (virtual slice 3) still maps to logical slice 7
        let v = h.translator.virtual_slice_of(0, 0, 3);
        h.mapping.map(v, 7);
        gc.put(0, 0, 3).unwrap();

        let erased = gc
            .run_gc(0, &h.translator, &mut h.mapping, &mut h.scheduler, &mut h.destination, &mut h.nand)
            .unwrap();
        assert_eq!(erased, 0);
        assert_eq!(gc.stats().slices_migrated(), 1);
        assert_eq!(h.scheduler.submitted.len(), 2);
        let new_v = h.mapping.log_to_virt(7).unwrap();
        assert_ne!(new_v, v);
        assert_eq!(h.mapping.virt_to_log(new_v), Some(7));
    }

    #[test]
    fn greedy_vs_cost_benefit_divergence() {
        let cfg = config(1, 4, 4);
        let mut greedy = GarbageCollector::init(cfg, PolicyKind::Greedy);
        greedy.put(0, 0, 4).unwrap(); // block A: all invalid
        greedy.put(0, 1, 3).unwrap(); // block B: 3 invalid
        assert_eq!(greedy.get_victim(0).unwrap(), 0, "greedy always takes the fuller bucket");

        // Same shape under Cost-Benefit, but block B has been sitting dirty far
        // longer than block A (which was just freshly erased): B should win
        // despite holding fewer invalid slices. Same shape as the worked
        // example in crate::scoring (I=4,age=0 vs I=3,age=100), though the
        // exact scores differ here since the clock keeps ticking while this
        // scenario is set up.
        let mut cb = GarbageCollector::init(cfg, PolicyKind::CostBenefit);
        let mut h = Harness::new(1, 4, 4);

        // age the clock by 100 ticks via a throwaway block, leaving block 1 untouched
        for _ in 0..100 {
            cb.detach(0, 2).unwrap();
            cb.put(0, 2, 1).unwrap();
        }
        // consume the throwaway block so it isn't still sitting in bucket 1
        // alongside block 0 below (it would tie on score and, being the
        // existing head, win the strict-`>` tie-break instead of block 0).
        cb.detach(0, 2).unwrap();

        // block 0 is freshly erased right now: its age baseline resets to "now"
        cb.put(0, 0, 1).unwrap();
        cb.run_gc(0, &h.translator, &mut h.mapping, &mut h.scheduler, &mut h.destination, &mut h.nand)
            .unwrap();

        cb.put(0, 0, 4).unwrap(); // block A: fresh, all invalid
        cb.put(0, 1, 3).unwrap(); // block B: dirty since tick 0, 3 invalid

        assert_eq!(cb.get_victim(0).unwrap(), 1, "cost-benefit favors the long-dirty block");
    }

    #[test]
    fn bucket_migration_via_detach_then_put() {
        let mut gc = GarbageCollector::init(config(1, 4, 4), PolicyKind::Greedy);
        gc.put(0, 0, 1).unwrap();
        gc.detach(0, 0).unwrap();
        gc.put(0, 0, 2).unwrap();
        gc.detach(0, 0).unwrap();
        gc.put(0, 0, 3).unwrap();
        assert_eq!(gc.get_victim(0).unwrap(), 0);
    }

    #[test]
    fn cat_prefers_cold_block_end_to_end() {
        let mut gc = GarbageCollector::init(config(1, 4, 4), PolicyKind::Cat);
        gc.put(0, 0, 3).unwrap();
        gc.put(0, 1, 3).unwrap();
        gc.detach(0, 0).unwrap();
        gc.detach(0, 1).unwrap();

        let mut h = Harness::new(1, 4, 4);
        // wear block 0 down with repeated erases so CAT penalizes it despite
        // otherwise-identical (I, V) with block 1
        for _ in 0..1000 {
            gc.put(0, 0, 1).unwrap();
            gc.run_gc(0, &h.translator, &mut h.mapping, &mut h.scheduler, &mut h.destination, &mut h.nand)
                .unwrap();
        }

        gc.put(0, 0, 3).unwrap();
        gc.put(0, 1, 3).unwrap();
        assert_eq!(gc.get_victim(0).unwrap(), 1, "cat avoids the heavily-worn block");
    }

    #[test]
    fn no_victim_is_fatal() {
        let mut gc = GarbageCollector::init(config(1, 4, 4), PolicyKind::Greedy);
        let err = gc.get_victim(0).unwrap_err();
        assert_eq!(err.errno(), Errno::NoVictimAvailable);
    }
}
