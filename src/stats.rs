//! Per-instance GC counters.
//!
//! Shaped after the atomic-counter stats collectors elsewhere in this
//! crate's lineage, but owned by the [`crate::gc::GarbageCollector`]
//! value rather than exposed as a process-wide global: a GC subsystem
//! handle is always passed explicitly, so its stats travel with it.

use core::sync::atomic::{AtomicU64, Ordering};

pub struct GcStats {
    blocks_erased: AtomicU64,
    slices_migrated: AtomicU64,
    pages_skipped_unmapped: AtomicU64,
    pages_skipped_stale: AtomicU64,
}

impl GcStats {
    pub const fn new() -> Self {
        Self {
            blocks_erased: AtomicU64::new(0),
            slices_migrated: AtomicU64::new(0),
            pages_skipped_unmapped: AtomicU64::new(0),
            pages_skipped_stale: AtomicU64::new(0),
        }
    }

    pub fn record_block_erased(&self) {
        self.blocks_erased.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_slice_migrated(&self) {
        self.slices_migrated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_skipped_unmapped(&self) {
        self.pages_skipped_unmapped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_skipped_stale(&self) {
        self.pages_skipped_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn blocks_erased(&self) -> u64 {
        self.blocks_erased.load(Ordering::Relaxed)
    }

    pub fn slices_migrated(&self) -> u64 {
        self.slices_migrated.load(Ordering::Relaxed)
    }

    pub fn pages_skipped_unmapped(&self) -> u64 {
        self.pages_skipped_unmapped.load(Ordering::Relaxed)
    }

    pub fn pages_skipped_stale(&self) -> u64 {
        self.pages_skipped_stale.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.blocks_erased.store(0, Ordering::Relaxed);
        self.slices_migrated.store(0, Ordering::Relaxed);
        self.pages_skipped_unmapped.store(0, Ordering::Relaxed);
        self.pages_skipped_stale.store(0, Ordering::Relaxed);
    }

    pub fn print(&self) {
        println!("==================== GC Statistics ====================");
        println!("  Blocks erased:          {}", self.blocks_erased());
        println!("  Slices migrated:        {}", self.slices_migrated());
        println!("  Pages skipped (unmapped): {}", self.pages_skipped_unmapped());
        println!("  Pages skipped (stale):    {}", self.pages_skipped_stale());
        println!("=========================================================");
    }
}

impl Default for GcStats {
    fn default() -> Self {
        Self::new()
    }
}
