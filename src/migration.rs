//! The migration engine: for a chosen victim block, relocate every live
//! page elsewhere on the same die, then erase the block.
//!
//! Each live page is one READ (old virtual slice into a temp buffer) then
//! one WRITE (temp buffer into a freshly allocated destination slice),
//! followed immediately by the mapping update — before the next page's
//! READ is submitted. Ordering across pages, and the final erase after
//! every write, is enforced by the scheduler's own dependency tracking,
//! not by waiting in this loop.

use crate::block::BlockNo;
use crate::request::{AddressTranslator, DestinationAllocator, MappingTable, NandDevice, NandRequestDescriptor, RequestScheduler};
use crate::stats::GcStats;

/// Runs one full reclaim of `victim` on `die`.
///
/// `invalid_slice_count` is the victim's invalid-slice count at the
/// moment it was selected, used only to short-circuit the copy loop when
/// every slice is already stale.
#[allow(clippy::too_many_arguments)]
pub fn run_gc(
    die: usize,
    victim: BlockNo,
    invalid_slice_count: u32,
    slices_per_block: usize,
    translator: &dyn AddressTranslator,
    mapping: &mut dyn MappingTable,
    scheduler: &mut dyn RequestScheduler,
    destination: &mut dyn DestinationAllocator,
    nand: &mut dyn NandDevice,
    stats: &GcStats,
) {
    if invalid_slice_count != slices_per_block as u32 {
        for page in 0..slices_per_block {
            let v = translator.virtual_slice_of(die, victim, page);

            let Some(l) = mapping.virt_to_log(v) else {
                log::debug!("gc: die {die} block {victim} page {page}: unmapped virtual slice {v}, skipping");
                stats.record_page_skipped_unmapped();
                continue;
            };
            if mapping.is_live(v) != Some(l) {
                log::debug!("gc: die {die} block {victim} page {page}: stale back-pointer for logical slice {l}, skipping");
                stats.record_page_skipped_stale();
                continue;
            }

            let read_buf = scheduler.alloc_temp_buf(die);
            scheduler.submit(die, NandRequestDescriptor::read(l, v, read_buf));

            let new_v = destination.allocate_destination_for_gc(die, victim);
            let write_buf = scheduler.alloc_temp_buf(die);
            scheduler.submit(die, NandRequestDescriptor::write(l, new_v, write_buf));

            mapping.set_mapping(l, new_v);
            stats.record_slice_migrated();
        }
    }

    nand.erase_block(die, victim);
    stats.record_block_erased();
    log::debug!("gc: die {die} block {victim} erased");
}
