//! In-memory stand-ins for the GC's external collaborators, used only by
//! this crate's own test suite.
//!
//! Virtual addresses are laid out flat per die as `block * slices_per_block
//! + page`, with one extra "spare" block per die (index
//! `user_blocks_per_die`) reserved as the destination space for migrated
//! pages, so a GC destination allocation can never land inside the
//! victim it is reclaiming.

use std::sync::Once;

use crate::block::BlockNo;
use crate::request::{
    AddressTranslator, DestinationAllocator, LogicalSliceAddr, MappingTable, NandDevice,
    NandRequestDescriptor, RequestScheduler, VirtualSliceAddr,
};

static INIT_LOG: Once = Once::new();

pub fn init_logger() {
    INIT_LOG.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

pub struct MockTranslator {
    slices_per_block: usize,
    blocks_per_die_with_spare: usize,
}

impl MockTranslator {
    pub fn new(slices_per_block: usize, user_blocks_per_die: usize) -> Self {
        Self {
            slices_per_block,
            blocks_per_die_with_spare: user_blocks_per_die + 1,
        }
    }
}

impl AddressTranslator for MockTranslator {
    fn virtual_slice_of(&self, die: usize, block: BlockNo, page: usize) -> VirtualSliceAddr {
        let stride = self.blocks_per_die_with_spare * self.slices_per_block;
        (die * stride + block as usize * self.slices_per_block + page) as u32
    }
}

pub struct MockMapping {
    virt_to_log: Vec<Option<LogicalSliceAddr>>,
    log_to_virt: Vec<Option<VirtualSliceAddr>>,
}

impl MockMapping {
    pub fn new(num_virtual_slices: usize, num_logical_slices: usize) -> Self {
        Self {
            virt_to_log: vec![None; num_virtual_slices],
            log_to_virt: vec![None; num_logical_slices],
        }
    }

    /// Test helper: establishes `v -> l -> v` as a live mapping.
    pub fn map(&mut self, v: VirtualSliceAddr, l: LogicalSliceAddr) {
        self.virt_to_log[v as usize] = Some(l);
        self.log_to_virt[l as usize] = Some(v);
    }
}

impl MappingTable for MockMapping {
    fn virt_to_log(&self, v: VirtualSliceAddr) -> Option<LogicalSliceAddr> {
        self.virt_to_log[v as usize]
    }

    fn log_to_virt(&self, l: LogicalSliceAddr) -> Option<VirtualSliceAddr> {
        self.log_to_virt[l as usize]
    }

    fn set_mapping(&mut self, l: LogicalSliceAddr, v: VirtualSliceAddr) {
        self.log_to_virt[l as usize] = Some(v);
        self.virt_to_log[v as usize] = Some(l);
    }
}

pub struct MockScheduler {
    pub submitted: Vec<(usize, NandRequestDescriptor)>,
    next_buf: u32,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self {
            submitted: Vec::new(),
            next_buf: 0,
        }
    }
}

impl Default for MockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScheduler for MockScheduler {
    fn alloc_temp_buf(&mut self, _die: usize) -> u32 {
        self.next_buf += 1;
        self.next_buf
    }

    fn submit(&mut self, die: usize, descriptor: NandRequestDescriptor) {
        self.submitted.push((die, descriptor));
    }
}

pub struct MockDestinationAllocator {
    slices_per_block: usize,
    spare_block: BlockNo,
    next_in_spare: u32,
}

impl MockDestinationAllocator {
    pub fn new(slices_per_block: usize, user_blocks_per_die: usize) -> Self {
        Self {
            slices_per_block,
            spare_block: user_blocks_per_die as BlockNo,
            next_in_spare: 0,
        }
    }
}

impl DestinationAllocator for MockDestinationAllocator {
    fn allocate_destination_for_gc(&mut self, die: usize, _victim: BlockNo) -> VirtualSliceAddr {
        let translator = MockTranslator::new(self.slices_per_block, self.spare_block as usize);
        let page = (self.next_in_spare as usize) % self.slices_per_block;
        self.next_in_spare += 1;
        translator.virtual_slice_of(die, self.spare_block, page)
    }
}

pub struct MockNand {
    pub erased: Vec<(usize, BlockNo)>,
}

impl MockNand {
    pub fn new() -> Self {
        Self { erased: Vec::new() }
    }
}

impl Default for MockNand {
    fn default() -> Self {
        Self::new()
    }
}

impl NandDevice for MockNand {
    fn erase_block(&mut self, die: usize, block: BlockNo) {
        self.erased.push((die, block));
    }
}
