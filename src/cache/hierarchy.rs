// cache/hierarchy.rs
//
// A one- or two-level write-back/write-allocate cache with LRU replacement
// and optional stream-buffer prefetching. The original chains `Cache`
// objects through `next`/`prev` pointers; here L1 and L2 are plain sibling
// fields of one owning struct, so cross-level calls are ordinary method
// calls rather than pointer chasing (spec §9 Design Notes). Only two
// levels are ever configured, so a `Vec<CacheLevel>` chain would add
// indirection without buying generality.
//
// `demand_access_l1`/`l2_from_upper` handle demand reads, writes, and
// writebacks. `l2_from_prefetch` is a separate method mirroring the
// original's distinct "process_prefetch_from_upper_level" path: a
// prefetch fill never sets the dirty bit and is counted separately
// (`l2_prefetch_misses`, not `l2_readmiss`/`l2_writemiss`).

use serde::Serialize;

use crate::cache::addr;
use crate::cache::block::{Block, Set};
use crate::cache::stream_buffer::StreamBufferPool;

#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub l1_reads: u64,
    pub l1_read_misses: u64,
    pub l1_writes: u64,
    pub l1_write_misses: u64,
    pub l1_writebacks: u64,
    pub l1_prefetches: u64,
    pub l2_reads: u64,
    pub l2_read_misses: u64,
    pub l2_prefetch_reads: u64,
    pub l2_prefetch_read_misses: u64,
    pub l2_writes: u64,
    pub l2_write_misses: u64,
    pub l2_writebacks: u64,
    pub l2_prefetches: u64,
}

impl CacheStats {
    /// `memory_traffic` = blocks transferred from main memory: every L2
    /// miss/writeback/prefetch when L2 exists, every L1 miss/writeback/
    /// prefetch otherwise.
    pub fn memory_traffic(&self, has_l2: bool) -> u64 {
        if has_l2 {
            self.l2_read_misses + self.l2_write_misses + self.l2_writebacks + self.l2_prefetches
        } else {
            self.l1_read_misses + self.l1_write_misses + self.l1_writebacks + self.l1_prefetches
        }
    }
}

struct CacheLevel {
    sets: Vec<Set>,
    block_size: u32,
    num_sets: usize,
    present: bool,
    sb: StreamBufferPool,
}

impl CacheLevel {
    fn new(size: usize, block_size: u32, assoc: usize, num_sb: usize, sb_depth: usize) -> Self {
        if size == 0 {
            return Self { sets: Vec::new(), block_size, num_sets: 0, present: false, sb: StreamBufferPool::default() };
        }
        let num_sets = size / (block_size as usize * assoc);
        Self {
            sets: vec![Set::new(assoc); num_sets],
            block_size,
            num_sets,
            present: true,
            sb: StreamBufferPool::new(num_sb, sb_depth),
        }
    }

    fn set_index(&self, address: u32) -> usize {
        addr::decompose(address, self.block_size, self.num_sets).index
    }

    fn tag_of(&self, address: u32) -> u32 {
        addr::decompose(address, self.block_size, self.num_sets).tag
    }

    fn compose_addr(&self, tag: u32, index: usize) -> u32 {
        addr::compose(tag, index, self.block_size, self.num_sets)
    }
}

pub struct CacheHierarchy {
    l1: CacheLevel,
    l2: Option<CacheLevel>,
    pub stats: CacheStats,
}

impl CacheHierarchy {
    pub fn new(
        block_size: u32,
        l1_size: usize,
        l1_assoc: usize,
        l2_size: usize,
        l2_assoc: usize,
        pref_n: usize,
        pref_m: usize,
    ) -> Self {
        let has_l2 = l2_size > 0;
        let l1 = CacheLevel::new(l1_size, block_size, l1_assoc, if has_l2 { 0 } else { pref_n }, if has_l2 { 0 } else { pref_m });
        let l2 = if has_l2 {
            Some(CacheLevel::new(l2_size, block_size, l2_assoc, pref_n, pref_m))
        } else {
            None
        };
        Self { l1, l2, stats: CacheStats::default() }
    }

    pub fn has_l2(&self) -> bool {
        self.l2.is_some()
    }

    pub fn request(&mut self, address: u32, write: bool) {
        if !self.l1.present {
            return;
        }
        if write {
            self.stats.l1_writes += 1;
        } else {
            self.stats.l1_reads += 1;
        }
        self.demand_access_l1(address, write);
    }

    fn demand_access_l1(&mut self, address: u32, write: bool) {
        let idx = self.l1.set_index(address);
        let tag = self.l1.tag_of(address);

        if let Some(pos) = self.l1.sets[idx].find(tag) {
            self.l1.sets[idx].touch_mru(pos);
            if write {
                self.l1.sets[idx].set_dirty(0, true);
            }
            if self.l1.sb.enabled() {
                let block_num = addr::block_number(address, self.l1.block_size);
                if self.l1.sb.find_hit(block_num).is_some() {
                    let appended = self.l1.sb.advance(block_num);
                    self.count_and_propagate(true, appended);
                }
            }
            return;
        }

        let block_num = addr::block_number(address, self.l1.block_size);
        let sb_hit = self.l1.sb.enabled() && self.l1.sb.find_hit(block_num).is_some();
        if !sb_hit {
            if write {
                self.stats.l1_write_misses += 1;
            } else {
                self.stats.l1_read_misses += 1;
            }
        }

        if self.l1.sets[idx].is_full() {
            if let Some(evicted) = self.l1.sets[idx].evict_lru() {
                if evicted.dirty {
                    self.stats.l1_writebacks += 1;
                    if self.l2.is_some() {
                        self.stats.l2_writes += 1;
                        let wb_addr = self.l1.compose_addr(evicted.tag, idx);
                        self.l2_from_upper(wb_addr, true);
                    }
                }
            }
        }

        if sb_hit {
            let appended = self.l1.sb.advance(block_num);
            self.count_and_propagate(true, appended);
        } else {
            if self.l2.is_some() {
                self.stats.l2_reads += 1;
                let fetch_addr = self.l1.compose_addr(tag, idx);
                self.l2_from_upper(fetch_addr, false);
            }
            if self.l1.sb.enabled() {
                let fresh = self.l1.sb.allocate(block_num);
                self.count_and_propagate(true, fresh);
            }
        }

        self.l1.sets[idx].insert_mru(Block { tag, dirty: write });
    }

    /// Demand read/write/writeback arriving at L2 from L1.
    fn l2_from_upper(&mut self, address: u32, from_writeback: bool) {
        let Some(mut l2) = self.l2.take() else { return };
        let idx = l2.set_index(address);
        let tag = l2.tag_of(address);
        let mut to_propagate: Option<Vec<u32>> = None;

        if let Some(pos) = l2.sets[idx].find(tag) {
            l2.sets[idx].touch_mru(pos);
            if from_writeback {
                l2.sets[idx].set_dirty(0, true);
            }
            if l2.sb.enabled() {
                let block_num = addr::block_number(address, l2.block_size);
                if l2.sb.find_hit(block_num).is_some() {
                    to_propagate = Some(l2.sb.advance(block_num));
                }
            }
        } else {
            let block_num = addr::block_number(address, l2.block_size);
            let sb_hit = l2.sb.enabled() && l2.sb.find_hit(block_num).is_some();
            if !sb_hit {
                if from_writeback {
                    self.stats.l2_write_misses += 1;
                } else {
                    self.stats.l2_read_misses += 1;
                }
            }
            if l2.sets[idx].is_full() {
                if let Some(evicted) = l2.sets[idx].evict_lru() {
                    if evicted.dirty {
                        self.stats.l2_writebacks += 1;
                    }
                }
            }
            if sb_hit {
                to_propagate = Some(l2.sb.advance(block_num));
            } else if l2.sb.enabled() {
                to_propagate = Some(l2.sb.allocate(block_num));
            }
            l2.sets[idx].insert_mru(Block { tag, dirty: from_writeback });
        }

        self.l2 = Some(l2);
        if let Some(appended) = to_propagate {
            self.count_and_propagate(false, appended);
        }
    }

    /// Distinct fill path for a block arriving at L2 purely from an L1
    /// stream buffer's prefetch — never sets the dirty bit, and misses
    /// count as `l2_prefetch_read_misses`, not `l2_read_misses`.
    fn l2_from_prefetch(&mut self, address: u32) {
        let Some(mut l2) = self.l2.take() else { return };
        let idx = l2.set_index(address);
        let tag = l2.tag_of(address);

        if let Some(pos) = l2.sets[idx].find(tag) {
            l2.sets[idx].touch_mru(pos);
        } else {
            self.stats.l2_prefetch_read_misses += 1;
            if l2.sets[idx].is_full() {
                if let Some(evicted) = l2.sets[idx].evict_lru() {
                    if evicted.dirty {
                        self.stats.l2_writebacks += 1;
                    }
                }
            }
            l2.sets[idx].insert_mru(Block { tag, dirty: false });
        }
        self.l2 = Some(l2);
    }

    /// Counts `appended` as prefetches at the owning level; if the owner is
    /// L1 and an L2 exists, each block also becomes an L2 prefetch read.
    /// Under the wiring in `new` this second half is unreachable (L1 only
    /// owns stream buffers when there is no L2) but is kept symmetric with
    /// the level that does own them, matching the original's structure.
    fn count_and_propagate(&mut self, owner_is_l1: bool, appended: Vec<u32>) {
        if appended.is_empty() {
            return;
        }
        if owner_is_l1 {
            self.stats.l1_prefetches += appended.len() as u64;
            if self.l2.is_some() {
                let block_size = self.l1.block_size;
                for block_num in appended {
                    self.stats.l2_prefetch_reads += 1;
                    self.l2_from_prefetch(addr::block_addr(block_num, block_size));
                }
            }
        } else {
            self.stats.l2_prefetches += appended.len() as u64;
        }
    }

    pub fn l1_block_size(&self) -> u32 {
        self.l1.block_size
    }

    pub fn l1_num_sets(&self) -> usize {
        self.l1.num_sets
    }

    pub fn l2_num_sets(&self) -> usize {
        self.l2.as_ref().map_or(0, |l| l.num_sets)
    }

    /// MRU-first `(tag, dirty)` per set, for report rendering.
    pub fn dump_l1(&self) -> Vec<Vec<(u32, bool)>> {
        self.l1.sets.iter().map(|s| s.contents().iter().map(|b| (b.tag, b.dirty)).collect()).collect()
    }

    pub fn dump_l2(&self) -> Option<Vec<Vec<(u32, bool)>>> {
        self.l2.as_ref().map(|l2| l2.sets.iter().map(|s| s.contents().iter().map(|b| (b.tag, b.dirty)).collect()).collect())
    }

    /// MRU-first buffer contents from whichever level owns the stream
    /// buffers (L2 when present, else L1); `None` if prefetching is off.
    pub fn dump_stream_buffers(&self) -> Option<Vec<Vec<u32>>> {
        if let Some(l2) = &self.l2 {
            if l2.sb.enabled() {
                return Some(l2.sb.dump());
            }
            return None;
        }
        if self.l1.sb.enabled() {
            return Some(self.l1.sb.dump());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_write_allocate_and_writeback() {
        // 2 sets, 1-way, block size 16 -> capacity 32 bytes.
        let mut h = CacheHierarchy::new(16, 32, 1, 0, 0, 0, 0);
        h.request(0x00, true); // write miss, allocate dirty
        assert_eq!(h.stats.l1_write_misses, 1);
        h.request(0x20, false); // same set, different tag -> evicts dirty block 0
        assert_eq!(h.stats.l1_writebacks, 1);
        assert_eq!(h.stats.l1_read_misses, 1);
    }

    #[test]
    fn l1_hit_does_not_touch_l2() {
        let mut h = CacheHierarchy::new(16, 32, 1, 128, 2, 0, 0);
        h.request(0x00, false);
        assert_eq!(h.stats.l2_reads, 1);
        h.request(0x00, false); // now an L1 hit
        assert_eq!(h.stats.l2_reads, 1);
    }

    #[test]
    fn stream_buffer_suppresses_l1_misses() {
        let mut h = CacheHierarchy::new(16, 16 * 8, 1, 0, 0, 1, 4);
        h.request(0x00, false); // miss, allocates SB for blocks {1,2,3,4}
        assert_eq!(h.stats.l1_read_misses, 1);
        assert_eq!(h.stats.l1_prefetches, 4);
        h.request(16, false); // block 1: SB hit, not counted as a miss
        assert_eq!(h.stats.l1_read_misses, 1);
    }

    #[test]
    fn l2_prefetch_fill_is_distinct_from_demand_miss() {
        let mut h = CacheHierarchy::new(16, 16, 1, 16 * 8, 1, 1, 4);
        h.request(0x00, false); // L1 miss -> L2 demand miss; L2 allocates SB
        assert_eq!(h.stats.l2_read_misses, 1);
        assert_eq!(h.stats.l2_prefetches, 4);
        assert_eq!(h.stats.l2_prefetch_read_misses, 0);
    }
}
