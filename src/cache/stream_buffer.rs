// cache/stream_buffer.rs
//
// Sequential-stream prefetcher: a small pool of stream buffers, each a
// queue of block numbers expected next. A hit at buffer position `p`
// consumes blocks `0..=p` and appends that many new blocks at the tail
// (`PREF_M` deep overall); a miss with no hit allocates the LRU buffer
// fresh with the next `PREF_M` blocks after the missed one.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct StreamBuffer {
    blocks: VecDeque<u32>,
    valid: bool,
    depth: usize,
}

impl StreamBuffer {
    pub fn new(depth: usize) -> Self {
        Self { blocks: VecDeque::new(), valid: false, depth }
    }

    pub fn find(&self, block_num: u32) -> Option<usize> {
        if !self.valid {
            return None;
        }
        self.blocks.iter().position(|&b| b == block_num)
    }

    /// Discards contents and refills with `miss_block+1 ..= miss_block+depth`.
    /// Returns the newly prefetched blocks.
    pub fn allocate(&mut self, miss_block: u32) -> Vec<u32> {
        self.blocks.clear();
        let mut fresh = Vec::with_capacity(self.depth);
        for i in 1..=self.depth as u32 {
            let b = miss_block + i;
            self.blocks.push_back(b);
            fresh.push(b);
        }
        self.valid = true;
        fresh
    }

    /// Consumes up through the block that hit and appends that many new
    /// blocks at the tail. Returns the newly appended blocks.
    pub fn advance(&mut self, hit_block: u32) -> Vec<u32> {
        let pos = self.find(hit_block).unwrap_or(0);
        let consumed = pos + 1;
        for _ in 0..consumed {
            self.blocks.pop_front();
        }
        let mut next = self.blocks.back().copied().map_or(hit_block + 1, |b| b + 1);
        let mut appended = Vec::with_capacity(consumed);
        for _ in 0..consumed {
            self.blocks.push_back(next);
            appended.push(next);
            next += 1;
        }
        appended
    }

    pub fn dump(&self) -> Option<Vec<u32>> {
        if self.valid && !self.blocks.is_empty() {
            Some(self.blocks.iter().copied().collect())
        } else {
            None
        }
    }
}

/// The pool of `PREF_N` buffers for one cache level, kept MRU-first so the
/// "allocate into the LRU buffer" rule is a plain pop/push at the ends.
#[derive(Debug, Clone, Default)]
pub struct StreamBufferPool {
    buffers: Vec<StreamBuffer>,
}

impl StreamBufferPool {
    pub fn new(n: usize, depth: usize) -> Self {
        Self { buffers: (0..n).map(|_| StreamBuffer::new(depth)).collect() }
    }

    pub fn enabled(&self) -> bool {
        !self.buffers.is_empty()
    }

    pub fn find_hit(&self, block_num: u32) -> Option<usize> {
        self.buffers.iter().position(|b| b.find(block_num).is_some())
    }

    fn move_to_front(&mut self, idx: usize) {
        let b = self.buffers.remove(idx);
        self.buffers.insert(0, b);
    }

    pub fn advance(&mut self, block_num: u32) -> Vec<u32> {
        let idx = self.find_hit(block_num).expect("advance requires a prior hit");
        let appended = self.buffers[idx].advance(block_num);
        self.move_to_front(idx);
        appended
    }

    pub fn allocate(&mut self, miss_block: u32) -> Vec<u32> {
        let lru = self.buffers.len() - 1;
        let fresh = self.buffers[lru].allocate(miss_block);
        self.move_to_front(lru);
        fresh
    }

    /// MRU-first, skipping never-allocated buffers, for report rendering.
    pub fn dump(&self) -> Vec<Vec<u32>> {
        self.buffers.iter().filter_map(|b| b.dump()).collect()
    }
}
