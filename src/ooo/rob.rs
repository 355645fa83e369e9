// ooo/rob.rs
//
// The reorder buffer: a circular array of `ROB_SIZE` slots. Slots between
// `head` and `tail` (mod size) are exactly the `count` live entries; tags
// handed out at rename are exactly these slot indices.

#[derive(Debug, Clone, Default)]
pub struct RobSlot {
    pub valid: bool,
    pub ready: bool,
    pub dest_reg: Option<u8>,
    pub inst_idx: Option<usize>,
}

pub struct Rob {
    pub slots: Vec<RobSlot>,
    pub head: usize,
    pub tail: usize,
    pub count: usize,
}

impl Rob {
    pub fn new(size: usize) -> Self {
        Self { slots: vec![RobSlot::default(); size], head: 0, tail: 0, count: 0 }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn has_room_for(&self, n: usize) -> bool {
        self.count + n <= self.size()
    }

    pub fn is_ready(&self, tag: usize) -> bool {
        self.slots[tag].ready
    }

    /// Allocates the tail slot to `inst_idx`/`dest_reg` and advances `tail`.
    /// Returns the tag (slot index) assigned.
    pub fn allocate(&mut self, dest_reg: Option<u8>, inst_idx: usize) -> usize {
        let tag = self.tail;
        self.slots[tag] = RobSlot { valid: true, ready: false, dest_reg, inst_idx: Some(inst_idx) };
        self.tail = (self.tail + 1) % self.size();
        self.count += 1;
        tag
    }

    pub fn mark_ready(&mut self, tag: usize) {
        self.slots[tag].ready = true;
    }

    pub fn head_slot(&self) -> &RobSlot {
        &self.slots[self.head]
    }

    /// Frees the head slot and advances `head`. Caller must have checked
    /// `head_slot().valid && head_slot().ready` first.
    pub fn free_head(&mut self) {
        self.slots[self.head] = RobSlot::default();
        self.head = (self.head + 1) % self.size();
        self.count -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_free_wrap_around() {
        let mut rob = Rob::new(2);
        assert!(rob.has_room_for(2));
        let t0 = rob.allocate(Some(3), 0);
        let t1 = rob.allocate(Some(4), 1);
        assert_eq!((t0, t1), (0, 1));
        assert!(!rob.has_room_for(1));
        rob.mark_ready(0);
        assert!(rob.head_slot().ready);
        rob.free_head();
        assert_eq!(rob.head, 1);
        assert_eq!(rob.count, 1);
        let t2 = rob.allocate(Some(5), 2);
        assert_eq!(t2, 0);
    }
}
