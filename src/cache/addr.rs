// cache/addr.rs
//
// Address decomposition via integer shifts/masks/division — the original's
// stringified-bitset slicing is incidental to its implementation and is
// reimplemented here with plain arithmetic (spec §9 Design Notes).

/// `tag`/`index`/`offset` for one address within a cache whose geometry is
/// `block_size` bytes per block and `num_sets` sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrParts {
    pub tag: u32,
    pub index: usize,
    pub offset: u32,
}

pub fn decompose(addr: u32, block_size: u32, num_sets: usize) -> AddrParts {
    let offset = addr % block_size;
    let index = ((addr / block_size) as usize) % num_sets.max(1);
    let tag = addr / (block_size * num_sets as u32);
    AddrParts { tag, index, offset }
}

/// Reconstructs a byte address from a set's tag and index (offset 0) —
/// used to re-derive the address of a writeback or an L2 fetch.
pub fn compose(tag: u32, index: usize, block_size: u32, num_sets: usize) -> u32 {
    tag * (block_size * num_sets as u32) + (index as u32) * block_size
}

pub fn block_number(addr: u32, block_size: u32) -> u32 {
    addr / block_size
}

pub fn block_addr(block_num: u32, block_size: u32) -> u32 {
    block_num * block_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_decompose_compose() {
        let block_size = 16;
        let num_sets = 4; // 1024 / (16*16) style toy geometry
        for addr in [0u32, 16, 32, 0x100, 0x1234] {
            let parts = decompose(addr, block_size, num_sets);
            let back = compose(parts.tag, parts.index, block_size, num_sets) + parts.offset;
            assert_eq!(back, addr);
        }
    }
}
