// trace.rs
//
// Lazy line-record readers for the three trace formats. Each reader wraps
// `io::Lines` over a buffered file and yields `None` as soon as the file is
// exhausted or a line fails to parse — per spec, a malformed record ends
// the trace silently rather than raising an error.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

/// One fetched record for the OoO-Pipe trace: `<pc_hex> <op_dec> <dest_dec> <src1_dec> <src2_dec>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OooRecord {
    pub pc: u64,
    pub op_type: u8,
    pub dest: i32,
    pub src1: i32,
    pub src2: i32,
}

fn parse_ooo_line(line: &str) -> Option<OooRecord> {
    let mut it = line.split_whitespace();
    let pc = u64::from_str_radix(it.next()?.trim_start_matches("0x"), 16).ok()?;
    let op_type: u8 = it.next()?.parse().ok()?;
    let dest: i32 = it.next()?.parse().ok()?;
    let src1: i32 = it.next()?.parse().ok()?;
    let src2: i32 = it.next()?.parse().ok()?;
    Some(OooRecord { pc, op_type, dest, src1, src2 })
}

pub struct OooTraceReader {
    lines: Lines<BufReader<File>>,
    done: bool,
}

impl OooTraceReader {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self { lines: BufReader::new(file).lines(), done: false })
    }
}

impl Iterator for OooTraceReader {
    type Item = OooRecord;

    fn next(&mut self) -> Option<OooRecord> {
        if self.done {
            return None;
        }
        match self.lines.next() {
            Some(Ok(line)) => match parse_ooo_line(&line) {
                Some(rec) => Some(rec),
                None => {
                    self.done = true;
                    None
                },
            },
            _ => {
                self.done = true;
                None
            },
        }
    }
}

/// One record for the BP trace: `<addr_hex> <t|n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpRecord {
    pub addr: u64,
    pub taken: bool,
}

fn parse_bp_line(line: &str) -> Option<BpRecord> {
    let mut it = line.split_whitespace();
    let addr = u64::from_str_radix(it.next()?.trim_start_matches("0x"), 16).ok()?;
    let outcome = it.next()?;
    let taken = match outcome.chars().next()? {
        't' => true,
        'n' => false,
        _ => return None,
    };
    Some(BpRecord { addr, taken })
}

pub struct BpTraceReader {
    lines: Lines<BufReader<File>>,
}

impl BpTraceReader {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self { lines: BufReader::new(file).lines() })
    }
}

impl Iterator for BpTraceReader {
    type Item = BpRecord;

    fn next(&mut self) -> Option<BpRecord> {
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return parse_bp_line(&line);
                },
                _ => return None,
            }
        }
    }
}

/// One record for the CacheSim trace: `<r|w> <addr_hex>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub write: bool,
    pub addr: u32,
}

fn parse_cache_line(line: &str) -> Option<CacheRecord> {
    let mut it = line.split_whitespace();
    let rw = it.next()?;
    let addr = u32::from_str_radix(it.next()?.trim_start_matches("0x"), 16).ok()?;
    let write = match rw.chars().next()? {
        'r' => false,
        'w' => true,
        _ => return None,
    };
    Some(CacheRecord { write, addr })
}

pub struct CacheTraceReader {
    lines: Lines<BufReader<File>>,
}

impl CacheTraceReader {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self { lines: BufReader::new(file).lines() })
    }
}

impl Iterator for CacheTraceReader {
    type Item = CacheRecord;

    fn next(&mut self) -> Option<CacheRecord> {
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return parse_cache_line(&line);
                },
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn ooo_parses_and_stops_on_malformed() {
        let f = write_temp("0x0 0 -1 -1 -1\n0x4 1 2 0 -1\nbogus line\n0x8 0 -1 -1 -1\n");
        let reader = OooTraceReader::open(f.path()).unwrap();
        let recs: Vec<_> = reader.collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].pc, 0x0);
        assert_eq!(recs[1].op_type, 1);
    }

    #[test]
    fn bp_parses_taken_not_taken() {
        let f = write_temp("0x400 t\n0x400 n\n");
        let reader = BpTraceReader::open(f.path()).unwrap();
        let recs: Vec<_> = reader.collect();
        assert_eq!(recs, vec![
            BpRecord { addr: 0x400, taken: true },
            BpRecord { addr: 0x400, taken: false },
        ]);
    }

    #[test]
    fn cache_parses_read_write() {
        let f = write_temp("r 0x0\nw 0x10\n");
        let reader = CacheTraceReader::open(f.path()).unwrap();
        let recs: Vec<_> = reader.collect();
        assert_eq!(recs, vec![
            CacheRecord { write: false, addr: 0x0 },
            CacheRecord { write: true, addr: 0x10 },
        ]);
    }
}
