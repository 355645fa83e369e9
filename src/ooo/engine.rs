// ooo/engine.rs
//
// The per-cycle OoO pipeline state machine. Stages are processed strictly
// back-to-front (Retire first, Fetch last) so a wake-up broadcast in
// Execute becomes visible to earlier stages only within the same cycle's
// remaining stages, never retroactively. See spec §4.1/§5 and DESIGN.md
// for the two preserved Open Questions (wake-up scope, rename-table
// invalidation).

use std::collections::VecDeque;

use log::{debug, trace};

use crate::ooo::instruction::{exec_latency, Instruction, NUM_LOGICAL_REGS};
use crate::ooo::rob::Rob;
use crate::trace::OooTraceReader;

pub struct EngineConfig {
    pub rob_size: usize,
    pub iq_size: usize,
    pub width: usize,
}

pub struct Engine {
    cfg: EngineConfig,
    trace: OooTraceReader,
    trace_done: bool,

    insts: Vec<Instruction>,
    rename_table: Vec<Option<usize>>,
    rob: Rob,

    de: VecDeque<usize>,
    rn: VecDeque<usize>,
    rr: VecDeque<usize>,
    di: VecDeque<usize>,
    iq: Vec<usize>,
    ex: Vec<usize>,
    wb: Vec<usize>,

    completed: Vec<usize>,
    cycle: i64,
}

impl Engine {
    pub fn new(cfg: EngineConfig, trace: OooTraceReader) -> Self {
        let rob = Rob::new(cfg.rob_size);
        Self {
            cfg,
            trace,
            trace_done: false,
            insts: Vec::new(),
            rename_table: vec![None; NUM_LOGICAL_REGS],
            rob,
            de: VecDeque::new(),
            rn: VecDeque::new(),
            rr: VecDeque::new(),
            di: VecDeque::new(),
            iq: Vec::new(),
            ex: Vec::new(),
            wb: Vec::new(),
            completed: Vec::new(),
            cycle: 0,
        }
    }

    /// Runs until the trace is exhausted and every stage queue and the ROB
    /// are empty, then returns the retired instructions in retire order.
    pub fn run(mut self) -> (Vec<Instruction>, i64) {
        loop {
            self.retire();
            self.writeback();
            self.execute();
            self.issue();
            self.dispatch();
            self.reg_read();
            self.rename();
            self.decode();
            self.fetch();

            self.cycle += 1;
            if self.terminated() {
                break;
            }
        }
        let cycles = self.cycle;
        let completed = self
            .completed
            .into_iter()
            .map(|idx| self.insts[idx].clone())
            .collect();
        (completed, cycles)
    }

    fn terminated(&self) -> bool {
        self.trace_done
            && self.de.is_empty()
            && self.rn.is_empty()
            && self.rr.is_empty()
            && self.di.is_empty()
            && self.iq.is_empty()
            && self.ex.is_empty()
            && self.wb.is_empty()
            && self.rob.count == 0
    }

    fn fetch(&mut self) {
        if self.trace_done || !self.de.is_empty() {
            return;
        }
        for _ in 0..self.cfg.width {
            let Some(rec) = self.trace.next() else {
                self.trace_done = true;
                break;
            };
            let seq_num = self.insts.len() as u64;
            let mut inst = Instruction::new(seq_num, rec);
            inst.fe.set(self.cycle, 1);
            let (fe_begin, fe_duration) = inst.fe.as_pair();
            inst.de.begin = Some(fe_begin + fe_duration);

            self.insts.push(inst);
            self.de.push_back(self.insts.len() - 1);
        }
        trace!("cycle {}: fetched {} instruction(s)", self.cycle, self.de.len());
    }

    fn decode(&mut self) {
        if self.de.is_empty() || !self.rn.is_empty() {
            return;
        }
        for idx in self.de.drain(..) {
            let inst = &mut self.insts[idx];
            let de_begin = inst.de.begin.expect("de_begin set at fetch");
            let de_duration = (self.cycle - de_begin) + 1;
            inst.de.duration = Some(de_duration);
            inst.rn.begin = Some(de_begin + de_duration);
            self.rn.push_back(idx);
        }
    }

    fn rename(&mut self) {
        if self.rn.is_empty() || !self.rr.is_empty() {
            return;
        }
        if !self.rob.has_room_for(self.rn.len()) {
            return;
        }
        for idx in self.rn.drain(..) {
            let rn_begin = self.insts[idx].rn.begin.expect("rn_begin set at decode");
            let rn_duration = (self.cycle - rn_begin) + 1;
            self.insts[idx].rn.duration = Some(rn_duration);

            let dest = self.insts[idx].dest;
            let tag = self.rob.allocate(dest, idx);
            self.insts[idx].dest_tag = Some(tag);

            let src1 = self.insts[idx].src1;
            let (src1_tag, src1_ready) = self.resolve_source(src1);
            self.insts[idx].src1_tag = src1_tag;
            self.insts[idx].src1_ready = src1_ready;

            let src2 = self.insts[idx].src2;
            let (src2_tag, src2_ready) = self.resolve_source(src2);
            self.insts[idx].src2_tag = src2_tag;
            self.insts[idx].src2_ready = src2_ready;

            if let Some(d) = dest {
                self.rename_table[d as usize] = Some(tag);
            }

            self.insts[idx].rr.begin = Some(rn_begin + rn_duration);
            self.rr.push_back(idx);
        }
    }

    fn resolve_source(&self, reg: Option<u8>) -> (Option<usize>, bool) {
        match reg {
            None => (None, true),
            Some(r) => match self.rename_table[r as usize] {
                None => (None, true),
                Some(tag) => (Some(tag), self.rob.is_ready(tag)),
            },
        }
    }

    fn reg_read(&mut self) {
        if self.rr.is_empty() || !self.di.is_empty() {
            return;
        }
        for idx in self.rr.drain(..) {
            let inst = &mut self.insts[idx];
            let rr_begin = inst.rr.begin.expect("rr_begin set at rename");
            let rr_duration = (self.cycle - rr_begin) + 1;
            inst.rr.duration = Some(rr_duration);
            inst.refresh_readiness(|tag| self.rob.is_ready(tag));
            inst.di.begin = Some(rr_begin + rr_duration);
            self.di.push_back(idx);
        }
    }

    fn dispatch(&mut self) {
        if self.di.is_empty() {
            return;
        }
        let available = self.cfg.iq_size.saturating_sub(self.iq.len());
        if available < self.di.len() {
            return;
        }
        for idx in self.di.drain(..) {
            let inst = &mut self.insts[idx];
            let di_begin = inst.di.begin.expect("di_begin set at reg_read");
            let di_duration = (self.cycle - di_begin) + 1;
            inst.di.duration = Some(di_duration);
            inst.refresh_readiness(|tag| self.rob.is_ready(tag));
            inst.is_.begin = Some(di_begin + di_duration);
            self.iq.push(idx);
        }
    }

    fn issue(&mut self) {
        let mut issued = 0;
        while issued < self.cfg.width && !self.iq.is_empty() {
            let mut selected: Option<(usize, u64)> = None;
            for (pos, &idx) in self.iq.iter().enumerate() {
                let inst = &self.insts[idx];
                let ready1 = inst.src1_ready || inst.src1_tag.is_some_and(|t| self.rob.is_ready(t));
                let ready2 = inst.src2_ready || inst.src2_tag.is_some_and(|t| self.rob.is_ready(t));
                if ready1 && ready2 {
                    let seq = inst.seq_num;
                    if selected.map_or(true, |(_, best_seq)| seq < best_seq) {
                        selected = Some((pos, seq));
                    }
                }
            }
            let Some((pos, _)) = selected else { break };
            let idx = self.iq.remove(pos);

            let inst = &mut self.insts[idx];
            let is_begin = inst.is_.begin.expect("is_begin set at dispatch");
            let is_duration = (self.cycle - is_begin) + 1;
            inst.is_.duration = Some(is_duration);

            let ex_begin = is_begin + is_duration;
            let latency = exec_latency(inst.op_type);
            inst.ex.begin = Some(ex_begin);
            inst.exec_latency = latency;
            inst.exec_timer = latency;

            self.ex.push(idx);
            issued += 1;
        }
    }

    fn execute(&mut self) {
        let mut still_executing = Vec::with_capacity(self.ex.len());
        let mut just_completed = Vec::new();

        for idx in self.ex.drain(..) {
            let inst = &mut self.insts[idx];
            let ex_begin = inst.ex.begin.expect("ex_begin set at issue");
            if ex_begin > self.cycle {
                still_executing.push(idx);
                continue;
            }
            inst.exec_timer -= 1;
            if inst.exec_timer <= 0 {
                inst.ex.duration = Some(inst.exec_latency);
                just_completed.push(idx);
            } else {
                still_executing.push(idx);
            }
        }
        self.ex = still_executing;

        for idx in just_completed {
            let (ex_begin, ex_duration) = self.insts[idx].ex.as_pair();
            self.insts[idx].wb.begin = Some(ex_begin + ex_duration);
            self.wb.push(idx);

            let produced_tag = self.insts[idx].dest_tag;
            self.broadcast_wakeup(produced_tag);
        }
    }

    /// Wakes up waiting sources in RR, DI, and IQ only — never DE/RN. This
    /// scope is intentional (spec §9 Open Question): DE/RN entries haven't
    /// been renamed yet, so they hold no tags to wake.
    fn broadcast_wakeup(&mut self, produced_tag: Option<usize>) {
        let Some(tag) = produced_tag else { return };
        for idx in self.iq.iter().chain(self.di.iter()).chain(self.rr.iter()) {
            let inst = &mut self.insts[*idx];
            if inst.src1_tag == Some(tag) {
                inst.src1_ready = true;
            }
            if inst.src2_tag == Some(tag) {
                inst.src2_ready = true;
            }
        }
    }

    fn writeback(&mut self) {
        if self.wb.is_empty() {
            return;
        }
        for idx in self.wb.drain(..) {
            let inst = &mut self.insts[idx];
            let wb_begin = inst.wb.begin.expect("wb_begin set at execute");
            let wb_duration = (self.cycle - wb_begin) + 1;
            inst.wb.duration = Some(wb_duration);

            let tag = inst.dest_tag.expect("every instruction is renamed");
            self.rob.mark_ready(tag);

            if inst.rt.begin.is_none() {
                inst.rt.begin = Some(wb_begin + wb_duration);
            }
        }
    }

    fn retire(&mut self) {
        let mut retired = 0;
        while retired < self.cfg.width && self.rob.count > 0 {
            let head = self.rob.head;
            if !self.rob.head_slot().valid || !self.rob.head_slot().ready {
                break;
            }
            let idx = self.rob.head_slot().inst_idx.expect("valid slot has an instruction");

            let inst = &mut self.insts[idx];
            let rt_begin = inst.rt.begin.expect("rt_begin set at writeback");
            inst.rt.duration = Some((self.cycle - rt_begin) + 1);

            if let Some(d) = inst.dest {
                if self.rename_table[d as usize] == Some(head) {
                    self.rename_table[d as usize] = None;
                }
            }

            self.rob.free_head();
            self.completed.push(idx);
            retired += 1;
        }
        if retired > 0 {
            debug!("cycle {}: retired {} instruction(s)", self.cycle, retired);
        }
    }
}
