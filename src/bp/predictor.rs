// bp/predictor.rs
//
// Bimodal, gshare, and hybrid (tournament) predictors over one shared
// counter/GHR vocabulary. `Predictor::observe` predicts, updates every
// table the algorithm touches, and reports whether the prediction was
// correct — mirroring the single pass `sim_bp.cc` makes per trace line.

use serde::Serialize;

use crate::bp::counter::CounterTable;
use crate::bp::ghr::Ghr;

fn bimodal_index(pc: u32, m2: u32) -> usize {
    ((pc >> 2) & ((1 << m2) - 1)) as usize
}

fn chooser_index(pc: u32, k: u32) -> usize {
    ((pc >> 2) & ((1 << k) - 1)) as usize
}

/// Index into a gshare table of `2^m1` entries, XOR-hashing the top `n`
/// bits of the PC slice against the GHR and leaving the bottom `m1-n`
/// PC bits untouched. `n == 0` degenerates to a pure PC index.
fn gshare_index(pc: u32, m1: u32, n: u32, ghr: u32) -> usize {
    let pc_bits = (pc >> 2) & ((1 << m1) - 1);
    if n == 0 {
        return pc_bits as usize;
    }
    let split = m1 - n;
    let pc_upper = pc_bits >> split;
    let pc_lower = pc_bits & ((1 << split) - 1);
    (((pc_upper ^ ghr) << split) | pc_lower) as usize
}

pub enum Predictor {
    Bimodal {
        m2: u32,
        table: CounterTable,
    },
    Gshare {
        m1: u32,
        n: u32,
        table: CounterTable,
        ghr: Ghr,
    },
    Hybrid {
        k: u32,
        m1: u32,
        n: u32,
        m2: u32,
        chooser: CounterTable,
        gshare: CounterTable,
        bimodal: CounterTable,
        ghr: Ghr,
    },
}

impl Predictor {
    pub fn bimodal(m2: u32) -> Self {
        Self::Bimodal { m2, table: CounterTable::new(m2, 2) }
    }

    pub fn gshare(m1: u32, n: u32) -> Self {
        Self::Gshare { m1, n, table: CounterTable::new(m1, 2), ghr: Ghr::new(n) }
    }

    pub fn hybrid(k: u32, m1: u32, n: u32, m2: u32) -> Self {
        Self::Hybrid {
            k,
            m1,
            n,
            m2,
            chooser: CounterTable::new(k, 1),
            gshare: CounterTable::new(m1, 2),
            bimodal: CounterTable::new(m2, 2),
            ghr: Ghr::new(n),
        }
    }

    /// Predicts the branch at `pc`, updates every table the algorithm
    /// touches for this outcome, and returns whether the prediction
    /// matched `taken`.
    pub fn observe(&mut self, pc: u32, taken: bool) -> bool {
        match self {
            Self::Bimodal { m2, table } => {
                let idx = bimodal_index(pc, *m2);
                let prediction = table.predict(idx);
                table.update(idx, taken);
                prediction == taken
            }
            Self::Gshare { m1, n, table, ghr } => {
                let idx = gshare_index(pc, *m1, *n, ghr.value());
                let prediction = table.predict(idx);
                table.update(idx, taken);
                ghr.update(taken);
                prediction == taken
            }
            Self::Hybrid { k, m1, n, m2, chooser, gshare, bimodal, ghr } => {
                let idx_gshare = gshare_index(pc, *m1, *n, ghr.value());
                let idx_bimodal = bimodal_index(pc, *m2);
                let idx_chooser = chooser_index(pc, *k);

                let gshare_pred = gshare.predict(idx_gshare);
                let bimodal_pred = bimodal.predict(idx_bimodal);
                let use_gshare = chooser.predict(idx_chooser);
                let prediction = if use_gshare { gshare_pred } else { bimodal_pred };

                if use_gshare {
                    gshare.update(idx_gshare, taken);
                } else {
                    bimodal.update(idx_bimodal, taken);
                }
                ghr.update(taken);

                let gshare_correct = gshare_pred == taken;
                let bimodal_correct = bimodal_pred == taken;
                // Reuses the counter's increment/decrement rule: a "taken"
                // update nudges the chooser toward gshare, a "not taken"
                // update nudges it toward bimodal.
                if gshare_correct && !bimodal_correct {
                    chooser.update(idx_chooser, true);
                } else if !gshare_correct && bimodal_correct {
                    chooser.update(idx_chooser, false);
                }

                prediction == taken
            }
        }
    }

    /// Final table contents in the order they're reported, each paired
    /// with its section header.
    pub fn dump_tables(&self) -> Vec<(&'static str, Vec<u8>)> {
        let values = |t: &CounterTable| t.contents().iter().map(|c| c.value()).collect();
        match self {
            Self::Bimodal { table, .. } => vec![("FINAL BIMODAL CONTENTS", values(table))],
            Self::Gshare { table, .. } => vec![("FINAL GSHARE CONTENTS", values(table))],
            Self::Hybrid { chooser, gshare, bimodal, .. } => vec![
                ("FINAL CHOOSER CONTENTS", values(chooser)),
                ("FINAL GSHARE CONTENTS", values(gshare)),
                ("FINAL BIMODAL CONTENTS", values(bimodal)),
            ],
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct BpStats {
    pub predictions: u64,
    pub mispredictions: u64,
}

impl BpStats {
    pub fn record(&mut self, correct: bool) {
        self.predictions += 1;
        if !correct {
            self.mispredictions += 1;
        }
    }

    pub fn misprediction_rate_pct(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            self.mispredictions as f64 / self.predictions as f64 * 100.0
        }
    }
}
