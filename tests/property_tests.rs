// Property-based tests for the invariants in spec §8, using the same
// proptest harness the teacher crate's test suite relies on
// (tests/property_tests.rs upstream).

use std::io::Write;

use archsim::bp::Predictor;
use archsim::cache::CacheHierarchy;
use archsim::ooo::{Engine, EngineConfig};
use archsim::trace::OooTraceReader;
use proptest::prelude::*;

fn independent_ooo_trace(count: usize) -> String {
    (0..count).map(|i| format!("{:#x} 0 -1 -1 -1\n", i * 4)).collect()
}

fn write_trace(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

proptest! {
    // ROB_SIZE/IQ_SIZE below WIDTH can never admit a full fetch bundle at
    // once (admission is all-or-nothing per spec §4.1), so both are kept
    // at or above WIDTH here to stay in the simulator's intended envelope.
    #[test]
    fn retired_instructions_keep_fetch_order_and_full_stage_timing(
        (width, rob_size, iq_size, count) in (1usize..4).prop_flat_map(|width| {
            (Just(width), width..width + 16, width..width + 16, 1usize..24)
        })
    ) {
        let trace_text = independent_ooo_trace(count);
        let file = write_trace(&trace_text);
        let reader = OooTraceReader::open(file.path()).unwrap();
        let engine = Engine::new(EngineConfig { rob_size, iq_size, width }, reader);
        let (completed, _cycles) = engine.run();

        prop_assert_eq!(completed.len(), count);
        for window in completed.windows(2) {
            prop_assert!(window[0].seq_num < window[1].seq_num);
        }
        for inst in &completed {
            prop_assert!(inst.fe.begin.is_some());
            prop_assert!(inst.de.duration.is_some());
            prop_assert!(inst.rn.duration.is_some());
            prop_assert!(inst.rr.duration.is_some());
            prop_assert!(inst.di.duration.is_some());
            prop_assert!(inst.is_.duration.is_some());
            prop_assert!(inst.wb.duration.is_some());
            prop_assert!(inst.rt.duration.is_some());
            // op_type 0 always executes in exactly one cycle.
            prop_assert_eq!(inst.ex.duration, Some(1));
        }
    }

    #[test]
    fn bimodal_counters_stay_in_two_bit_range(
        outcomes in prop::collection::vec(any::<bool>(), 1..200),
        m2 in 1u32..6,
    ) {
        let mut predictor = Predictor::bimodal(m2);
        for taken in outcomes {
            predictor.observe(0x1000, taken);
        }
        for (_, values) in predictor.dump_tables() {
            for v in values {
                prop_assert!(v <= 3);
            }
        }
    }

    #[test]
    fn hybrid_counters_stay_in_two_bit_range(
        outcomes in prop::collection::vec((any::<u32>(), any::<bool>()), 1..200),
        k in 1u32..4, m1 in 1u32..6, n_raw in 0u32..6, m2 in 1u32..6,
    ) {
        let n = n_raw.min(m1);
        let mut predictor = Predictor::hybrid(k, m1, n, m2);
        for (pc, taken) in outcomes {
            predictor.observe(pc, taken);
        }
        for (_, values) in predictor.dump_tables() {
            for v in values {
                prop_assert!(v <= 3);
            }
        }
    }

    #[test]
    fn cache_demand_counts_partition_into_reads_and_writes(
        ops in prop::collection::vec((any::<bool>(), 0u32..64), 1..100),
    ) {
        let mut hierarchy = CacheHierarchy::new(16, 256, 2, 0, 0, 0, 0);
        for (write, addr) in &ops {
            hierarchy.request(*addr, *write);
        }
        let writes = ops.iter().filter(|(w, _)| *w).count() as u64;
        let reads = ops.len() as u64 - writes;
        prop_assert_eq!(hierarchy.stats.l1_reads, reads);
        prop_assert_eq!(hierarchy.stats.l1_writes, writes);
        prop_assert!(hierarchy.stats.l1_read_misses <= hierarchy.stats.l1_reads);
        prop_assert!(hierarchy.stats.l1_write_misses <= hierarchy.stats.l1_writes);
    }
}
