//! vm-paging 属性测试
//!
//! 使用proptest在随机访问序列上验证模拟器的不变量。

use std::collections::HashSet;

use proptest::prelude::*;
use vm_paging::{
    ComparisonRunner, PageId, PageTableKind, PolicyKind, SimulationConfig, StepEvent, simulate,
};

fn trace_strategy() -> impl Strategy<Value = Vec<PageId>> {
    prop::collection::vec(0..16u64, 1..64)
}

fn policy_strategy() -> impl Strategy<Value = PolicyKind> {
    prop::sample::select(PolicyKind::ALL.to_vec())
}

fn table_strategy() -> impl Strategy<Value = PageTableKind> {
    prop::sample::select(PageTableKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_hits_plus_faults_is_trace_len(
        trace in trace_strategy(),
        frames in 1..8usize,
        policy in policy_strategy(),
    ) {
        let result = simulate(&trace, &SimulationConfig::new(frames, policy)).unwrap();
        prop_assert_eq!(result.total_hits + result.total_page_faults, trace.len());
        prop_assert!((result.hit_ratio + result.fault_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshots_are_consistent(
        trace in trace_strategy(),
        frames in 1..8usize,
        policy in policy_strategy(),
    ) {
        let result = simulate(&trace, &SimulationConfig::new(frames, policy)).unwrap();
        prop_assert_eq!(result.history.len(), trace.len());
        prop_assert_eq!(result.final_memory_state.len(), frames);

        for (entry, &page) in result.history.iter().zip(&trace) {
            prop_assert_eq!(entry.page, page);
            prop_assert_eq!(entry.memory.len(), frames);
            // 当前页面在本步结束时一定驻留，且没有重复页面
            prop_assert!(entry.memory.contains(&Some(page)));
            let resident: Vec<_> = entry.memory.iter().flatten().collect();
            let distinct: HashSet<_> = resident.iter().collect();
            prop_assert_eq!(resident.len(), distinct.len());
            // 淘汰只发生在缺页时
            if entry.action.evicted_page().is_some() {
                prop_assert_eq!(entry.event, StepEvent::Fault);
            }
        }
    }

    #[test]
    fn test_faults_at_least_distinct_pages(
        trace in trace_strategy(),
        frames in 1..8usize,
        policy in policy_strategy(),
    ) {
        let distinct: HashSet<_> = trace.iter().collect();
        let result = simulate(&trace, &SimulationConfig::new(frames, policy)).unwrap();
        prop_assert!(result.total_page_faults >= distinct.len());
        if frames >= distinct.len() {
            prop_assert_eq!(result.total_page_faults, distinct.len());
        }
    }

    #[test]
    fn test_optimal_is_lower_bound(trace in trace_strategy(), frames in 1..8usize) {
        let runner = ComparisonRunner::new(&trace, SimulationConfig::new(frames, PolicyKind::Fifo));
        let results = runner.run_all().unwrap();
        prop_assert_eq!(results.len(), 6);
        let optimal = results
            .iter()
            .find(|r| r.policy == PolicyKind::Optimal)
            .unwrap()
            .total_page_faults;
        for result in &results {
            prop_assert!(optimal <= result.total_page_faults, "{} beat OPTIMAL", result.algorithm);
        }
    }

    #[test]
    fn test_table_and_tlb_are_transparent(
        trace in trace_strategy(),
        frames in 1..8usize,
        policy in policy_strategy(),
        table in table_strategy(),
        tlb_size in 0..6usize,
    ) {
        let baseline = simulate(&trace, &SimulationConfig::new(frames, policy)).unwrap();
        let config = SimulationConfig::new(frames, policy)
            .with_table(table)
            .with_tlb(tlb_size);
        let variant = simulate(&trace, &config).unwrap();

        prop_assert_eq!(&baseline.history, &variant.history);
        prop_assert_eq!(baseline.total_page_faults, variant.total_page_faults);
        prop_assert_eq!(variant.tlb.is_some(), tlb_size > 0);
        if let Some(tlb) = variant.tlb {
            prop_assert_eq!(tlb.tlb_hits + tlb.tlb_misses, trace.len() as u64);
        }
    }

    #[test]
    fn test_single_frame_faults_on_every_change(
        trace in trace_strategy(),
        policy in policy_strategy(),
    ) {
        let expected = 1 + trace.windows(2).filter(|w| w[0] != w[1]).count();
        let result = simulate(&trace, &SimulationConfig::new(1, policy)).unwrap();
        prop_assert_eq!(result.total_page_faults, expected);
    }
}
