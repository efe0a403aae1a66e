//! 多策略对比
//!
//! 同一访问序列在多个（策略, 页表）组合下各自独立运行。运行之间不共享任何可变
//! 状态，使用 rayon 并行执行；结果顺序与传入的组合顺序一致。

use log::{debug, warn};
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::driver::SimulationDriver;
use crate::error::{PagingError, PagingResult};
use crate::page_table::PageTableKind;
use crate::policy::PolicyKind;
use crate::result::ResultSet;
use crate::PageId;

/// 对比运行器
#[derive(Debug, Clone)]
pub struct ComparisonRunner<'a> {
    trace: &'a [PageId],
    base: SimulationConfig,
}

impl<'a> ComparisonRunner<'a> {
    /// `base` 中的策略与页表类型会被每个组合覆盖，其余参数共享
    pub fn new(trace: &'a [PageId], base: SimulationConfig) -> Self {
        Self { trace, base }
    }

    /// 按固定顺序 FIFO, LRU, OPTIMAL, LFU, MRU, MFU 运行全部策略
    pub fn run_all(&self) -> PagingResult<Vec<ResultSet>> {
        self.run(&PolicyKind::ALL)
    }

    /// 在基础配置的页表类型下运行指定策略
    pub fn run(&self, policies: &[PolicyKind]) -> PagingResult<Vec<ResultSet>> {
        self.run_matrix(&[self.base.table], policies)
    }

    /// 运行页表类型 × 策略的全部组合，页表类型为外层
    pub fn run_matrix(
        &self,
        tables: &[PageTableKind],
        policies: &[PolicyKind],
    ) -> PagingResult<Vec<ResultSet>> {
        if tables.is_empty() || policies.is_empty() {
            return Err(PagingError::invalid_input(
                "comparison needs at least one policy and one page table type",
            ));
        }

        let configs: Vec<SimulationConfig> = tables
            .iter()
            .flat_map(|&table| {
                policies.iter().map(move |&policy| {
                    self.base.clone().with_table(table).with_policy(policy)
                })
            })
            .collect();

        // 任何一个组合无效都不启动运行
        for config in &configs {
            for warning in config.validate(self.trace)? {
                warn!("{} / {}: {warning}", config.policy, config.table);
            }
        }

        debug!(
            "running {} configurations over {} requests",
            configs.len(),
            self.trace.len()
        );

        configs
            .par_iter()
            .map(|config| SimulationDriver::new(self.trace, config)?.run())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: [PageId; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

    #[test]
    fn test_run_all_order() {
        let runner = ComparisonRunner::new(&TRACE, SimulationConfig::new(3, PolicyKind::Fifo));
        let results = runner.run_all().unwrap();
        let labels: Vec<_> = results.iter().map(|r| r.algorithm).collect();
        assert_eq!(labels, ["FIFO", "LRU", "OPTIMAL", "LFU", "MRU", "MFU"]);
        assert_eq!(results[0].total_page_faults, 9);
        assert_eq!(results[1].total_page_faults, 10);
        assert_eq!(results[2].total_page_faults, 7);
    }

    #[test]
    fn test_matrix_is_table_major() {
        let runner = ComparisonRunner::new(&TRACE, SimulationConfig::new(3, PolicyKind::Fifo));
        let results = runner
            .run_matrix(&PageTableKind::ALL, &[PolicyKind::Fifo, PolicyKind::Lru])
            .unwrap();
        let pairs: Vec<_> = results
            .iter()
            .map(|r| (r.paging_type.unwrap(), r.algorithm))
            .collect();
        assert_eq!(
            pairs,
            [
                ("SINGLE", "FIFO"),
                ("SINGLE", "LRU"),
                ("MULTI", "FIFO"),
                ("MULTI", "LRU"),
                ("INVERTED", "FIFO"),
                ("INVERTED", "LRU"),
            ]
        );
        // 页表组织方式不影响命中/缺页
        for pair in results.chunks(2) {
            assert_eq!(pair[0].total_page_faults, results[0].total_page_faults);
            assert_eq!(pair[1].total_page_faults, results[1].total_page_faults);
        }
    }

    #[test]
    fn test_empty_selection_rejected() {
        let runner = ComparisonRunner::new(&TRACE, SimulationConfig::new(3, PolicyKind::Fifo));
        assert!(matches!(runner.run(&[]), Err(PagingError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_input_fails_before_any_run() {
        let runner = ComparisonRunner::new(&[], SimulationConfig::new(3, PolicyKind::Fifo));
        assert!(matches!(runner.run_all(), Err(PagingError::InvalidInput(_))));
    }
}
