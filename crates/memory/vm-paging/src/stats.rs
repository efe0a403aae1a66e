//! 命中/缺页统计

use serde::Serialize;

use crate::history::{HistoryEntry, StepEvent};

/// 一次运行的汇总统计
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RunStatistics {
    pub total_hits: usize,
    pub total_page_faults: usize,
    pub hit_ratio: f64,
    pub fault_ratio: f64,
}

impl RunStatistics {
    pub fn total(&self) -> usize {
        self.total_hits + self.total_page_faults
    }
}

/// 从步事件序列推导统计，纯函数
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// `hit_ratio = hits / total`，`fault_ratio = 1 - hit_ratio`；空序列两者均为 0
    pub fn aggregate<I>(events: I) -> RunStatistics
    where
        I: IntoIterator<Item = StepEvent>,
    {
        let (hits, faults) = events
            .into_iter()
            .fold((0usize, 0usize), |(hits, faults), event| match event {
                StepEvent::Hit => (hits + 1, faults),
                StepEvent::Fault => (hits, faults + 1),
            });

        let total = hits + faults;
        let (hit_ratio, fault_ratio) = if total == 0 {
            (0.0, 0.0)
        } else {
            let hit_ratio = hits as f64 / total as f64;
            (hit_ratio, 1.0 - hit_ratio)
        };

        RunStatistics {
            total_hits: hits,
            total_page_faults: faults,
            hit_ratio,
            fault_ratio,
        }
    }

    pub fn from_history(history: &[HistoryEntry]) -> RunStatistics {
        Self::aggregate(history.iter().map(|entry| entry.event))
    }
}
