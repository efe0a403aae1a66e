//! 对外结果记录

use serde::Serialize;

use crate::history::HistoryEntry;
use crate::page_table::{PageTableKind, TableFootprint};
use crate::policy::PolicyKind;
use crate::stats::RunStatistics;
use crate::tlb::TlbStats;
use crate::FrameSnapshot;

/// TLB 统计摘要，仅在配置了 TLB 时输出
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TlbSummary {
    pub tlb_hits: u64,
    pub tlb_misses: u64,
    pub tlb_hit_ratio: f64,
}

impl From<TlbStats> for TlbSummary {
    fn from(stats: TlbStats) -> Self {
        Self {
            tlb_hits: stats.hits,
            tlb_misses: stats.misses,
            tlb_hit_ratio: stats.hit_rate(),
        }
    }
}

/// 一次运行的完整结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub algorithm: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging_type: Option<&'static str>,
    pub total_page_faults: usize,
    pub total_hits: usize,
    pub hit_ratio: f64,
    pub fault_ratio: f64,
    /// 页大小（字节）
    pub page_size: u64,
    #[serde(flatten)]
    pub tlb: Option<TlbSummary>,
    /// 最后一步的帧快照，长度等于帧数
    pub final_memory_state: FrameSnapshot,
    /// 每一步的帧快照
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub page_table: Vec<FrameSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
    pub table_footprint: TableFootprint,
    /// 超过历史保留上限时为真，此时不输出 `page_table` 与 `history`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub history_truncated: bool,
    #[serde(skip)]
    pub policy: PolicyKind,
    #[serde(skip)]
    pub table: PageTableKind,
}

impl ResultSet {
    pub fn statistics(&self) -> RunStatistics {
        RunStatistics {
            total_hits: self.total_hits,
            total_page_faults: self.total_page_faults,
            hit_ratio: self.hit_ratio,
            fault_ratio: self.fault_ratio,
        }
    }
}
