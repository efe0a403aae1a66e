//! 模拟配置
//!
//! [`SimulationConfig`] 是核心唯一接受的规范化配置；外部请求在边界处解析后转换为它。
//! 所有输入校验在任何运行开始前由 [`SimulationConfig::validate`] 一次完成。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PagingError, PagingResult};
use crate::page_table::PageTableKind;
use crate::policy::PolicyKind;
use crate::PageId;

/// 默认页大小：4KB
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// 显式给定虚拟地址空间时，单级/多级页表允许的最大页数
pub const MAX_VIRTUAL_PAGES: usize = 1 << 24;

/// 物理帧数上限
pub const MAX_FRAMES: usize = 1 << 20;

/// 逐步快照允许的帧单元总数（步数 × 帧数），超出时不保留历史
pub const MAX_SNAPSHOT_CELLS: usize = 1 << 22;

/// 一次运行的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 物理帧数
    pub frame_count: usize,
    /// 替换策略
    pub policy: PolicyKind,
    /// 页表组织方式
    pub table: PageTableKind,
    /// TLB 容量，0 表示不使用 TLB
    pub tlb_size: usize,
    /// 虚拟地址空间页数；`None` 时页号不受限，页表按访问序列中出现的页面编号
    pub virtual_pages: Option<usize>,
    /// 页大小（字节）
    pub page_size: u64,
    /// 访问序列超过该长度时不保留逐步历史与快照
    pub history_limit: Option<usize>,
}

impl SimulationConfig {
    pub fn new(frame_count: usize, policy: PolicyKind) -> Self {
        Self {
            frame_count,
            policy,
            table: PageTableKind::Single,
            tlb_size: 0,
            virtual_pages: None,
            page_size: DEFAULT_PAGE_SIZE,
            history_limit: None,
        }
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_table(mut self, table: PageTableKind) -> Self {
        self.table = table;
        self
    }

    pub fn with_tlb(mut self, tlb_size: usize) -> Self {
        self.tlb_size = tlb_size;
        self
    }

    pub fn with_virtual_pages(mut self, virtual_pages: usize) -> Self {
        self.virtual_pages = Some(virtual_pages);
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// 是否保留逐步历史
    pub fn retains_history(&self, trace_len: usize) -> bool {
        self.history_limit.is_none_or(|limit| trace_len <= limit)
            && trace_len.saturating_mul(self.frame_count) <= MAX_SNAPSHOT_CELLS
    }

    /// 校验配置与访问序列，返回非致命警告
    pub fn validate(&self, trace: &[PageId]) -> PagingResult<Vec<ConfigWarning>> {
        if trace.is_empty() {
            return Err(PagingError::invalid_input("request trace must not be empty"));
        }
        if self.frame_count < 1 {
            return Err(PagingError::invalid_input(format!(
                "frame count must be at least 1, got {}",
                self.frame_count
            )));
        }
        if self.frame_count > MAX_FRAMES {
            return Err(PagingError::invalid_input(format!(
                "frame count {} exceeds the maximum of {MAX_FRAMES}",
                self.frame_count
            )));
        }
        if self.page_size < 1 {
            return Err(PagingError::invalid_input("page size must be at least 1"));
        }

        if let Some(virtual_pages) = self.virtual_pages {
            if virtual_pages < 1 {
                return Err(PagingError::invalid_input(
                    "virtual address space must contain at least one page",
                ));
            }
            let bounded = matches!(self.table, PageTableKind::Single | PageTableKind::Multi);
            if bounded && virtual_pages > MAX_VIRTUAL_PAGES {
                return Err(PagingError::invalid_input(format!(
                    "{} page table supports at most {MAX_VIRTUAL_PAGES} virtual pages, got {virtual_pages}",
                    self.table.label().to_ascii_lowercase()
                )));
            }
            if let Some((step, &page)) = trace
                .iter()
                .enumerate()
                .find(|&(_, &page)| usize::try_from(page).map_or(true, |p| p >= virtual_pages))
            {
                return Err(PagingError::invalid_input(format!(
                    "page {page} at position {} is outside the virtual address space of {virtual_pages} pages",
                    step + 1
                )));
            }
        }

        let mut warnings = Vec::new();
        if self.tlb_size > self.frame_count {
            warnings.push(ConfigWarning::TlbLargerThanFrames {
                tlb_size: self.tlb_size,
                frame_count: self.frame_count,
            });
        }
        Ok(warnings)
    }
}

/// 非致命的配置问题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigWarning {
    /// TLB 只能缓存驻留页面，超出帧数的容量不会被使用
    TlbLargerThanFrames { tlb_size: usize, frame_count: usize },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::TlbLargerThanFrames {
                tlb_size,
                frame_count,
            } => write!(
                f,
                "TLB size {tlb_size} exceeds frame count {frame_count}; only {frame_count} entries can ever be used"
            ),
        }
    }
}
