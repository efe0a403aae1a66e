//! 页表
//!
//! 三种组织方式的命中/缺页结果完全相同，只在查找开销与内存形态上不同：
//!
//! - 单级页表：按虚拟页号直接索引的数组，O(1) 查找，内存与虚拟地址空间成正比
//! - 多级页表：外层目录 + 按需分配的内层表，内存与已使用区域成正比
//! - 反向页表：以虚拟页号为键的哈希表，内存与驻留页面数成正比

mod inverted;
mod multi_level;
mod single_level;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use inverted::InvertedPageTable;
pub use multi_level::{INNER_TABLE_ENTRIES, MultiLevelPageTable};
pub use single_level::SingleLevelPageTable;

use crate::error::{PagingError, PagingResult};
use crate::{FrameIndex, PageId};

/// 页表项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PageTableEntry {
    /// 存在位
    pub present: bool,
    /// 驻留帧
    pub frame: Option<FrameIndex>,
    /// 装入时的步号
    pub loaded_at: u64,
    /// 最近一次访问的步号
    pub last_access: u64,
}

impl PageTableEntry {
    pub fn resident(frame: FrameIndex, step: u64) -> Self {
        Self {
            present: true,
            frame: Some(frame),
            loaded_at: step,
            last_access: step,
        }
    }

    /// 存在时返回驻留帧
    pub fn present_frame(&self) -> Option<FrameIndex> {
        if self.present { self.frame } else { None }
    }
}

/// 页表组织方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageTableKind {
    Single,
    Multi,
    Inverted,
}

impl PageTableKind {
    pub const ALL: [PageTableKind; 3] = [
        PageTableKind::Single,
        PageTableKind::Multi,
        PageTableKind::Inverted,
    ];

    /// 结果中使用的分页类型标签
    pub fn label(self) -> &'static str {
        match self {
            PageTableKind::Single => "SINGLE",
            PageTableKind::Multi => "MULTI",
            PageTableKind::Inverted => "INVERTED",
        }
    }
}

impl fmt::Display for PageTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PageTableKind {
    type Err = PagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(PageTableKind::Single),
            "multi" | "multilevel" | "multi-level" => Ok(PageTableKind::Multi),
            "inverted" => Ok(PageTableKind::Inverted),
            other => Err(PagingError::invalid_input(format!(
                "unknown page table type '{other}', expected one of single, multi, inverted"
            ))),
        }
    }
}

/// 页表内存形态，供展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableFootprint {
    pub kind: PageTableKind,
    /// 一次查找需要访问的层数
    pub levels: u32,
    /// 目录项数（单级与反向页表为 0）
    pub directory_entries: usize,
    /// 已分配的页表项数
    pub allocated_entries: usize,
    /// 存在位为真的页表项数
    pub resident_entries: usize,
}

/// 页表的公共操作
pub trait PageTableOps {
    fn lookup(&self, page: PageId) -> Option<&PageTableEntry>;

    /// 建立 `page -> frame` 映射
    fn map(&mut self, page: PageId, frame: FrameIndex, step: u64) -> PagingResult<()>;

    /// 清除映射，返回原页表项
    fn unmap(&mut self, page: PageId) -> Option<PageTableEntry>;

    /// 记录一次命中
    fn touch(&mut self, page: PageId, step: u64);

    fn footprint(&self) -> TableFootprint;
}

/// 运行期页表实例
#[derive(Debug, Clone)]
pub enum PageTable {
    Single(SingleLevelPageTable),
    Multi(MultiLevelPageTable),
    Inverted(InvertedPageTable),
}

impl PageTable {
    /// 按组织方式创建空页表。`virtual_pages` 为虚拟地址空间的页数。
    pub fn new(kind: PageTableKind, virtual_pages: usize) -> Self {
        match kind {
            PageTableKind::Single => Self::Single(SingleLevelPageTable::new(virtual_pages)),
            PageTableKind::Multi => Self::Multi(MultiLevelPageTable::new(virtual_pages)),
            PageTableKind::Inverted => Self::Inverted(InvertedPageTable::new()),
        }
    }

    pub fn kind(&self) -> PageTableKind {
        match self {
            Self::Single(_) => PageTableKind::Single,
            Self::Multi(_) => PageTableKind::Multi,
            Self::Inverted(_) => PageTableKind::Inverted,
        }
    }

    /// 查找驻留帧
    pub fn frame_of(&self, page: PageId) -> Option<FrameIndex> {
        self.lookup(page).and_then(PageTableEntry::present_frame)
    }

    fn ops(&self) -> &dyn PageTableOps {
        match self {
            Self::Single(t) => t,
            Self::Multi(t) => t,
            Self::Inverted(t) => t,
        }
    }

    fn ops_mut(&mut self) -> &mut dyn PageTableOps {
        match self {
            Self::Single(t) => t,
            Self::Multi(t) => t,
            Self::Inverted(t) => t,
        }
    }
}

impl PageTableOps for PageTable {
    fn lookup(&self, page: PageId) -> Option<&PageTableEntry> {
        self.ops().lookup(page)
    }

    fn map(&mut self, page: PageId, frame: FrameIndex, step: u64) -> PagingResult<()> {
        self.ops_mut().map(page, frame, step)
    }

    fn unmap(&mut self, page: PageId) -> Option<PageTableEntry> {
        self.ops_mut().unmap(page)
    }

    fn touch(&mut self, page: PageId, step: u64) {
        self.ops_mut().touch(page, step);
    }

    fn footprint(&self) -> TableFootprint {
        self.ops().footprint()
    }
}

/// 把页号转换为数组下标，超出 `limit` 时报错
pub(crate) fn page_index(page: PageId, limit: usize) -> PagingResult<usize> {
    usize::try_from(page)
        .ok()
        .filter(|&index| index < limit)
        .ok_or_else(|| {
            PagingError::invariant(format!(
                "page {page} is outside the virtual address space of {limit} pages"
            ))
        })
}
