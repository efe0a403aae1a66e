//! 两级页表
//!
//! 虚拟页号被拆成 `(外层索引, 内层索引)`；内层表在第一次映射该区域时才分配。

use super::{PageTableEntry, PageTableKind, PageTableOps, TableFootprint, page_index};
use crate::error::PagingResult;
use crate::{FrameIndex, PageId};

/// 每个内层表的页表项数
pub const INNER_TABLE_ENTRIES: usize = 10;

type InnerTable = Box<[PageTableEntry]>;

#[derive(Debug, Clone)]
pub struct MultiLevelPageTable {
    /// 外层目录，`None` 表示对应区域尚未分配内层表
    directory: Vec<Option<InnerTable>>,
    virtual_pages: usize,
    resident: usize,
}

impl MultiLevelPageTable {
    pub fn new(virtual_pages: usize) -> Self {
        Self {
            directory: vec![None; virtual_pages.div_ceil(INNER_TABLE_ENTRIES)],
            virtual_pages,
            resident: 0,
        }
    }

    /// 拆分虚拟页号
    fn split(page: PageId) -> Option<(usize, usize)> {
        let index = usize::try_from(page).ok()?;
        Some((index / INNER_TABLE_ENTRIES, index % INNER_TABLE_ENTRIES))
    }

    fn entry_mut(&mut self, page: PageId) -> Option<&mut PageTableEntry> {
        let (outer, inner) = Self::split(page)?;
        self.directory.get_mut(outer)?.as_mut()?.get_mut(inner)
    }

    /// 已分配的内层表数量
    pub fn allocated_tables(&self) -> usize {
        self.directory.iter().filter(|slot| slot.is_some()).count()
    }
}

impl PageTableOps for MultiLevelPageTable {
    fn lookup(&self, page: PageId) -> Option<&PageTableEntry> {
        let (outer, inner) = Self::split(page)?;
        self.directory
            .get(outer)?
            .as_ref()?
            .get(inner)
            .filter(|entry| entry.present)
    }

    fn map(&mut self, page: PageId, frame: FrameIndex, step: u64) -> PagingResult<()> {
        let index = page_index(page, self.virtual_pages)?;
        let (outer, inner) = (index / INNER_TABLE_ENTRIES, index % INNER_TABLE_ENTRIES);

        let table = self.directory[outer].get_or_insert_with(|| {
            vec![PageTableEntry::default(); INNER_TABLE_ENTRIES].into_boxed_slice()
        });
        let entry = &mut table[inner];
        if !entry.present {
            self.resident += 1;
        }
        *entry = PageTableEntry::resident(frame, step);
        Ok(())
    }

    fn unmap(&mut self, page: PageId) -> Option<PageTableEntry> {
        let entry = self.entry_mut(page).filter(|entry| entry.present)?;
        let old = std::mem::take(entry);
        self.resident -= 1;
        Some(old)
    }

    fn touch(&mut self, page: PageId, step: u64) {
        if let Some(entry) = self.entry_mut(page) {
            entry.last_access = step;
        }
    }

    fn footprint(&self) -> TableFootprint {
        TableFootprint {
            kind: PageTableKind::Multi,
            levels: 2,
            directory_entries: self.directory.len(),
            allocated_entries: self.allocated_tables() * INNER_TABLE_ENTRIES,
            resident_entries: self.resident,
        }
    }
}
