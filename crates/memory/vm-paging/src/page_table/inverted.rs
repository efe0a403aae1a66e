//! 反向页表
//!
//! 只为驻留页面保存页表项，大小与驻留页面数成正比而不是与虚拟地址空间成正比。

use rustc_hash::FxHashMap;

use super::{PageTableEntry, PageTableKind, PageTableOps, TableFootprint};
use crate::error::PagingResult;
use crate::{FrameIndex, PageId};

#[derive(Debug, Clone, Default)]
pub struct InvertedPageTable {
    entries: FxHashMap<PageId, PageTableEntry>,
}

impl InvertedPageTable {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageTableOps for InvertedPageTable {
    fn lookup(&self, page: PageId) -> Option<&PageTableEntry> {
        self.entries.get(&page)
    }

    fn map(&mut self, page: PageId, frame: FrameIndex, step: u64) -> PagingResult<()> {
        self.entries
            .insert(page, PageTableEntry::resident(frame, step));
        Ok(())
    }

    fn unmap(&mut self, page: PageId) -> Option<PageTableEntry> {
        self.entries.remove(&page)
    }

    fn touch(&mut self, page: PageId, step: u64) {
        if let Some(entry) = self.entries.get_mut(&page) {
            entry.last_access = step;
        }
    }

    fn footprint(&self) -> TableFootprint {
        TableFootprint {
            kind: PageTableKind::Inverted,
            levels: 1,
            directory_entries: 0,
            allocated_entries: self.entries.len(),
            resident_entries: self.entries.len(),
        }
    }
}
