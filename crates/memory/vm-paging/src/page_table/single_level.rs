//! 单级页表

use super::{PageTableEntry, PageTableKind, PageTableOps, TableFootprint, page_index};
use crate::error::PagingResult;
use crate::{FrameIndex, PageId};

/// 按虚拟页号直接索引的页表，为整个虚拟地址空间预先分配页表项
#[derive(Debug, Clone)]
pub struct SingleLevelPageTable {
    entries: Vec<PageTableEntry>,
    resident: usize,
}

impl SingleLevelPageTable {
    pub fn new(virtual_pages: usize) -> Self {
        Self {
            entries: vec![PageTableEntry::default(); virtual_pages],
            resident: 0,
        }
    }
}

impl PageTableOps for SingleLevelPageTable {
    fn lookup(&self, page: PageId) -> Option<&PageTableEntry> {
        let index = usize::try_from(page).ok()?;
        self.entries.get(index).filter(|entry| entry.present)
    }

    fn map(&mut self, page: PageId, frame: FrameIndex, step: u64) -> PagingResult<()> {
        let index = page_index(page, self.entries.len())?;
        let entry = &mut self.entries[index];
        if !entry.present {
            self.resident += 1;
        }
        *entry = PageTableEntry::resident(frame, step);
        Ok(())
    }

    fn unmap(&mut self, page: PageId) -> Option<PageTableEntry> {
        let index = usize::try_from(page).ok()?;
        let entry = self.entries.get_mut(index).filter(|entry| entry.present)?;
        self.resident -= 1;
        Some(std::mem::take(entry))
    }

    fn touch(&mut self, page: PageId, step: u64) {
        if let Some(entry) = usize::try_from(page)
            .ok()
            .and_then(|index| self.entries.get_mut(index))
        {
            entry.last_access = step;
        }
    }

    fn footprint(&self) -> TableFootprint {
        TableFootprint {
            kind: PageTableKind::Single,
            levels: 1,
            directory_entries: 0,
            allocated_entries: self.entries.len(),
            resident_entries: self.resident,
        }
    }
}
