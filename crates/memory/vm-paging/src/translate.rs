//! 地址翻译
//!
//! 先查 TLB，未命中再查页表；页表命中时把映射回填到 TLB。

use rustc_hash::FxHashMap;

use crate::error::{PagingError, PagingResult};
use crate::page_table::{PageTable, PageTableKind, PageTableOps, TableFootprint};
use crate::tlb::{Tlb, TlbStats};
use crate::{FrameIndex, PageId};

/// 一次翻译的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// TLB 命中，未访问页表
    TlbHit(FrameIndex),
    /// TLB 未命中（或未配置 TLB），页表命中
    TableHit(FrameIndex),
    /// 缺页
    Miss,
}

impl Translation {
    pub fn frame(self) -> Option<FrameIndex> {
        match self {
            Translation::TlbHit(frame) | Translation::TableHit(frame) => Some(frame),
            Translation::Miss => None,
        }
    }
}

/// 地址翻译器：页表 + 可选 TLB
///
/// 未给定虚拟地址空间时，单级/多级页表不按最大页号分配，而是按页面在访问序列中
/// 首次出现的顺序编号（槽位），页表大小与不同页面数成正比。TLB 始终以原始页号为键。
#[derive(Debug, Clone)]
pub struct AddressTranslator {
    table: PageTable,
    /// 页号 -> 页表槽位；`None` 时槽位即页号
    slots: Option<FxHashMap<PageId, PageId>>,
    tlb: Option<Tlb>,
    page_size: u64,
}

impl AddressTranslator {
    pub fn new(
        kind: PageTableKind,
        virtual_pages: Option<usize>,
        trace: &[PageId],
        tlb_size: usize,
        page_size: u64,
    ) -> Self {
        let (slots, table_pages) = match (kind, virtual_pages) {
            (_, Some(pages)) => (None, pages),
            (PageTableKind::Inverted, None) => (None, 0),
            (_, None) => {
                let slots = dense_slots(trace);
                let pages = slots.len();
                (Some(slots), pages)
            }
        };

        Self {
            table: PageTable::new(kind, table_pages),
            slots,
            tlb: Tlb::new(tlb_size),
            page_size: page_size.max(1),
        }
    }

    fn slot(&self, page: PageId) -> Option<PageId> {
        match &self.slots {
            Some(slots) => slots.get(&page).copied(),
            None => Some(page),
        }
    }

    /// 翻译虚拟页号
    pub fn translate(&mut self, page: PageId) -> Translation {
        if let Some(frame) = self.tlb.as_mut().and_then(|tlb| tlb.lookup(page)) {
            return Translation::TlbHit(frame);
        }

        match self.slot(page).and_then(|slot| self.table.frame_of(slot)) {
            Some(frame) => {
                if let Some(tlb) = self.tlb.as_mut() {
                    tlb.insert(page, frame);
                }
                Translation::TableHit(frame)
            }
            None => Translation::Miss,
        }
    }

    /// 缺页处理完成后在页表与 TLB 中建立映射
    pub fn install(&mut self, page: PageId, frame: FrameIndex, step: u64) -> PagingResult<()> {
        let slot = self
            .slot(page)
            .ok_or_else(|| PagingError::invariant(format!("page {page} has no page table slot")))?;
        self.table.map(slot, frame, step)?;
        if let Some(tlb) = self.tlb.as_mut() {
            tlb.insert(page, frame);
        }
        Ok(())
    }

    /// 页面被换出：清除页表项并使 TLB 条目失效
    pub fn invalidate(&mut self, page: PageId) {
        if let Some(slot) = self.slot(page) {
            self.table.unmap(slot);
        }
        if let Some(tlb) = self.tlb.as_mut() {
            tlb.invalidate(page);
        }
    }

    /// 记录一次命中
    pub fn touch(&mut self, page: PageId, step: u64) {
        if let Some(slot) = self.slot(page) {
            self.table.touch(slot, step);
        }
    }

    /// 把虚拟地址翻译为物理地址，页面不驻留时返回 `None`
    ///
    /// 不影响 TLB 统计。
    pub fn translate_address(&self, virtual_address: u64) -> Option<u64> {
        let page = virtual_address / self.page_size;
        let offset = virtual_address % self.page_size;
        let frame = self.table.frame_of(self.slot(page)?)?;
        (frame as u64)
            .checked_mul(self.page_size)?
            .checked_add(offset)
    }

    /// 页面起始虚拟地址对应的物理地址
    pub fn physical_address_of(&self, page: PageId) -> Option<u64> {
        self.translate_address(page.checked_mul(self.page_size)?)
    }

    pub fn tlb(&self) -> Option<&Tlb> {
        self.tlb.as_ref()
    }

    pub fn tlb_stats(&self) -> Option<TlbStats> {
        self.tlb.as_ref().map(|tlb| *tlb.stats())
    }

    pub fn footprint(&self) -> TableFootprint {
        self.table.footprint()
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }
}

/// 按首次出现顺序为访问序列中的页面编号
fn dense_slots(trace: &[PageId]) -> FxHashMap<PageId, PageId> {
    let mut slots = FxHashMap::default();
    for &page in trace {
        let next = slots.len() as PageId;
        slots.entry(page).or_insert(next);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_table::INNER_TABLE_ENTRIES;

    #[test]
    fn test_table_hit_fills_tlb() {
        let mut translator = AddressTranslator::new(PageTableKind::Single, Some(16), &[], 2, 1024);
        assert_eq!(translator.translate(3), Translation::Miss);

        translator.install(3, 1, 1).unwrap();
        assert_eq!(translator.translate(3), Translation::TlbHit(1));

        // 挤出 TLB 后再次访问走页表并回填
        translator.install(4, 0, 2).unwrap();
        translator.install(5, 2, 3).unwrap();
        assert_eq!(translator.translate(3), Translation::TableHit(1));
        assert_eq!(translator.translate(3), Translation::TlbHit(1));
    }

    #[test]
    fn test_without_tlb() {
        let mut translator = AddressTranslator::new(PageTableKind::Inverted, Some(16), &[], 0, 1024);
        translator.install(3, 1, 1).unwrap();
        assert_eq!(translator.translate(3), Translation::TableHit(1));
        assert!(translator.tlb_stats().is_none());
    }

    #[test]
    fn test_invalidate_clears_both_levels() {
        let mut translator = AddressTranslator::new(PageTableKind::Multi, Some(16), &[], 4, 1024);
        translator.install(3, 1, 1).unwrap();
        translator.invalidate(3);
        assert_eq!(translator.translate(3), Translation::Miss);
        assert!(translator.tlb().unwrap().is_empty());
    }

    #[test]
    fn test_translate_address() {
        let mut translator = AddressTranslator::new(PageTableKind::Single, Some(8), &[], 0, 1024);
        translator.install(2, 5, 1).unwrap();
        // 虚拟地址 2050 = 页 2 偏移 2
        assert_eq!(translator.translate_address(2050), Some(5 * 1024 + 2));
        assert_eq!(translator.translate_address(1023), None);
    }

    #[test]
    fn test_sparse_pages_use_dense_slots() {
        let huge = 1u64 << 40;
        let trace = [huge, 7, huge];
        for kind in [PageTableKind::Single, PageTableKind::Multi] {
            let mut translator = AddressTranslator::new(kind, None, &trace, 0, 4096);
            // 两个不同页面只占两个槽位，而不是 2^40 个
            assert!(translator.footprint().allocated_entries <= INNER_TABLE_ENTRIES);

            translator.install(huge, 1, 1).unwrap();
            assert_eq!(translator.translate(huge), Translation::TableHit(1));
            assert_eq!(translator.translate(7), Translation::Miss);
            assert_eq!(translator.physical_address_of(huge), Some(4096));
            assert_eq!(translator.physical_address_of(7), None);

            translator.install(7, 0, 2).unwrap();
            assert_eq!(translator.physical_address_of(7), Some(0));
            translator.invalidate(huge);
            assert_eq!(translator.footprint().resident_entries, 1);
            // 访问序列之外的页面没有槽位
            assert!(translator.install(8, 2, 3).is_err());
        }
    }

    #[test]
    fn test_physical_address_of_page() {
        let mut translator = AddressTranslator::new(PageTableKind::Inverted, None, &[], 0, 512);
        translator.install(9, 3, 1).unwrap();
        assert_eq!(translator.physical_address_of(9), Some(3 * 512));
        assert_eq!(translator.page_size(), 512);
    }
}
