//! 软件 TLB (Translation Lookaside Buffer)
//!
//! 缓存最近的 `页号 -> 帧` 映射，容量固定，按 FIFO 顺序淘汰，与主替换策略无关。

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::{FrameIndex, PageId};

/// TLB 统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TlbStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
    pub invalidations: u64,
}

impl TlbStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// FIFO TLB
#[derive(Debug, Clone)]
pub struct Tlb {
    entries: FxHashMap<PageId, FrameIndex>,
    /// 插入顺序，队首最旧
    fifo: VecDeque<PageId>,
    capacity: usize,
    stats: TlbStats,
}

impl Tlb {
    /// 创建容量为 `capacity` 的 TLB，容量为 0 时返回 `None`
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        Some(Self {
            entries: FxHashMap::default(),
            fifo: VecDeque::new(),
            capacity,
            stats: TlbStats::default(),
        })
    }

    pub fn lookup(&mut self, page: PageId) -> Option<FrameIndex> {
        match self.entries.get(&page) {
            Some(&frame) => {
                self.stats.hits += 1;
                Some(frame)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// 插入映射；已满时淘汰最早插入的条目并返回其页号
    pub fn insert(&mut self, page: PageId, frame: FrameIndex) -> Option<PageId> {
        if let Some(slot) = self.entries.get_mut(&page) {
            *slot = frame;
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity
            && let Some(oldest) = self.fifo.pop_front()
        {
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            evicted = Some(oldest);
        }

        self.entries.insert(page, frame);
        self.fifo.push_back(page);
        self.stats.inserts += 1;
        evicted
    }

    /// 页面被换出时使其条目失效
    pub fn invalidate(&mut self, page: PageId) -> bool {
        if self.entries.remove(&page).is_some() {
            self.fifo.retain(|&p| p != page);
            self.stats.invalidations += 1;
            true
        } else {
            false
        }
    }

    /// 当前缓存的映射
    pub fn entries(&self) -> impl Iterator<Item = (PageId, FrameIndex)> + '_ {
        self.entries.iter().map(|(&page, &frame)| (page, frame))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> &TlbStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_disables_tlb() {
        assert!(Tlb::new(0).is_none());
    }

    #[test]
    fn test_tlb_lookup() {
        let mut tlb = Tlb::new(4).unwrap();
        tlb.insert(2, 1);
        assert_eq!(tlb.lookup(2), Some(1));
        assert_eq!(tlb.stats().hits, 1);
        assert_eq!(tlb.lookup(3), None);
        assert_eq!(tlb.stats().misses, 1);
        assert!((tlb.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fifo_eviction_ignores_hits() {
        let mut tlb = Tlb::new(2).unwrap();
        tlb.insert(1, 0);
        tlb.insert(2, 1);
        // 命中不会改变淘汰顺序
        tlb.lookup(1);
        assert_eq!(tlb.insert(3, 2), Some(1));
        assert_eq!(tlb.lookup(1), None);
        assert_eq!(tlb.lookup(2), Some(1));
        assert_eq!(tlb.len(), 2);
    }

    #[test]
    fn test_invalidate() {
        let mut tlb = Tlb::new(2).unwrap();
        tlb.insert(1, 0);
        tlb.insert(2, 1);
        assert!(tlb.invalidate(1));
        assert!(!tlb.invalidate(1));
        assert_eq!(tlb.insert(3, 0), None);
        assert_eq!(tlb.insert(4, 2), Some(2));
        assert_eq!(tlb.stats().invalidations, 1);
    }
}
