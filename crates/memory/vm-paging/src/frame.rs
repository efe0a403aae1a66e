//! 物理帧分配器
//!
//! 固定大小的物理帧池，记录每个帧当前驻留的页面。空闲帧按索引从小到大分配。

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::error::{PagingError, PagingResult};
use crate::{FrameIndex, FrameSnapshot, PageId};

/// 物理帧池
#[derive(Debug, Clone)]
pub struct FrameAllocator {
    /// 每个帧驻留的页面
    frames: Vec<Option<PageId>>,
    /// 页面 -> 帧 反向索引，保证同一页面不会出现在两个帧中
    resident: FxHashMap<PageId, FrameIndex>,
    /// 空闲帧集合
    free: BTreeSet<FrameIndex>,
}

impl FrameAllocator {
    /// 创建包含 `frame_count` 个空帧的帧池
    ///
    /// `frame_count` 为 0 时返回 [`PagingError::Configuration`]。
    pub fn new(frame_count: usize) -> PagingResult<Self> {
        if frame_count < 1 {
            return Err(PagingError::configuration(
                "frame pool requires at least one frame",
            ));
        }

        Ok(Self {
            frames: vec![None; frame_count],
            resident: FxHashMap::with_capacity_and_hasher(frame_count, Default::default()),
            free: (0..frame_count).collect(),
        })
    }

    /// 将页面装入索引最小的空闲帧
    pub fn allocate(&mut self, page: PageId) -> PagingResult<FrameIndex> {
        if let Some(&frame) = self.resident.get(&page) {
            return Err(PagingError::invariant(format!(
                "page {page} is already resident in frame {frame}"
            )));
        }

        let frame = self
            .free
            .pop_first()
            .ok_or_else(|| PagingError::invariant(format!("no free frame for page {page}")))?;

        self.frames[frame] = Some(page);
        self.resident.insert(page, frame);
        Ok(frame)
    }

    /// 释放帧并返回其中驻留的页面
    pub fn evict(&mut self, frame: FrameIndex) -> PagingResult<PageId> {
        let slot = self.frames.get_mut(frame).ok_or_else(|| {
            PagingError::invariant(format!("frame {frame} is outside the frame pool"))
        })?;
        let page = slot
            .take()
            .ok_or_else(|| PagingError::invariant(format!("frame {frame} is already empty")))?;

        self.resident.remove(&page);
        self.free.insert(frame);
        Ok(page)
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// 页面当前所在的帧
    pub fn frame_of(&self, page: PageId) -> Option<FrameIndex> {
        self.resident.get(&page).copied()
    }

    pub fn is_resident(&self, page: PageId) -> bool {
        self.resident.contains_key(&page)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// 只读访问帧数组
    pub fn frames(&self) -> &[Option<PageId>] {
        &self.frames
    }

    /// 当前帧数组的快照
    pub fn occupants(&self) -> FrameSnapshot {
        self.frames.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_frames_rejected() {
        let err = FrameAllocator::new(0).unwrap_err();
        assert!(matches!(err, PagingError::Configuration(_)));
    }

    #[test]
    fn test_allocate_lowest_free_frame() {
        let mut pool = FrameAllocator::new(3).unwrap();
        assert_eq!(pool.allocate(7).unwrap(), 0);
        assert_eq!(pool.allocate(8).unwrap(), 1);

        assert_eq!(pool.evict(0).unwrap(), 7);
        assert_eq!(pool.allocate(9).unwrap(), 0);
        assert_eq!(pool.occupants(), vec![Some(9), Some(8), None]);
        assert!(!pool.is_full());
    }

    #[test]
    fn test_duplicate_page_is_invariant_violation() {
        let mut pool = FrameAllocator::new(2).unwrap();
        pool.allocate(1).unwrap();
        let err = pool.allocate(1).unwrap_err();
        assert!(matches!(err, PagingError::InternalInvariant(_)));
        assert_eq!(pool.resident_count(), 1);
    }

    #[test]
    fn test_allocate_when_full_fails() {
        let mut pool = FrameAllocator::new(1).unwrap();
        pool.allocate(1).unwrap();
        assert!(pool.is_full());
        assert!(pool.allocate(2).is_err());
    }

    #[test]
    fn test_evict_empty_frame_fails() {
        let mut pool = FrameAllocator::new(2).unwrap();
        assert!(pool.evict(1).is_err());
        assert!(pool.evict(5).is_err());
    }

    #[test]
    fn test_frame_lookup() {
        let mut pool = FrameAllocator::new(2).unwrap();
        pool.allocate(42).unwrap();
        assert_eq!(pool.frame_of(42), Some(0));
        assert!(pool.is_resident(42));
        assert_eq!(pool.frame_of(43), None);
    }
}
