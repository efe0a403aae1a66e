//! 基于访问频率的替换策略：LFU、MFU
//!
//! 频率在装入时记为 1，之后每次命中加 1；页面被淘汰后频率随帧元数据一起丢弃。
//! 频率相同的页面中淘汰最早装入者。

use std::cmp::Reverse;

use super::{FrameLedger, ReplacementPolicy};
use crate::{FrameIndex, PageId};

/// 最不经常使用
#[derive(Debug, Clone)]
pub struct LfuPolicy {
    ledger: FrameLedger,
}

impl LfuPolicy {
    pub fn new(frame_count: usize) -> Self {
        Self {
            ledger: FrameLedger::new(frame_count),
        }
    }
}

impl ReplacementPolicy for LfuPolicy {
    fn on_load(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.load(page, frame);
    }

    fn on_access(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.touch(page, frame);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.ledger
            .min_by_key(frames, |meta| (meta.frequency, meta.loaded_at))
    }
}

/// 最经常使用
#[derive(Debug, Clone)]
pub struct MfuPolicy {
    ledger: FrameLedger,
}

impl MfuPolicy {
    pub fn new(frame_count: usize) -> Self {
        Self {
            ledger: FrameLedger::new(frame_count),
        }
    }
}

impl ReplacementPolicy for MfuPolicy {
    fn on_load(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.load(page, frame);
    }

    fn on_access(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.touch(page, frame);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.ledger
            .min_by_key(frames, |meta| (Reverse(meta.frequency), meta.loaded_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_all<P: ReplacementPolicy>(policy: &mut P, pages: &[PageId]) -> Vec<Option<PageId>> {
        for (frame, &page) in pages.iter().enumerate() {
            policy.on_load(page, frame);
        }
        pages.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_lfu_lowest_frequency() {
        let mut lfu = LfuPolicy::new(3);
        let frames = load_all(&mut lfu, &[1, 2, 3]);
        lfu.on_access(1, 0);
        lfu.on_access(3, 2);
        assert_eq!(lfu.select_victim(&frames), Some(1));
    }

    #[test]
    fn test_lfu_tie_breaks_on_earliest_load() {
        let mut lfu = LfuPolicy::new(3);
        let frames = load_all(&mut lfu, &[1, 2, 3]);
        lfu.on_access(1, 0);
        // 2 和 3 频率均为 1，2 装入更早
        assert_eq!(lfu.select_victim(&frames), Some(1));
    }

    #[test]
    fn test_mfu_highest_frequency() {
        let mut mfu = MfuPolicy::new(3);
        let frames = load_all(&mut mfu, &[1, 2, 3]);
        mfu.on_access(3, 2);
        mfu.on_access(3, 2);
        mfu.on_access(2, 1);
        assert_eq!(mfu.select_victim(&frames), Some(2));
    }

    #[test]
    fn test_mfu_tie_breaks_on_earliest_load() {
        let mut mfu = MfuPolicy::new(3);
        let frames = load_all(&mut mfu, &[1, 2, 3]);
        mfu.on_access(3, 2);
        mfu.on_access(2, 1);
        assert_eq!(mfu.select_victim(&frames), Some(1));
    }
}
