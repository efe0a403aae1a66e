//! 基于时间的替换策略：FIFO、LRU、MRU

use std::cmp::Reverse;

use super::{FrameLedger, ReplacementPolicy};
use crate::{FrameIndex, PageId};

/// 先进先出：淘汰最早装入的页面，命中不影响装入顺序
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    ledger: FrameLedger,
}

impl FifoPolicy {
    pub fn new(frame_count: usize) -> Self {
        Self {
            ledger: FrameLedger::new(frame_count),
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn on_load(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.load(page, frame);
    }

    fn on_access(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.touch(page, frame);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.ledger.min_by_key(frames, |meta| meta.loaded_at)
    }
}

/// 最近最少使用：淘汰最久未被访问的页面
#[derive(Debug, Clone)]
pub struct LruPolicy {
    ledger: FrameLedger,
}

impl LruPolicy {
    pub fn new(frame_count: usize) -> Self {
        Self {
            ledger: FrameLedger::new(frame_count),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn on_load(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.load(page, frame);
    }

    fn on_access(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.touch(page, frame);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.ledger.min_by_key(frames, |meta| meta.last_access)
    }
}

/// 最近最多使用：淘汰最近一次被访问的页面，平局时淘汰最早装入者
#[derive(Debug, Clone)]
pub struct MruPolicy {
    ledger: FrameLedger,
}

impl MruPolicy {
    pub fn new(frame_count: usize) -> Self {
        Self {
            ledger: FrameLedger::new(frame_count),
        }
    }
}

impl ReplacementPolicy for MruPolicy {
    fn on_load(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.load(page, frame);
    }

    fn on_access(&mut self, page: PageId, frame: FrameIndex) {
        self.ledger.touch(page, frame);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.ledger
            .min_by_key(frames, |meta| (Reverse(meta.last_access), meta.loaded_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 按序装入三个页面后，依次命中 `hits` 中的帧
    fn warm<P: ReplacementPolicy>(policy: &mut P, hits: &[FrameIndex]) -> Vec<Option<PageId>> {
        let frames = vec![Some(10), Some(11), Some(12)];
        for (frame, page) in frames.iter().enumerate() {
            policy.on_load(page.unwrap(), frame);
        }
        for &frame in hits {
            policy.on_access(frames[frame].unwrap(), frame);
        }
        frames
    }

    #[test]
    fn test_fifo_ignores_hits() {
        let mut fifo = FifoPolicy::new(3);
        let frames = warm(&mut fifo, &[0, 0, 1]);
        assert_eq!(fifo.select_victim(&frames), Some(0));
    }

    #[test]
    fn test_fifo_reload_moves_to_back() {
        let mut fifo = FifoPolicy::new(3);
        let mut frames = warm(&mut fifo, &[]);
        frames[0] = Some(20);
        fifo.on_load(20, 0);
        assert_eq!(fifo.select_victim(&frames), Some(1));
    }

    #[test]
    fn test_lru_tracks_recency() {
        let mut lru = LruPolicy::new(3);
        let frames = warm(&mut lru, &[0, 1]);
        assert_eq!(lru.select_victim(&frames), Some(2));
    }

    #[test]
    fn test_mru_picks_latest_access() {
        let mut mru = MruPolicy::new(3);
        let frames = warm(&mut mru, &[2, 0]);
        assert_eq!(mru.select_victim(&frames), Some(0));

        let mut mru = MruPolicy::new(3);
        let frames = warm(&mut mru, &[]);
        assert_eq!(mru.select_victim(&frames), Some(2));
    }
}
