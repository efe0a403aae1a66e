//! Belady 最优替换
//!
//! 构造时对访问序列做一次反向扫描，得到每个位置的"下一次出现位置"表。
//! 驻留帧按 `(下一次使用, 装入顺序)` 保存在有序集合中，选择淘汰帧时直接读取最大者，
//! 无需在每次缺页时重新扫描未来序列。

use std::cmp::Reverse;
use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::ReplacementPolicy;
use crate::{FrameIndex, PageId};

/// 不再出现
const NEVER: usize = usize::MAX;

/// 排序键：下一次使用越远越优先淘汰；同为 [`NEVER`] 时淘汰最早装入者
type VictimKey = (usize, Reverse<u64>, FrameIndex);

#[derive(Debug, Clone)]
pub struct OptimalPolicy {
    /// `next_use[i]` 为位置 `i` 之后同一页面再次出现的位置
    next_use: Vec<usize>,
    /// 当前处理到的序列位置（每次 on_load/on_access 前进一步）
    cursor: usize,
    /// 每个帧当前的排序键
    keys: Vec<Option<VictimKey>>,
    order: BTreeSet<VictimKey>,
}

impl OptimalPolicy {
    pub fn new(frame_count: usize, trace: &[PageId]) -> Self {
        Self {
            next_use: next_occurrences(trace),
            cursor: 0,
            keys: vec![None; frame_count],
            order: BTreeSet::new(),
        }
    }

    /// 推进游标并返回当前访问之后该页面的下一次出现位置
    fn advance(&mut self) -> usize {
        let next = self.next_use.get(self.cursor).copied().unwrap_or(NEVER);
        self.cursor += 1;
        next
    }

    fn rekey(&mut self, frame: FrameIndex, next: usize, loaded_at: u64) {
        let Some(slot) = self.keys.get_mut(frame) else {
            return;
        };
        if let Some(old) = slot.take() {
            self.order.remove(&old);
        }
        let key = (next, Reverse(loaded_at), frame);
        *slot = Some(key);
        self.order.insert(key);
    }
}

/// 一次反向扫描求每个位置的下一次出现位置
fn next_occurrences(trace: &[PageId]) -> Vec<usize> {
    let mut next_use = vec![NEVER; trace.len()];
    let mut seen: FxHashMap<PageId, usize> = FxHashMap::default();

    for (index, &page) in trace.iter().enumerate().rev() {
        if let Some(next) = seen.insert(page, index) {
            next_use[index] = next;
        }
    }
    next_use
}

impl ReplacementPolicy for OptimalPolicy {
    fn on_load(&mut self, _page: PageId, frame: FrameIndex) {
        let loaded_at = self.cursor as u64;
        let next = self.advance();
        self.rekey(frame, next, loaded_at);
    }

    fn on_access(&mut self, _page: PageId, frame: FrameIndex) {
        let next = self.advance();
        let loaded_at = self
            .keys
            .get(frame)
            .copied()
            .flatten()
            .map_or(0, |(_, Reverse(loaded_at), _)| loaded_at);
        self.rekey(frame, next, loaded_at);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.order
            .iter()
            .rev()
            .map(|&(_, _, frame)| frame)
            .find(|&frame| frames.get(frame).is_some_and(Option::is_some))
    }
}
