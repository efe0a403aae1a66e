//! 页面替换策略
//!
//! 六种策略共享同一组能力 `{on_load, on_access, select_victim}`，
//! 并由封闭枚举 [`EvictionPolicy`] 统一分发。新增策略只需新增一个变体及其三个方法。

mod frequency;
mod optimal;
mod recency;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use frequency::{LfuPolicy, MfuPolicy};
pub use optimal::OptimalPolicy;
pub use recency::{FifoPolicy, LruPolicy, MruPolicy};

use crate::error::PagingError;
use crate::{FrameIndex, PageId};

/// 替换策略的公共接口
pub trait ReplacementPolicy {
    /// 页面被装入 `frame`（缺页处理完成后调用）
    fn on_load(&mut self, page: PageId, frame: FrameIndex);

    /// 命中驻留在 `frame` 中的页面
    fn on_access(&mut self, page: PageId, frame: FrameIndex);

    /// 帧池已满时选择淘汰帧；没有驻留页面时返回 `None`
    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex>;
}

/// 替换策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// 先进先出
    Fifo,
    /// 最近最少使用
    Lru,
    /// Belady 最优替换
    Optimal,
    /// 最不经常使用
    Lfu,
    /// 最近最多使用
    Mru,
    /// 最经常使用
    Mfu,
}

impl PolicyKind {
    /// 对比运行使用的固定顺序
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Fifo,
        PolicyKind::Lru,
        PolicyKind::Optimal,
        PolicyKind::Lfu,
        PolicyKind::Mru,
        PolicyKind::Mfu,
    ];

    /// 结果中使用的算法标签
    pub fn label(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Lru => "LRU",
            PolicyKind::Optimal => "OPTIMAL",
            PolicyKind::Lfu => "LFU",
            PolicyKind::Mru => "MRU",
            PolicyKind::Mfu => "MFU",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PolicyKind {
    type Err = PagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            "optimal" | "opt" => Ok(PolicyKind::Optimal),
            "lfu" => Ok(PolicyKind::Lfu),
            "mru" => Ok(PolicyKind::Mru),
            "mfu" => Ok(PolicyKind::Mfu),
            other => Err(PagingError::invalid_input(format!(
                "unknown replacement algorithm '{other}', expected one of fifo, lru, optimal, lfu, mru, mfu"
            ))),
        }
    }
}

/// 运行期策略实例
#[derive(Debug, Clone)]
pub enum EvictionPolicy {
    Fifo(FifoPolicy),
    Lru(LruPolicy),
    Optimal(OptimalPolicy),
    Lfu(LfuPolicy),
    Mru(MruPolicy),
    Mfu(MfuPolicy),
}

impl EvictionPolicy {
    /// 为一次运行创建策略。`trace` 仅供 Optimal 预计算下一次出现位置。
    pub fn new(kind: PolicyKind, frame_count: usize, trace: &[PageId]) -> Self {
        match kind {
            PolicyKind::Fifo => Self::Fifo(FifoPolicy::new(frame_count)),
            PolicyKind::Lru => Self::Lru(LruPolicy::new(frame_count)),
            PolicyKind::Optimal => Self::Optimal(OptimalPolicy::new(frame_count, trace)),
            PolicyKind::Lfu => Self::Lfu(LfuPolicy::new(frame_count)),
            PolicyKind::Mru => Self::Mru(MruPolicy::new(frame_count)),
            PolicyKind::Mfu => Self::Mfu(MfuPolicy::new(frame_count)),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Fifo(_) => PolicyKind::Fifo,
            Self::Lru(_) => PolicyKind::Lru,
            Self::Optimal(_) => PolicyKind::Optimal,
            Self::Lfu(_) => PolicyKind::Lfu,
            Self::Mru(_) => PolicyKind::Mru,
            Self::Mfu(_) => PolicyKind::Mfu,
        }
    }

    fn as_policy_mut(&mut self) -> &mut dyn ReplacementPolicy {
        match self {
            Self::Fifo(p) => p,
            Self::Lru(p) => p,
            Self::Optimal(p) => p,
            Self::Lfu(p) => p,
            Self::Mru(p) => p,
            Self::Mfu(p) => p,
        }
    }

    fn as_policy(&self) -> &dyn ReplacementPolicy {
        match self {
            Self::Fifo(p) => p,
            Self::Lru(p) => p,
            Self::Optimal(p) => p,
            Self::Lfu(p) => p,
            Self::Mru(p) => p,
            Self::Mfu(p) => p,
        }
    }
}

impl ReplacementPolicy for EvictionPolicy {
    fn on_load(&mut self, page: PageId, frame: FrameIndex) {
        self.as_policy_mut().on_load(page, frame);
    }

    fn on_access(&mut self, page: PageId, frame: FrameIndex) {
        self.as_policy_mut().on_access(page, frame);
    }

    fn select_victim(&self, frames: &[Option<PageId>]) -> Option<FrameIndex> {
        self.as_policy().select_victim(frames)
    }
}

/// 单个帧的策略元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameMeta {
    pub page: PageId,
    /// 装入时的逻辑时钟
    pub loaded_at: u64,
    /// 最近一次访问的逻辑时钟
    pub last_access: u64,
    /// 访问频率（装入记 1，每次命中加 1）
    pub frequency: u64,
}

/// 按帧记录元数据的账本，供 FIFO/LRU/MRU/LFU/MFU 共用
///
/// 每次 `load`/`touch` 推进一次逻辑时钟，因此时间戳在一次运行内唯一。
#[derive(Debug, Clone)]
pub(crate) struct FrameLedger {
    metas: Vec<Option<FrameMeta>>,
    clock: u64,
}

impl FrameLedger {
    pub fn new(frame_count: usize) -> Self {
        Self {
            metas: vec![None; frame_count],
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        let now = self.clock;
        self.clock += 1;
        now
    }

    /// 装入页面，丢弃该帧原有的元数据
    pub fn load(&mut self, page: PageId, frame: FrameIndex) {
        let now = self.tick();
        if let Some(slot) = self.metas.get_mut(frame) {
            *slot = Some(FrameMeta {
                page,
                loaded_at: now,
                last_access: now,
                frequency: 1,
            });
        }
    }

    /// 记录一次命中
    pub fn touch(&mut self, page: PageId, frame: FrameIndex) {
        let now = self.tick();
        if let Some(Some(meta)) = self.metas.get_mut(frame) {
            debug_assert_eq!(meta.page, page, "ledger out of sync with frame {frame}");
            meta.last_access = now;
            meta.frequency += 1;
        }
    }

    /// 在驻留帧中选择 `key` 最小者
    pub fn min_by_key<K, F>(&self, frames: &[Option<PageId>], key: F) -> Option<FrameIndex>
    where
        K: Ord,
        F: Fn(&FrameMeta) -> K,
    {
        frames
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_some())
            .filter_map(|(frame, _)| {
                self.metas
                    .get(frame)
                    .copied()
                    .flatten()
                    .map(|meta| (key(&meta), frame))
            })
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, frame)| frame)
    }

    #[cfg(test)]
    pub fn meta(&self, frame: FrameIndex) -> Option<FrameMeta> {
        self.metas.get(frame).copied().flatten()
    }
}
