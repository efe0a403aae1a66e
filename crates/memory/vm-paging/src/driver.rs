//! 模拟驱动
//!
//! 按顺序处理访问序列：翻译 → 命中/缺页 → （必要时）淘汰 → 装入 → 快照。
//! 每一步都依赖之前所有步骤的状态，因此一次运行严格串行。

use log::{debug, trace, warn};

use crate::config::SimulationConfig;
use crate::error::{PagingError, PagingResult};
use crate::frame::FrameAllocator;
use crate::history::{HistoryEntry, StepAction, StepEvent};
use crate::policy::{EvictionPolicy, ReplacementPolicy};
use crate::result::{ResultSet, TlbSummary};
use crate::stats::StatisticsAggregator;
use crate::translate::{AddressTranslator, Translation};
use crate::{FrameSnapshot, PageId};

/// 校验配置后运行一次模拟
pub fn simulate(trace: &[PageId], config: &SimulationConfig) -> PagingResult<ResultSet> {
    for warning in config.validate(trace)? {
        warn!("{warning}");
    }
    SimulationDriver::new(trace, config)?.run()
}

/// 单次运行的全部状态，运行结束即丢弃
pub struct SimulationDriver<'a> {
    trace: &'a [PageId],
    config: &'a SimulationConfig,
    allocator: FrameAllocator,
    policy: EvictionPolicy,
    translator: AddressTranslator,
    events: Vec<StepEvent>,
    history: Vec<HistoryEntry>,
    evolution: Vec<FrameSnapshot>,
    retain_history: bool,
}

impl<'a> SimulationDriver<'a> {
    /// 创建驱动。调用方需先通过 [`SimulationConfig::validate`] 校验输入。
    pub fn new(trace: &'a [PageId], config: &'a SimulationConfig) -> PagingResult<Self> {
        let allocator = FrameAllocator::new(config.frame_count)?;
        let policy = EvictionPolicy::new(config.policy, config.frame_count, trace);
        let translator = AddressTranslator::new(
            config.table,
            config.virtual_pages,
            trace,
            config.tlb_size,
            config.page_size,
        );
        let retain_history = config.retains_history(trace.len());
        let capacity = if retain_history { trace.len() } else { 0 };

        Ok(Self {
            trace,
            config,
            allocator,
            policy,
            translator,
            events: Vec::with_capacity(trace.len()),
            history: Vec::with_capacity(capacity),
            evolution: Vec::with_capacity(capacity),
            retain_history,
        })
    }

    /// 处理整个访问序列并生成结果
    pub fn run(mut self) -> PagingResult<ResultSet> {
        debug!(
            "simulating {} requests: policy={} table={} frames={} tlb={}",
            self.trace.len(),
            self.config.policy,
            self.config.table,
            self.config.frame_count,
            self.config.tlb_size
        );

        let trace = self.trace;
        for (index, &page) in trace.iter().enumerate() {
            self.step(index + 1, page)?;
        }

        let stats = StatisticsAggregator::aggregate(self.events.iter().copied());
        debug!(
            "{} finished: {} hits, {} faults",
            self.config.policy, stats.total_hits, stats.total_page_faults
        );

        Ok(ResultSet {
            algorithm: self.config.policy.label(),
            paging_type: Some(self.config.table.label()),
            total_page_faults: stats.total_page_faults,
            total_hits: stats.total_hits,
            hit_ratio: stats.hit_ratio,
            fault_ratio: stats.fault_ratio,
            page_size: self.translator.page_size(),
            tlb: self.translator.tlb_stats().map(TlbSummary::from),
            final_memory_state: self.allocator.occupants(),
            page_table: self.evolution,
            history: self.history,
            table_footprint: self.translator.footprint(),
            history_truncated: !self.retain_history,
            policy: self.config.policy,
            table: self.config.table,
        })
    }

    /// 处理第 `step` 步（从 1 开始）
    fn step(&mut self, step: usize, page: PageId) -> PagingResult<()> {
        let translation = self.translator.translate(page);
        self.check_translation(page, translation)?;

        let (event, action) = match translation.frame() {
            Some(frame) => {
                self.policy.on_access(page, frame);
                self.translator.touch(page, step as u64);
                (StepEvent::Hit, StepAction::None)
            }
            None => (StepEvent::Fault, self.handle_fault(page, step)?),
        };

        self.check_invariants(step)?;
        self.events.push(event);

        if self.retain_history {
            let memory = self.allocator.occupants();
            self.evolution.push(memory.clone());
            self.history.push(HistoryEntry {
                step,
                page,
                event,
                action,
                physical_address: self.translator.physical_address_of(page),
                memory,
            });
        }
        Ok(())
    }

    /// 缺页：选帧（空闲帧或淘汰），装入并建立映射
    fn handle_fault(&mut self, page: PageId, step: usize) -> PagingResult<StepAction> {
        let (frame, action) = if self.allocator.is_full() {
            let victim_frame = self
                .policy
                .select_victim(self.allocator.frames())
                .ok_or_else(|| {
                    PagingError::invariant(format!(
                        "{} selected no victim at step {step}",
                        self.config.policy
                    ))
                })?;
            let victim = self.allocator.evict(victim_frame)?;
            self.translator.invalidate(victim);

            let frame = self.allocator.allocate(page)?;
            if frame != victim_frame {
                return Err(PagingError::invariant(format!(
                    "page {page} loaded into frame {frame} instead of freed frame {victim_frame}"
                )));
            }
            trace!("step {step}: page {page} evicts page {victim} from frame {frame}");
            (frame, StepAction::Evicted(victim))
        } else {
            let frame = self.allocator.allocate(page)?;
            trace!("step {step}: page {page} loaded into free frame {frame}");
            (frame, StepAction::Loaded)
        };

        self.policy.on_load(page, frame);
        self.translator.install(page, frame, step as u64)?;
        Ok(action)
    }

    /// 翻译结果必须与帧池一致
    fn check_translation(&self, page: PageId, translation: Translation) -> PagingResult<()> {
        let resident = self.allocator.frame_of(page);
        if translation.frame() != resident {
            return Err(PagingError::invariant(format!(
                "translation of page {page} gave {translation:?} but frame pool has {resident:?}"
            )));
        }
        Ok(())
    }

    fn check_invariants(&self, step: usize) -> PagingResult<()> {
        let resident = self.allocator.resident_count();
        if resident > self.allocator.frame_count() {
            return Err(PagingError::invariant(format!(
                "step {step}: {resident} resident pages exceed {} frames",
                self.allocator.frame_count()
            )));
        }

        let mapped = self.translator.footprint().resident_entries;
        if mapped != resident {
            return Err(PagingError::invariant(format!(
                "step {step}: page table maps {mapped} pages but {resident} are resident"
            )));
        }

        if let Some(tlb) = self.translator.tlb() {
            if tlb.len() > tlb.capacity() {
                return Err(PagingError::invariant(format!(
                    "step {step}: TLB holds {} entries beyond its capacity of {}",
                    tlb.len(),
                    tlb.capacity()
                )));
            }
            for (page, frame) in tlb.entries() {
                if self.allocator.frame_of(page) != Some(frame) {
                    return Err(PagingError::invariant(format!(
                        "step {step}: TLB maps page {page} to frame {frame} which does not hold it"
                    )));
                }
            }
        }
        Ok(())
    }
}
