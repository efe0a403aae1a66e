//! vm-paging: 虚拟内存分页模拟器
//!
//! 给定页面访问序列、物理帧预算和替换策略，逐步重现操作系统内存管理器的行为：
//! 经由页表（可选 TLB 缓存）翻译页号、判定命中/缺页、按策略选择淘汰页并记录
//! 每一步的内存快照。
//!
//! 组件依赖顺序（叶子在前）：
//! [`FrameAllocator`] → [`EvictionPolicy`] → [`AddressTranslator`] / [`Tlb`] →
//! [`SimulationDriver`] → [`StatisticsAggregator`] → [`ComparisonRunner`]。
//!
//! ```
//! use vm_paging::{PolicyKind, SimulationConfig, simulate};
//!
//! let trace = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
//! let config = SimulationConfig::new(3, PolicyKind::Fifo);
//! let result = simulate(&trace, &config).unwrap();
//! assert_eq!(result.total_page_faults, 9);
//! ```

pub mod comparison;
pub mod config;
pub mod driver;
pub mod error;
pub mod frame;
pub mod history;
pub mod page_table;
pub mod policy;
pub mod result;
pub mod stats;
pub mod tlb;
pub mod translate;

/// 虚拟页号
pub type PageId = u64;
/// 物理帧索引，取值范围 `[0, frame_count)`
pub type FrameIndex = usize;
/// 一个时刻所有物理帧的内容（空帧为 `None`）
pub type FrameSnapshot = Vec<Option<PageId>>;

pub use comparison::ComparisonRunner;
pub use config::{ConfigWarning, SimulationConfig};
pub use driver::{SimulationDriver, simulate};
pub use error::{PagingError, PagingResult};
pub use frame::FrameAllocator;
pub use history::{HistoryEntry, StepAction, StepEvent};
pub use page_table::{PageTable, PageTableEntry, PageTableKind, TableFootprint};
pub use policy::{EvictionPolicy, PolicyKind, ReplacementPolicy};
pub use result::{ResultSet, TlbSummary};
pub use stats::{RunStatistics, StatisticsAggregator};
pub use tlb::{Tlb, TlbStats};
pub use translate::{AddressTranslator, Translation};
