//! 逐步历史记录

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{FrameSnapshot, PageId};

/// 一步访问的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepEvent {
    Hit,
    Fault,
}

/// 缺页时执行的动作，序列化为 `""`、`"loaded"` 或 `"evicted <page>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepAction {
    /// 命中，无动作
    #[default]
    None,
    /// 装入空闲帧
    Loaded,
    /// 淘汰了指定页面
    Evicted(PageId),
}

impl StepAction {
    pub fn evicted_page(self) -> Option<PageId> {
        match self {
            StepAction::Evicted(page) => Some(page),
            _ => None,
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepAction::None => Ok(()),
            StepAction::Loaded => f.write_str("loaded"),
            StepAction::Evicted(page) => write!(f, "evicted {page}"),
        }
    }
}

impl Serialize for StepAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 历史记录中的一步
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// 步号，从 1 开始
    pub step: usize,
    pub page: PageId,
    pub event: StepEvent,
    pub action: StepAction,
    /// 页面起始地址翻译后的物理地址（帧号 × 页大小）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_address: Option<u64>,
    /// 本步结束时的帧快照
    pub memory: FrameSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_text() {
        assert_eq!(StepAction::None.to_string(), "");
        assert_eq!(StepAction::Loaded.to_string(), "loaded");
        assert_eq!(StepAction::Evicted(7).to_string(), "evicted 7");
        assert_eq!(StepAction::Evicted(7).evicted_page(), Some(7));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = HistoryEntry {
            step: 4,
            page: 4,
            event: StepEvent::Fault,
            action: StepAction::Evicted(1),
            physical_address: Some(0),
            memory: vec![Some(4), Some(2), None],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"step":4,"page":4,"event":"fault","action":"evicted 1","physical_address":0,"memory":[4,2,null]}"#
        );
    }
}
