//! 服务配置

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// HTTP 服务配置
///
/// 可从 TOML 文件加载，缺省字段取默认值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub bind_port: u16,
    /// 单次请求允许的最大访问序列长度
    pub max_trace_len: usize,
    /// 单次请求允许的最大物理帧数
    pub max_frames: usize,
    /// 单次请求允许的最大虚拟地址空间页数
    pub max_virtual_pages: usize,
    /// 超过该长度的访问序列不返回逐步历史，0 表示不限制
    pub history_limit: usize,
    /// 是否允许任意来源的跨域请求
    pub cors_permissive: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            max_trace_len: 100_000,
            max_frames: 4096,
            max_virtual_pages: 1 << 20,
            history_limit: 10_000,
            cors_permissive: true,
        }
    }
}

impl ServiceConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ServiceResult<Self> {
        toml::from_str(content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// 核心使用的历史保留上限
    pub fn history_limit(&self) -> Option<usize> {
        (self.history_limit > 0).then_some(self.history_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ServiceConfig::from_toml("bind_port = 9090\nhistory_limit = 0\n").unwrap();
        assert_eq!(config.bind_port, 9090);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.history_limit(), None);
        assert_eq!(config.socket_addr(), "127.0.0.1:9090");
        assert_eq!(config.max_frames, 4096);
        assert_eq!(config.max_virtual_pages, 1 << 20);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ServiceConfig::from_toml("bind_port = \"eighty\"").unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::from_file("/nonexistent/vm-paging.toml").unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));
    }
}
