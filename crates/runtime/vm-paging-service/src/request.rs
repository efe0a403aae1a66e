//! 请求解析
//!
//! 接受两种 JSON 请求格式，统一解析为 [`SimulationJob`]：
//!
//! - 简单格式：`{ requests, frames, algorithm }`
//! - 扩展格式：含 `total_physical_frames`，可选页表类型、TLB 与页大小，访问序列
//!   由 `memory_requests` 给出或按 `total_access_requests` 随机生成
//!
//! 所有名称不区分大小写，`"all"` 表示全部策略（或全部页表类型）。

use serde::Deserialize;
use serde_json::Value;
use vm_paging::config::DEFAULT_PAGE_SIZE;
use vm_paging::{
    ComparisonRunner, PageId, PageTableKind, PagingError, PagingResult, PolicyKind, ResultSet,
    SimulationConfig,
};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::workload::generate_trace;

/// 访问序列：JSON 整数数组或逗号分隔的字符串
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TraceInput {
    Pages(Vec<Value>),
    Text(String),
}

impl TraceInput {
    pub fn into_trace(self) -> PagingResult<Vec<PageId>> {
        match self {
            TraceInput::Pages(values) => values
                .iter()
                .enumerate()
                .map(|(index, value)| match (value.as_u64(), value.as_i64()) {
                    (Some(page), _) => Ok(page),
                    (None, Some(page)) => Err(negative_page(page, index)),
                    (None, None) => Err(PagingError::invalid_input(format!(
                        "request at position {} is not an integer: {value}",
                        index + 1
                    ))),
                })
                .collect(),
            TraceInput::Text(text) => parse_trace(&text),
        }
    }
}

/// 解析 `"1, 2,3"` 形式的访问序列，空白项被忽略
///
/// 错误信息中的位置按原始分隔项计数。
pub fn parse_trace(text: &str) -> PagingResult<Vec<PageId>> {
    text.split(',')
        .map(str::trim)
        .enumerate()
        .filter(|(_, token)| !token.is_empty())
        .map(|(index, token)| {
            if let Ok(page) = token.parse::<PageId>() {
                return Ok(page);
            }
            match token.parse::<i64>() {
                Ok(page) => Err(negative_page(page, index)),
                Err(_) => Err(PagingError::invalid_input(format!(
                    "request at position {} is not an integer: '{token}'",
                    index + 1
                ))),
            }
        })
        .collect()
}

fn negative_page(page: i64, index: usize) -> PagingError {
    PagingError::invalid_input(format!(
        "request at position {} is negative: {page}",
        index + 1
    ))
}

fn count(value: i64, field: &str) -> PagingResult<usize> {
    usize::try_from(value)
        .map_err(|_| PagingError::invalid_input(format!("{field} must not be negative, got {value}")))
}

fn parse_policies(token: &str) -> PagingResult<Vec<PolicyKind>> {
    if token.trim().eq_ignore_ascii_case("all") {
        Ok(PolicyKind::ALL.to_vec())
    } else {
        Ok(vec![token.parse()?])
    }
}

fn parse_tables(token: &str) -> PagingResult<Vec<PageTableKind>> {
    if token.trim().eq_ignore_ascii_case("all") {
        Ok(PageTableKind::ALL.to_vec())
    } else {
        Ok(vec![token.parse()?])
    }
}

/// 简单格式
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimpleRequest {
    pub requests: TraceInput,
    pub frames: i64,
    pub algorithm: String,
}

/// 扩展格式
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtendedRequest {
    pub total_virtual_pages: Option<i64>,
    pub total_physical_frames: i64,
    pub page_size: Option<i64>,
    #[serde(default = "default_table")]
    pub page_table_type: String,
    #[serde(default)]
    pub tlb_size: i64,
    #[serde(default = "default_algorithm")]
    pub replacement_algo: String,
    pub total_access_requests: Option<i64>,
    pub memory_requests: Option<TraceInput>,
    /// 随机生成访问序列时使用的种子
    pub seed: Option<u64>,
}

fn default_table() -> String {
    "single".to_string()
}

fn default_algorithm() -> String {
    "fifo".to_string()
}

/// `POST /simulate` 的请求体
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationRequest {
    Simple(SimpleRequest),
    Extended(ExtendedRequest),
}

impl SimulationRequest {
    pub fn from_slice(body: &[u8]) -> ServiceResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::MalformedRequest(e.to_string()))?;
        Self::from_value(value)
    }

    /// 含 `total_physical_frames` 的请求按扩展格式解析
    pub fn from_value(value: Value) -> ServiceResult<Self> {
        if !value.is_object() {
            return Err(ServiceError::MalformedRequest(
                "request body must be a JSON object".to_string(),
            ));
        }
        let malformed = |e: serde_json::Error| ServiceError::MalformedRequest(e.to_string());
        if value.get("total_physical_frames").is_some() {
            serde_json::from_value(value)
                .map(SimulationRequest::Extended)
                .map_err(malformed)
        } else {
            serde_json::from_value(value)
                .map(SimulationRequest::Simple)
                .map_err(malformed)
        }
    }

    /// 校验请求并转换为待执行的任务
    pub fn resolve(self, service: &ServiceConfig) -> ServiceResult<SimulationJob> {
        let job = match self {
            SimulationRequest::Simple(request) => resolve_simple(request, service)?,
            SimulationRequest::Extended(request) => resolve_extended(request, service)?,
        };
        if job.config.frame_count > service.max_frames {
            return Err(PagingError::invalid_input(format!(
                "frame count {} exceeds the limit of {}",
                job.config.frame_count, service.max_frames
            ))
            .into());
        }
        if let Some(pages) = job.config.virtual_pages
            && pages > service.max_virtual_pages
        {
            return Err(PagingError::invalid_input(format!(
                "total_virtual_pages {pages} exceeds the limit of {}",
                service.max_virtual_pages
            ))
            .into());
        }
        if job.trace.len() > service.max_trace_len {
            return Err(PagingError::invalid_input(format!(
                "request trace has {} entries, the limit is {}",
                job.trace.len(),
                service.max_trace_len
            ))
            .into());
        }
        Ok(job)
    }
}

fn resolve_simple(request: SimpleRequest, service: &ServiceConfig) -> PagingResult<SimulationJob> {
    let frames = count(request.frames, "frames")?;
    let policies = parse_policies(&request.algorithm)?;
    let trace = request.requests.into_trace()?;
    let config = SimulationConfig::new(frames, policies[0]).with_history_limit(service.history_limit());

    Ok(SimulationJob {
        trace,
        tables: vec![config.table],
        config,
        policies,
    })
}

fn resolve_extended(
    request: ExtendedRequest,
    service: &ServiceConfig,
) -> PagingResult<SimulationJob> {
    let frames = count(request.total_physical_frames, "total_physical_frames")?;
    let tlb_size = count(request.tlb_size, "tlb_size")?;
    let policies = parse_policies(&request.replacement_algo)?;
    let tables = parse_tables(&request.page_table_type)?;
    let virtual_pages = request
        .total_virtual_pages
        .map(|pages| count(pages, "total_virtual_pages"))
        .transpose()?;
    let page_size = match request.page_size {
        Some(size) => u64::try_from(size)
            .map_err(|_| PagingError::invalid_input(format!("page size must be at least 1, got {size}")))?,
        None => DEFAULT_PAGE_SIZE,
    };

    let trace = match (request.memory_requests, request.total_access_requests) {
        (Some(input), _) => input.into_trace()?,
        (None, Some(len)) => {
            let len = count(len, "total_access_requests")?;
            if len > service.max_trace_len {
                return Err(PagingError::invalid_input(format!(
                    "total_access_requests {len} exceeds the limit of {}",
                    service.max_trace_len
                )));
            }
            let pages = virtual_pages.filter(|&pages| pages > 0).ok_or_else(|| {
                PagingError::invalid_input(
                    "total_virtual_pages must be at least 1 to generate requests",
                )
            })?;
            if pages > service.max_virtual_pages {
                return Err(PagingError::invalid_input(format!(
                    "total_virtual_pages {pages} exceeds the limit of {}",
                    service.max_virtual_pages
                )));
            }
            generate_trace(len, pages as u64, request.seed)
        }
        (None, None) => {
            return Err(PagingError::invalid_input(
                "either memory_requests or total_access_requests is required",
            ));
        }
    };

    let mut config = SimulationConfig::new(frames, policies[0])
        .with_table(tables[0])
        .with_tlb(tlb_size)
        .with_page_size(page_size)
        .with_history_limit(service.history_limit());
    if let Some(pages) = virtual_pages {
        config = config.with_virtual_pages(pages);
    }

    Ok(SimulationJob {
        trace,
        config,
        policies,
        tables,
    })
}

/// 解析完成、等待执行的模拟任务
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationJob {
    pub trace: Vec<PageId>,
    /// 基础配置，策略与页表类型由 `policies` × `tables` 覆盖
    pub config: SimulationConfig,
    pub policies: Vec<PolicyKind>,
    pub tables: Vec<PageTableKind>,
}

impl SimulationJob {
    pub fn runs(&self) -> usize {
        self.policies.len() * self.tables.len()
    }

    /// 运行全部组合；结果按页表类型、策略的固定顺序排列
    pub fn execute(&self) -> PagingResult<Vec<ResultSet>> {
        ComparisonRunner::new(&self.trace, self.config.clone()).run_matrix(&self.tables, &self.policies)
    }
}
