//! vm-paging-service: 分页模拟器的 HTTP 服务
//!
//! 接收 JSON 请求（简单格式或扩展格式），在阻塞线程池上运行 [`vm_paging`]
//! 模拟，并以 JSON 数组返回每次运行的结果。
//!
//! - `POST /simulate`：运行模拟
//! - `GET /health`：健康检查

pub mod config;
pub mod error;
pub mod request;
pub mod server;
pub mod workload;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use request::{SimulationJob, SimulationRequest};
pub use server::{router, serve};
