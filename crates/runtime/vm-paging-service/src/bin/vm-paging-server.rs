//! 分页模拟器 HTTP 服务
//!
//! 配置优先级：命令行参数 > 配置文件 > 默认值。日志级别由 `RUST_LOG` 控制。

use std::path::PathBuf;

use clap::{Arg, Command, value_parser};
use tracing_subscriber::EnvFilter;
use vm_paging_service::{ServiceConfig, serve};

fn cli() -> Command {
    Command::new("vm-paging-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HTTP service for the virtual memory paging simulator")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file path")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDR")
                .help("Address to listen on"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on")
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("max-trace-len")
                .long("max-trace-len")
                .value_name("NUM")
                .help("Maximum number of page requests accepted per simulation")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("max-frames")
                .long("max-frames")
                .value_name("NUM")
                .help("Maximum number of physical frames accepted per simulation")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("history-limit")
                .long("history-limit")
                .value_name("NUM")
                .help("Omit per-step history for traces longer than this (0 = unlimited)")
                .value_parser(value_parser!(usize)),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = cli().get_matches();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            ServiceConfig::from_file(path)?
        }
        None => ServiceConfig::default(),
    };
    if let Some(bind) = matches.get_one::<String>("bind") {
        config.bind_address = bind.clone();
    }
    if let Some(&port) = matches.get_one::<u16>("port") {
        config.bind_port = port;
    }
    if let Some(&max_trace_len) = matches.get_one::<usize>("max-trace-len") {
        config.max_trace_len = max_trace_len;
    }
    if let Some(&max_frames) = matches.get_one::<usize>("max-frames") {
        config.max_frames = max_frames;
    }
    if let Some(&history_limit) = matches.get_one::<usize>("history-limit") {
        config.history_limit = history_limit;
    }

    serve(config).await?;
    Ok(())
}
