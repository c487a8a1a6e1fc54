use std::path::PathBuf;

use clap::Parser;

/// 终端题库浏览器
#[derive(Debug, Default, Parser)]
#[command(name = "trivia", version, about = "Browse, search and manage trivia questions")]
pub struct Cli {
    /// 题库后端地址，覆盖配置文件
    #[arg(long, env = "TRIVIA_BASE_URL")]
    pub base_url: Option<String>,

    /// 单次请求超时（秒）
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// 使用指定的配置文件
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 打印最终生效的配置后退出
    #[arg(long)]
    pub print_config: bool,

    /// 把最终生效的配置写入配置文件后退出
    #[arg(long)]
    pub init_config: bool,
}
