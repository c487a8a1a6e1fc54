use std::io;

use thiserror::Error;

/// 与题库后端通信时的错误
///
/// 行为上不区分网络错误、4xx 与 5xx，这里只是为了日志里能看清原因。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} 返回状态码 {status}")]
    Status { status: u16, url: String },
    #[error("响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 配置文件错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法获取用户配置目录")]
    NoConfigDir,
    #[error("读写配置文件失败: {0}")]
    Io(#[from] io::Error),
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("配置序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 程序顶层错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
