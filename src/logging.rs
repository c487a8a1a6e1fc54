//! 日志初始化
//!
//! 终端被 TUI 占用，日志写入数据目录下的文件，级别由 `RUST_LOG` 控制（默认 info）。

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::{Env, Target};

/// 获取日志文件路径 (~/.local/share/trivia-browser/trivia.log)
pub fn log_path() -> io::Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取用户数据目录"))?
        .join("trivia-browser");

    fs::create_dir_all(&data_dir)?;

    Ok(data_dir.join("trivia.log"))
}

/// 安装全局 logger，追加写入 `path`
pub fn init(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .map_err(io::Error::other)
}
