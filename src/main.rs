mod api;
mod cli;
mod config;
mod error;
mod fetch;
mod logging;
mod models;
mod pagination;
#[cfg(test)]
mod testing;
mod ui;

use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::prelude::*;

use crate::api::HttpApi;
use crate::cli::Cli;
use crate::error::AppError;
use crate::fetch::FetchWorker;
use crate::ui::{App, render};

/// 轮询键盘的间隔，期间处理后台返回的结果
const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let (config, config_path) = config::resolve(&cli)?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if cli.init_config {
        config::save_config(&config, &config_path)?;
        println!("配置已写入 {}", config_path.display());
        return Ok(());
    }

    let log_path = logging::log_path()?;
    logging::init(&log_path)?;
    info!("trivia browser starting, backend {}", config.base_url);

    // 启动后台请求线程
    let worker = FetchWorker::spawn(HttpApi::new(&config)?);

    // 创建应用状态并加载第一页
    let mut app = App::new();
    app.mount();

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app, &worker);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    worker.shutdown();
    info!("trivia browser exited");

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &FetchWorker,
) -> Result<(), AppError> {
    loop {
        while let Some(reply) = worker.try_recv() {
            app.handle_reply(reply);
        }
        for request in app.take_requests() {
            worker.submit(request);
        }

        terminal.draw(|f| render(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key.code)? {
                break;
            }
        }
    }
    Ok(())
}
