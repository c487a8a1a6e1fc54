//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::state::{App, AppMode, ConfirmAction, Focus, InputField, NoticeLevel};
use components::{page_controls_line, render_dialog_framework, render_input_widget};
use layouts::centered_rect;

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(10),   // 主体
            Constraint::Length(4), // 帮助 + 提示
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(body[1]);

    render_title(frame, app, chunks[0]);
    render_categories(frame, app, left[0]);
    render_search_box(frame, app, left[1]);
    render_questions(frame, app, right[0]);
    render_pager(frame, app, right[1]);
    render_help(frame, app, chunks[2]);

    // 渲染弹窗
    match &app.mode {
        AppMode::AddingQuestion => render_add_dialog(frame, app),
        AppMode::Confirm(action) => render_confirm_dialog(frame, action),
        _ => {}
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "🧠 Trivia 题库",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(category) = &app.list.current_category {
        spans.push(Span::raw(format!("  当前分类: {category}")));
    }
    if app.loading {
        spans.push(Span::styled("  加载中…", Style::default().fg(Color::Yellow)));
    }

    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_categories(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .list
        .categories
        .iter()
        .map(|(id, name)| ListItem::new(format!("{name} (#{id})")))
        .collect();

    let focused = app.focus == Focus::Categories;
    let list = List::new(items)
        .block(panel_block("分类", focused))
        .highlight_style(if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        });

    let mut state = ListState::default();
    if !app.list.categories.is_empty() {
        state.select(Some(app.selected_category));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    render_input_widget(
        frame,
        area,
        "搜索",
        &app.input_buffer,
        "按 / 搜索题目",
        app.mode == AppMode::Searching,
    );
}

/// 每道题渲染为一个多行条目
pub(crate) fn question_items(app: &App) -> Vec<ListItem<'_>> {
    app.list
        .questions
        .iter()
        .map(|question| {
            let mut lines = vec![
                Line::from(Span::styled(
                    question.question.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "  分类: {}  难度: {}",
                        app.list.category_name(question.category),
                        question.difficulty
                    ),
                    Style::default().fg(Color::Gray),
                )),
            ];
            if app.revealed == Some(question.id) {
                lines.push(Line::from(Span::styled(
                    format!("  答案: {}", question.answer),
                    Style::default().fg(Color::Green),
                )));
            }
            ListItem::new(lines)
        })
        .collect()
}

fn render_questions(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("题目 ({})", app.list.total_questions);
    let focused = app.focus == Focus::Questions;

    if app.list.questions.is_empty() {
        let empty = Paragraph::new("暂无题目")
            .style(Style::default().fg(Color::DarkGray))
            .block(panel_block(&title, focused));
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(question_items(app))
        .block(panel_block(&title, focused))
        .highlight_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });

    let mut state = ListState::default();
    state.select(Some(app.selected_question));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_pager(frame: &mut Frame, app: &App, area: Rect) {
    let pager = Paragraph::new(page_controls_line(&app.list.page_controls()))
        .block(Block::default().title("页码").borders(Borders::ALL));
    frame.render_widget(pager, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[Tab] 切换面板  [Enter] 筛选/答案  [h/l] 翻页  [/] 搜索  [a] 添加  [d] 删除  [r] 刷新  [q] 退出"
        }
        AppMode::Searching => "输入搜索词后按 [Enter] 搜索  [Esc] 取消",
        AppMode::AddingQuestion => "[Tab] 切换字段  [Enter] 下一项/提交  [Esc] 取消",
        AppMode::Confirm(_) => "[y] 确认  [n] 取消",
    };

    // 提示单独占第二行
    let mut lines = vec![Line::from(help_text)];
    if let Some(notice) = &app.notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        lines.push(Line::from(Span::styled(
            format!("[{}] {}", notice.at.format("%H:%M:%S"), notice.text),
            Style::default().fg(color),
        )));
    }

    let help = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_add_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, frame.area());
    let inner = render_dialog_framework(frame, area, "添加新题目");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    for (field, chunk) in InputField::ALL.iter().zip(chunks.iter()) {
        render_input_widget(
            frame,
            *chunk,
            field.label(),
            app.draft.field(*field),
            "",
            app.input_field == *field,
        );
    }

    let hint = if app.list.categories.is_empty() {
        String::new()
    } else {
        let known: Vec<String> = app
            .list
            .categories
            .iter()
            .map(|(id, name)| format!("{id}={name}"))
            .collect();
        format!("分类: {}", known.join("  "))
    };
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::Gray)),
        chunks[4],
    );
}

fn render_confirm_dialog(frame: &mut Frame, action: &ConfirmAction) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let message = match action {
        ConfirmAction::Delete(id) => format!("确认删除题目 #{id}？"),
    };

    let dialog = Paragraph::new(format!("{}\n\n[y] 确认  [n] 取消", message))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("⚠️ 确认操作").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}
