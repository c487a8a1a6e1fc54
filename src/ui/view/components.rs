//! 通用 UI 组件
//!
//! 对话框、输入框、分页条等通用组件

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::pagination::PageControl;

/// [组件] 弹窗基础框架
pub fn render_dialog_framework(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 带有标题和样式的输入框
///
/// 聚焦时在末尾显示光标，未聚焦且为空时显示占位文字。
pub fn render_input_widget(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    placeholder: &str,
    is_focused: bool,
) {
    let (text, style) = if is_focused {
        (
            format!("{value}▏"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else if value.is_empty() {
        (placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (value.to_string(), Style::default().fg(Color::Gray))
    };

    let input = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}

/// [组件] 分页条，当前页反色显示
pub fn page_controls_line(controls: &[PageControl]) -> Line<'static> {
    let spans: Vec<Span> = controls
        .iter()
        .map(|control| {
            let style = if control.active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            Span::styled(format!(" {} ", control.number), style)
        })
        .collect();
    Line::from(spans)
}
