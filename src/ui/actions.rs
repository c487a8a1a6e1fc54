//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    MoveSelectionUp,
    MoveSelectionDown,
    SwitchFocus,
    Activate, // 分类面板: 按分类筛选; 题目面板: 显示/隐藏答案

    // 分页
    NextPage,
    PrevPage,
    SelectPage(usize),
    Reload,

    // 触发特定功能
    StartSearch,
    StartAddQuestion,
    StartDeleteQuestion,

    // 表单/通用交互
    NextField,   // Tab
    Cancel,      // Esc / n
    Submit,      // Enter / y
    Input(char), // 输入字符
    DeleteChar,  // Backspace
}
