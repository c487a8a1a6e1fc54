//! App 状态定义 (Model)
//!
//! `QuestionListState` 是服务端数据的快照，每次成功的列表请求都会生成一个新快照，
//! 其余字段是纯界面状态。

use chrono::{DateTime, Local};

use crate::fetch::{Listing, Request};
use crate::models::{Categories, NewQuestion, Question, QuestionsPayload};
use crate::pagination::{self, PageControl};

/// 题目列表快照
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionListState {
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub categories: Categories,
    pub current_category: Option<String>,
    pub page: usize,
}

impl Default for QuestionListState {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            total_questions: 0,
            categories: Categories::new(),
            current_category: None,
            page: 1,
        }
    }
}

impl QuestionListState {
    /// 切换页码（在新数据到达前 page 可能暂时越界）
    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// 用服务端响应整体替换，返回新快照
    ///
    /// 只有分页列表会带回分类表；按分类和搜索的结果沿用缓存的分类。
    pub fn reconciled(&self, listing: &Listing, payload: QuestionsPayload) -> Self {
        let QuestionsPayload {
            questions,
            total_questions,
            categories,
            current_category,
        } = payload;

        match listing {
            Listing::Page(page) => Self {
                questions,
                total_questions,
                categories: categories.unwrap_or_default(),
                current_category,
                page: *page,
            },
            Listing::Category(_) | Listing::Search(_) => Self {
                questions,
                total_questions,
                current_category,
                ..self.clone()
            },
        }
    }

    pub fn page_count(&self) -> usize {
        pagination::page_count(self.total_questions)
    }

    pub fn page_controls(&self) -> Vec<PageControl> {
        pagination::page_controls(self.total_questions, self.page)
    }

    /// 题目所属分类名，未知分类显示 Unknown
    pub fn category_name(&self, id: i64) -> &str {
        self.categories.get(id).unwrap_or("Unknown")
    }
}

/// 当前焦点所在面板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Questions,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Searching,
    AddingQuestion,
    Confirm(ConfirmAction),
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    Delete(i64),
}

/// 新建题目表单的输入字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Question,
    Answer,
    Category,
    Difficulty,
}

impl InputField {
    pub const ALL: [InputField; 4] = [
        InputField::Question,
        InputField::Answer,
        InputField::Category,
        InputField::Difficulty,
    ];

    pub fn next(self) -> Option<InputField> {
        match self {
            InputField::Question => Some(InputField::Answer),
            InputField::Answer => Some(InputField::Category),
            InputField::Category => Some(InputField::Difficulty),
            InputField::Difficulty => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputField::Question => "题目",
            InputField::Answer => "答案",
            InputField::Category => "分类 id",
            InputField::Difficulty => "难度 (1-5)",
        }
    }
}

/// 新建题目草稿
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionDraft {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: String,
}

impl QuestionDraft {
    pub fn field(&self, field: InputField) -> &str {
        match field {
            InputField::Question => &self.question,
            InputField::Answer => &self.answer,
            InputField::Category => &self.category,
            InputField::Difficulty => &self.difficulty,
        }
    }

    pub fn field_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Question => &mut self.question,
            InputField::Answer => &mut self.answer,
            InputField::Category => &mut self.category,
            InputField::Difficulty => &mut self.difficulty,
        }
    }

    /// 四个字段都有效时返回请求体
    pub fn to_new_question(&self) -> Option<NewQuestion> {
        let question = self.question.trim();
        let answer = self.answer.trim();
        let category: i64 = self.category.trim().parse().ok()?;
        let difficulty: i64 = self.difficulty.trim().parse().ok()?;

        if question.is_empty() || answer.is_empty() || category < 1 || difficulty < 1 {
            return None;
        }

        Some(NewQuestion {
            question: question.to_string(),
            answer: answer.to_string(),
            category,
            difficulty,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// 底部提示信息
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: DateTime<Local>,
    /// 提示出现时最新的列表请求序号，之后发出的列表请求成功后清除
    pub after_listing: u64,
}

/// 应用状态
pub struct App {
    pub list: QuestionListState,
    pub focus: Focus,
    pub selected_category: usize,
    pub selected_question: usize,
    pub revealed: Option<i64>, // 显示答案的题目 id
    pub mode: AppMode,
    pub input_buffer: String,
    pub draft: QuestionDraft,
    pub input_field: InputField,
    pub notice: Option<Notice>,
    pub loading: bool,
    /// 最近一次发出的列表请求序号，更早的响应一律丢弃
    pub latest_listing: u64,
    outbox: Vec<Request>,
}

impl App {
    /// 创建新的应用实例（尚未发出任何请求）
    pub fn new() -> Self {
        Self {
            list: QuestionListState::default(),
            focus: Focus::Questions,
            selected_category: 0,
            selected_question: 0,
            revealed: None,
            mode: AppMode::Normal,
            input_buffer: String::new(),
            draft: QuestionDraft::default(),
            input_field: InputField::Question,
            notice: None,
            loading: false,
            latest_listing: 0,
            outbox: Vec::new(),
        }
    }

    /// 取出待发送的请求
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    /// 已排队但未取走的请求
    pub fn pending_requests(&self) -> &[Request] {
        &self.outbox
    }

    pub(super) fn enqueue(&mut self, request: Request) {
        self.outbox.push(request);
    }

    /// 分配新的序号并排队一个列表请求
    pub(super) fn issue_listing(&mut self, listing: Listing) {
        self.latest_listing += 1;
        self.loading = true;
        let seq = self.latest_listing;
        self.enqueue(Request::Listing { seq, listing });
    }

    pub fn set_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
            at: Local::now(),
            after_listing: self.latest_listing,
        });
    }

    /// 获取当前选中的题目
    pub fn selected_question(&self) -> Option<&Question> {
        self.list.questions.get(self.selected_question)
    }

    /// 获取当前选中的分类
    pub fn selected_category(&self) -> Option<(i64, &str)> {
        self.list.categories.nth(self.selected_category)
    }

    /// 新快照到达后保证选中索引有效
    pub(super) fn clamp_selection(&mut self) {
        self.selected_question = clamp_index(self.selected_question, self.list.questions.len());
        self.selected_category = clamp_index(self.selected_category, self.list.categories.len());
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}
