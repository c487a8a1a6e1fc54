//! 分页计算
//!
//! 每页固定 10 题，页码从 1 开始

/// 每页题目数
pub const PAGE_SIZE: usize = 10;

/// 页码按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    pub number: usize,
    pub active: bool,
}

/// 总页数 = ceil(total / PAGE_SIZE)
pub fn page_count(total_questions: usize) -> usize {
    total_questions.div_ceil(PAGE_SIZE)
}

/// 生成 1..=page_count 的页码按钮，与当前页相同的标记为 active
pub fn page_controls(total_questions: usize, current_page: usize) -> Vec<PageControl> {
    (1..=page_count(total_questions))
        .map(|number| PageControl {
            number,
            active: number == current_page,
        })
        .collect()
}
