//! 测试用的内存后端
//!
//! 按请求记录调用，返回由题目总数生成的数据。

use std::sync::{Arc, Mutex};

use crate::api::TriviaApi;
use crate::error::ApiError;
use crate::models::{Categories, NewQuestion, Question, QuestionsPayload};
use crate::pagination::PAGE_SIZE;

#[derive(Clone, Default)]
pub struct FakeApi {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    questions: Vec<Question>,
    categories: Categories,
    failing: bool,
}

impl FakeApi {
    /// 生成 `total` 道题，分类在 1..=3 之间轮换
    pub fn with_total(total: usize) -> Self {
        let api = Self::default();
        {
            let mut state = api.inner.lock().unwrap();
            state.categories = sample_categories();
            state.questions = (1..=total as i64).map(sample_question).collect();
        }
        api
    }

    /// 之后的所有请求都返回 500
    pub fn fail_all(&self) {
        self.inner.lock().unwrap().failing = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(call.clone());
        if state.failing {
            return Err(ApiError::Status {
                status: 500,
                url: call,
            });
        }
        Ok(state)
    }
}

impl TriviaApi for FakeApi {
    fn list_questions(&self, page: usize) -> Result<QuestionsPayload, ApiError> {
        let state = self.record(format!("GET /questions?page={page}"))?;
        let start = (page.max(1) - 1) * PAGE_SIZE;
        Ok(QuestionsPayload {
            questions: state.questions.iter().skip(start).take(PAGE_SIZE).cloned().collect(),
            total_questions: state.questions.len(),
            categories: Some(state.categories.clone()),
            current_category: None,
        })
    }

    fn questions_by_category(&self, category_id: i64) -> Result<QuestionsPayload, ApiError> {
        let state = self.record(format!("GET /categories/{category_id}/questions"))?;
        let matching: Vec<Question> = state
            .questions
            .iter()
            .filter(|q| q.category == category_id)
            .cloned()
            .collect();
        Ok(QuestionsPayload {
            total_questions: matching.len(),
            questions: matching.into_iter().take(PAGE_SIZE).collect(),
            categories: None,
            current_category: state.categories.get(category_id).map(str::to_string),
        })
    }

    fn search_questions(&self, term: &str) -> Result<QuestionsPayload, ApiError> {
        let state = self.record(format!("POST /questions/search {term}"))?;
        let needle = term.to_lowercase();
        let matching: Vec<Question> = state
            .questions
            .iter()
            .filter(|q| q.question.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(QuestionsPayload {
            total_questions: matching.len(),
            questions: matching.into_iter().take(PAGE_SIZE).collect(),
            categories: None,
            current_category: None,
        })
    }

    fn delete_question(&self, id: i64) -> Result<(), ApiError> {
        let mut state = self.record(format!("DELETE /questions/{id}"))?;
        state.questions.retain(|q| q.id != id);
        Ok(())
    }

    fn create_question(&self, question: &NewQuestion) -> Result<(), ApiError> {
        let mut state = self.record(format!("POST /questions {}", question.question))?;
        let id = state.questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        state.questions.push(Question {
            id,
            question: question.question.clone(),
            answer: question.answer.clone(),
            category: question.category,
            difficulty: question.difficulty,
        });
        Ok(())
    }
}

pub fn sample_categories() -> Categories {
    [
        (1, "Science".to_string()),
        (2, "Art".to_string()),
        (3, "Geography".to_string()),
    ]
    .into_iter()
    .collect()
}

pub fn sample_question(id: i64) -> Question {
    Question {
        id,
        question: format!("Question number {id}?"),
        answer: format!("Answer {id}"),
        category: (id - 1) % 3 + 1,
        difficulty: (id - 1) % 5 + 1,
    }
}

pub fn sample_payload(count: usize, total: usize) -> QuestionsPayload {
    QuestionsPayload {
        questions: (1..=count as i64).map(sample_question).collect(),
        total_questions: total,
        categories: Some(sample_categories()),
        current_category: None,
    }
}
