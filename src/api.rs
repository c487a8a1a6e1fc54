//! 题库后端接口
//!
//! `TriviaApi` 抽象出后端调用，界面逻辑与测试都只依赖这个 trait。

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{NewQuestion, QuestionsPayload};

pub trait TriviaApi {
    /// `GET /questions?page=<n>`
    fn list_questions(&self, page: usize) -> Result<QuestionsPayload, ApiError>;

    /// `GET /categories/<id>/questions`
    fn questions_by_category(&self, category_id: i64) -> Result<QuestionsPayload, ApiError>;

    /// `POST /questions/search`
    fn search_questions(&self, term: &str) -> Result<QuestionsPayload, ApiError>;

    /// `DELETE /questions/<id>`
    fn delete_question(&self, id: i64) -> Result<(), ApiError>;

    /// `POST /questions`
    fn create_question(&self, question: &NewQuestion) -> Result<(), ApiError>;
}

/// 基于 reqwest 阻塞客户端的实现，在后台线程中使用
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("trivia-browser/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send()?;
        let status = response.status();
        let url = response.url().to_string();
        debug!("{} -> {}", url, status);

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    fn fetch_list(&self, request: RequestBuilder) -> Result<QuestionsPayload, ApiError> {
        let body = self.send(request)?;
        decode_payload(&body)
    }

    fn json_body(
        request: RequestBuilder,
        body: &impl serde::Serialize,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(request
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?))
    }
}

impl TriviaApi for HttpApi {
    fn list_questions(&self, page: usize) -> Result<QuestionsPayload, ApiError> {
        let request = self
            .client
            .get(self.url("/questions"))
            .query(&[("page", page)]);
        self.fetch_list(request)
    }

    fn questions_by_category(&self, category_id: i64) -> Result<QuestionsPayload, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/categories/{category_id}/questions")));
        self.fetch_list(request)
    }

    fn search_questions(&self, term: &str) -> Result<QuestionsPayload, ApiError> {
        let request = Self::json_body(
            self.client.post(self.url("/questions/search")),
            &serde_json::json!({ "searchTerm": term }),
        )?;
        self.fetch_list(request)
    }

    fn delete_question(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&format!("/questions/{id}"))))?;
        Ok(())
    }

    fn create_question(&self, question: &NewQuestion) -> Result<(), ApiError> {
        let request = Self::json_body(self.client.post(self.url("/questions")), question)?;
        self.send(request)?;
        Ok(())
    }
}

/// 空响应体按“全部字段缺失”处理
fn decode_payload(body: &[u8]) -> Result<QuestionsPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(QuestionsPayload::default());
    }
    Ok(serde_json::from_slice(body)?)
}
