use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// 题目（由后端持有，客户端只缓存当前页/筛选结果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(deserialize_with = "lenient_id")]
    pub category: i64,
    #[serde(default)]
    pub difficulty: i64,
}

/// 分类表: id -> 名称，按 id 排序以保证渲染顺序稳定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categories(BTreeMap<i64, String>);

impl Categories {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, id: i64) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    /// 第 index 个分类（按 id 顺序）
    pub fn nth(&self, index: usize) -> Option<(i64, &str)> {
        self.iter().nth(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.0.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(i64, String)> for Categories {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Categories {
    /// JSON 对象的键是字符串，非数字键直接忽略
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, name)| key.trim().parse::<i64>().ok().map(|id| (id, name)))
            .collect())
    }
}

/// 列表类接口的响应体，缺失字段取空集合 / 0 / null
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuestionsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_questions: usize,
    /// 只有 `GET /questions` 会返回
    #[serde(default)]
    pub categories: Option<Categories>,
    #[serde(default, deserialize_with = "label")]
    pub current_category: Option<String>,
}

/// 新建题目的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrText {
    Id(i64),
    Text(String),
}

/// 分类 id 既可能是数字也可能是数字字符串
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match IdOrText::deserialize(deserializer)? {
        IdOrText::Id(id) => Ok(id),
        IdOrText::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<IdOrText>::deserialize(deserializer)? {
        Some(IdOrText::Id(id)) => Some(id.to_string()),
        Some(IdOrText::Text(text)) => Some(text),
        None => None,
    })
}
