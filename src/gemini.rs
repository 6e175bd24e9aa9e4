//! Gemini API連携
//!
//! プロンプトとJPEG画像1枚を1ターンのユーザーメッセージとして送り、
//! 生成テキストを返す。

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::{TarotError, Result};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// リーディングを生成するモデル
///
/// サーバーはこのトレイト越しにモデルを呼ぶ（テストではスタブに差し替える）
pub trait ReadingModel: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str, image_base64: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// エラーレスポンス（`{"error": {"message": ...}}`）
#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn build_request(prompt: &str, image_base64: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::Text { text: prompt.to_string() },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: image_base64.to_string(),
                    },
                },
            ],
        }],
    }
}

/// 最初の候補のテキストパートを連結して取り出す
fn extract_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .and_then(|c| c.into_iter().next());

    let Some(candidate) = candidate else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("blocked: {}", r))
            .unwrap_or_else(|| "empty response".to_string());
        return Err(TarotError::ApiParse(reason));
    };

    let text = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TarotError::ApiParse("empty response".to_string()));
    }
    Ok(text)
}

/// エラーボディから `error.message` を取り出す（取れなければ本文そのまま）
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<GeminiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => format!("API error: {}", status),
        Err(_) => format!("API error {}: {}", status, body),
    }
}

/// Gemini REST APIクライアント
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }

    async fn call(&self, prompt: &str, image_base64: &str) -> Result<String> {
        let request = build_request(prompt, image_base64);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| TarotError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TarotError::ApiCall(error_message(status, &body)));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| TarotError::ApiParse(e.to_string()))?;

        extract_text(parsed)
    }
}

impl ReadingModel for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str, image_base64: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.call(prompt, image_base64))
    }
}
