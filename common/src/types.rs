//! 共通型定義
//!
//! リーディングAPIのリクエスト/レスポンスと、アップロードされたファイル

use serde::{Deserialize, Deserializer, Serialize};

/// リーディングAPIのパス
pub const READING_ENDPOINT: &str = "/api/reading";

/// リーディングAPIリクエスト
///
/// 欠けたフィールドと `null` は空文字として受け取り、検証で400にする
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingRequest {
    /// 質問を埋め込んだプロンプト
    #[serde(deserialize_with = "null_as_empty")]
    pub prompt: String,
    /// Base64エンコードされた画像（Data URLプレフィックスなし）
    #[serde(deserialize_with = "null_as_empty")]
    pub image: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReadingRequest {
    /// 検証エラーがあればその理由を返す
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.prompt.trim().is_empty() {
            return Some("プロンプトが空です。");
        }
        if self.image.is_empty() {
            return Some("画像が空です。");
        }
        None
    }
}

/// リーディングAPIレスポンス（成功時）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingResponse {
    pub reading: String,
}

/// リーディングAPIレスポンス（失敗時）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), detail: None }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { error: error.into(), detail: Some(detail.into()) }
    }

    /// ユーザー表示用の1行メッセージ
    pub fn message(&self) -> String {
        match &self.detail {
            Some(detail) if !detail.is_empty() => format!("{} ({})", self.error, detail),
            _ => self.error.clone(),
        }
    }
}

/// ユーザーが選択したファイル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    /// ブラウザ/OSが申告したMIMEタイプ（空のこともある）
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
