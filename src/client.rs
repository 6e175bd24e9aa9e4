//! リーディングAPIクライアント（CLI用）

use tarot_common::{ErrorResponse, ReadingRequest, ReadingResponse, ReadingService, READING_ENDPOINT};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

/// 起動中のサーバーへ `POST /api/reading` する
pub struct HttpReadingService {
    http: reqwest::Client,
    url: String,
}

impl HttpReadingService {
    pub fn new(server: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}{}", server.trim_end_matches('/'), READING_ENDPOINT),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReadingService for HttpReadingService {
    async fn request_reading(&self, request: &ReadingRequest) -> Result<String, String> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            return Err(failure_message(status, &body));
        }

        serde_json::from_str::<ReadingResponse>(&body)
            .map(|r| r.reading)
            .map_err(|e| format!("レスポンスの解析に失敗しました: {}", e))
    }
}

fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message())
        .unwrap_or_else(|_| format!("API要求に失敗しました ({})", status))
}
