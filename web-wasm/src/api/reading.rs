//! リーディングAPIクライアント（同一オリジンの /api/reading）

use tarot_common::{ErrorResponse, ReadingRequest, ReadingResponse, ReadingService, READING_ENDPOINT};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::js_error_message;

/// 失敗応答を読めなかった場合のメッセージ
const REQUEST_FAILED: &str = "API要求に失敗しました";

/// ページと同じオリジンのサーバーへ問い合わせる
#[derive(Debug, Clone, Default)]
pub struct ApiReadingService;

impl ReadingService for ApiReadingService {
    async fn request_reading(&self, request: &ReadingRequest) -> Result<String, String> {
        let (ok, body) = post_json(READING_ENDPOINT, request)
            .await
            .map_err(|e| js_error_message(&e))?;
        parse_reading_body(ok, &body)
    }
}

async fn post_json(url: &str, request: &ReadingRequest) -> Result<(bool, String), JsValue> {
    let body = serde_json::to_string(request)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::SameOrigin);
    opts.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    let text = JsFuture::from(resp.text()?).await?;
    Ok((resp.ok(), text.as_string().unwrap_or_default()))
}

/// 応答本文を解釈結果またはエラーメッセージに変換
fn parse_reading_body(ok: bool, body: &str) -> Result<String, String> {
    if !ok {
        return Err(serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.message())
            .unwrap_or_else(|_| REQUEST_FAILED.to_string()));
    }

    serde_json::from_str::<ReadingResponse>(body)
        .map(|r| r.reading)
        .map_err(|e| format!("応答の解析に失敗しました: {}", e))
}
