//! リーディングAPIサーバー
//!
//! `POST /api/reading` の1エンドポイントのみ。状態は共有のモデルクライアントだけ。

use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use tower_http::services::ServeDir;

use tarot_common::{ErrorResponse, ReadingRequest, ReadingResponse, READING_ENDPOINT};

use crate::config::Config;
use crate::error::{TarotError, Result};
use crate::gemini::ReadingModel;

/// 500応答の `error` フィールド
pub const PROVIDER_FAILURE: &str = "Gemini API要求に失敗しました";

#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn ReadingModel>,
}

/// ルーターを構築
///
/// `static_dir` があればビルド済みWebアプリをそれ以外のパスで配信する
pub fn router(model: Arc<dyn ReadingModel>, body_limit: usize, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route(READING_ENDPOINT, post(create_reading))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(AppState { model });

    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}

/// 設定に従って待ち受けを開始
pub async fn serve(config: &Config, model: Arc<dyn ReadingModel>) -> Result<()> {
    if let Some(dir) = &config.static_dir {
        if !dir.is_dir() {
            return Err(TarotError::FileNotFound(dir.display().to_string()));
        }
    }

    let app = router(model, config.body_limit_bytes, config.static_dir.as_deref());
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| TarotError::Server(format!("{} にバインドできません: {}", config.bind, e)))?;

    info!("listening on http://{}", config.bind);
    if let Some(dir) = &config.static_dir {
        info!("serving web app from {}", dir.display());
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn create_reading(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReadingRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_body(rejection),
    };

    if let Some(reason) = request.validation_error() {
        warn!("invalid reading request: {}", reason);
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))).into_response();
    }

    info!(
        "reading request: prompt {} chars, image {} bytes (base64)",
        request.prompt.chars().count(),
        request.image.len()
    );

    match state.model.generate(&request.prompt, &request.image).await {
        Ok(reading) => (StatusCode::OK, Json(ReadingResponse { reading })).into_response(),
        Err(e) => provider_failure(&e),
    }
}

fn provider_failure(err: &TarotError) -> Response {
    error!("reading failed: {}", err);
    let body = ErrorResponse::with_detail(PROVIDER_FAILURE, err.detail());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// JSONとして読めなかったボディ
///
/// サイズ超過だけは413、それ以外はプロバイダ失敗と同じ500で返す
fn rejected_body(rejection: JsonRejection) -> Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("request body too large: {}", rejection.body_text());
        let body = ErrorResponse::with_detail("リクエストが大きすぎます", rejection.body_text());
        return (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response();
    }
    provider_failure(&TarotError::Server(rejection.body_text()))
}
