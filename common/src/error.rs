//! エラー型定義

use thiserror::Error;

/// クライアント側で原因メッセージが取れなかった場合の文言
pub const GENERIC_FAILURE_MESSAGE: &str = "不明なエラーが発生しました。";

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("対応していない画像形式です: {0}")]
    UnsupportedImage(String),

    #[error("HEIC変換に失敗しました: {0}")]
    Transcode(String),

    #[error("Data URLが不正です")]
    InvalidDataUrl,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// 任意の失敗メッセージをユーザー向け文言に整える
///
/// 空文字（空白のみ含む）の場合は汎用メッセージにフォールバックする
pub fn user_message(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("設定ファイルが見つかりません".to_string());
        assert_eq!(format!("{}", error), "Config error: 設定ファイルが見つかりません");
    }

    #[test]
    fn test_error_display_unsupported_image() {
        let error = Error::UnsupportedImage("card.txt".to_string());
        let display = format!("{}", error);
        assert!(display.contains("対応していない画像形式"));
        assert!(display.contains("card.txt"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_user_message_passthrough() {
        assert_eq!(user_message("API要求に失敗しました"), "API要求に失敗しました");
        assert_eq!(user_message("  timeout \n"), "timeout");
    }

    #[test]
    fn test_user_message_fallback() {
        assert_eq!(user_message(""), GENERIC_FAILURE_MESSAGE);
        assert_eq!(user_message("   "), GENERIC_FAILURE_MESSAGE);
    }
}
