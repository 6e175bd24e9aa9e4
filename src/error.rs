use thiserror::Error;

/// 失敗理由が取り出せなかったときの詳細文字列
pub const UNKNOWN_DETAIL: &str = "unknown";

#[derive(Error, Debug)]
pub enum TarotError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 GEMINI_API_KEY を設定するか `tarot config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HEIC変換エラー: {0}")]
    Transcode(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("サーバーエラー: {0}")]
    Server(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] tarot_common::Error),
}

impl TarotError {
    /// レスポンスの `detail` に載せる文字列
    ///
    /// 外部由来のメッセージはそのまま返し、空なら `UNKNOWN_DETAIL`
    pub fn detail(&self) -> String {
        let message = match self {
            TarotError::ApiCall(m)
            | TarotError::ApiParse(m)
            | TarotError::Transcode(m)
            | TarotError::Server(m) => m.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            UNKNOWN_DETAIL.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, TarotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_uses_inner_message() {
        assert_eq!(TarotError::ApiCall("quota exceeded".into()).detail(), "quota exceeded");
        assert_eq!(TarotError::ApiParse("empty response".into()).detail(), "empty response");
    }

    #[test]
    fn test_detail_fallback() {
        assert_eq!(TarotError::ApiCall(String::new()).detail(), UNKNOWN_DETAIL);
        assert_eq!(TarotError::Server("  ".into()).detail(), UNKNOWN_DETAIL);
    }

    #[test]
    fn test_detail_other_variants_use_display() {
        let detail = TarotError::MissingApiKey.detail();
        assert!(detail.contains("GEMINI_API_KEY"));
    }
}
