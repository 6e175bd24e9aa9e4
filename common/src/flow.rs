//! カード送信フロー
//!
//! 件数チェック → 画像前処理 → プレビュー表示 → リーディングAPI呼び出し。
//! ブラウザ版とCLI版の両方がこの順序でウィザードを進める。

use crate::error::user_message;
use crate::image::{prepare_image, JpegTranscoder};
use crate::prompts::build_reading_prompt;
use crate::types::{ReadingRequest, UploadedFile};
use crate::wizard::{UploadRejection, Wizard};

/// リーディングAPIの呼び出し口
///
/// 失敗時はユーザーに見せられるメッセージを返す
#[allow(async_fn_in_trait)]
pub trait ReadingService {
    async fn request_reading(&self, request: &ReadingRequest) -> Result<String, String>;
}

/// アップロードされたカードを送信してウィザードを進める
///
/// 状態が変わるたびに `notify` を呼ぶ（UI反映用）。
/// 失敗時はウィザードをアップロード画面に戻し、通知用メッセージを返す。
pub async fn submit_card<T, S, F>(
    wizard: &mut Wizard,
    files: Vec<UploadedFile>,
    transcoder: &T,
    service: &S,
    mut notify: F,
) -> Result<(), String>
where
    T: JpegTranscoder,
    S: ReadingService,
    F: FnMut(&Wizard),
{
    if let Err(rejection) = wizard.start_submission(files.len()) {
        return Err(rejection.to_string());
    }
    notify(&*wizard);

    match files.into_iter().next() {
        Some(file) => process_card(wizard, file, transcoder, service, notify).await,
        None => {
            wizard.fail();
            notify(&*wizard);
            Err(UploadRejection::NoFile.to_string())
        }
    }
}

/// 送信受付済み（`Wizard::start_submission` 済み）のカードを処理する
///
/// ファイル読み込みを非同期で行うUIは、受付だけ先に同期的に済ませてからこれを呼ぶ
pub async fn process_card<T, S, F>(
    wizard: &mut Wizard,
    file: UploadedFile,
    transcoder: &T,
    service: &S,
    mut notify: F,
) -> Result<(), String>
where
    T: JpegTranscoder,
    S: ReadingService,
    F: FnMut(&Wizard),
{
    match run_submission(wizard, file, transcoder, service, &mut notify).await {
        Ok(reading) => {
            wizard.finish(reading);
            notify(&*wizard);
            Ok(())
        }
        Err(message) => {
            wizard.fail();
            notify(&*wizard);
            Err(failure_message(&message))
        }
    }
}

/// 送信失敗時の通知文言
pub fn failure_message(raw: &str) -> String {
    format!("カードの解釈中にエラーが発生しました: {}", user_message(raw))
}

async fn run_submission<T, S, F>(
    wizard: &mut Wizard,
    file: UploadedFile,
    transcoder: &T,
    service: &S,
    notify: &mut F,
) -> Result<String, String>
where
    T: JpegTranscoder,
    S: ReadingService,
    F: FnMut(&Wizard),
{
    let prepared = prepare_image(file, transcoder)
        .await
        .map_err(|e| e.to_string())?;

    wizard.show_preview(prepared.data_url());
    notify(&*wizard);

    let request = ReadingRequest {
        prompt: build_reading_prompt(wizard.question()),
        image: prepared.payload().to_string(),
    };
    service.request_reading(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::wizard::WizardStep;
    use futures::executor::block_on;
    use std::cell::RefCell;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    struct NoTranscode;

    impl JpegTranscoder for NoTranscode {
        async fn to_jpeg(&self, _heic: &[u8], _quality: f32) -> Result<Vec<u8>> {
            Err(Error::Transcode("unused".into()))
        }
    }

    /// 受け取ったリクエストを記録して固定の結果を返すスタブ
    struct StubService {
        outcome: std::result::Result<String, String>,
        requests: RefCell<Vec<ReadingRequest>>,
    }

    impl StubService {
        fn returning(outcome: std::result::Result<&str, &str>) -> Self {
            Self {
                outcome: outcome.map(str::to_string).map_err(str::to_string),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReadingService for StubService {
        async fn request_reading(&self, request: &ReadingRequest) -> std::result::Result<String, String> {
            self.requests.borrow_mut().push(request.clone());
            self.outcome.clone()
        }
    }

    fn card() -> UploadedFile {
        UploadedFile { file_name: "card.jpg".into(), mime_type: "image/jpeg".into(), bytes: JPEG.to_vec() }
    }

    fn wizard_at_upload(question: &str) -> Wizard {
        let mut wizard = Wizard::new();
        wizard.set_question(question);
        assert!(wizard.submit_question());
        wizard
    }

    #[test]
    fn test_three_steps_then_restart() {
        let service = StubService::returning(Ok("Sample reading"));
        let mut wizard = wizard_at_upload("恋愛運は？");
        let mut seen = Vec::new();

        block_on(submit_card(&mut wizard, vec![card()], &NoTranscode, &service, |w| seen.push(w.clone()))).unwrap();

        assert_eq!(wizard.step(), WizardStep::ShowResult);
        assert_eq!(wizard.reading(), Some("Sample reading"));
        let preview = wizard.preview().unwrap();
        assert!(preview.starts_with("data:image/jpeg;base64,"));
        assert_eq!(crate::image::decode_data_url(preview).unwrap(), JPEG);

        // 応答前に読み込み中の結果画面を経由している
        assert!(seen.iter().any(|w| w.is_loading()));

        let requests = service.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("恋愛運は？"));
        assert!(!requests[0].image.starts_with("data:"));

        wizard.restart();
        assert_eq!(wizard, Wizard::new());
        assert_eq!(wizard.question(), "");
    }

    #[test]
    fn test_wrong_file_count_never_calls_service() {
        let service = StubService::returning(Ok("unused"));
        for files in [vec![], vec![card(), card()]] {
            let mut wizard = wizard_at_upload("質問");
            let message = block_on(submit_card(&mut wizard, files, &NoTranscode, &service, |_| {})).unwrap_err();
            assert!(!message.is_empty());
            assert_eq!(wizard.step(), WizardStep::UploadCard);
            assert!(!wizard.is_submitting());
        }
        assert!(service.requests.borrow().is_empty());
    }

    #[test]
    fn test_service_failure_returns_to_upload() {
        let service = StubService::returning(Err("quota exceeded"));
        let mut wizard = wizard_at_upload("金運は？");

        let message = block_on(submit_card(&mut wizard, vec![card()], &NoTranscode, &service, |_| {})).unwrap_err();

        assert!(message.contains("quota exceeded"));
        assert_eq!(wizard.step(), WizardStep::UploadCard);
        assert_eq!(wizard.question(), "金運は？");
    }

    #[test]
    fn test_service_failure_without_message_uses_fallback() {
        let service = StubService::returning(Err(""));
        let mut wizard = wizard_at_upload("質問");
        let message = block_on(submit_card(&mut wizard, vec![card()], &NoTranscode, &service, |_| {})).unwrap_err();
        assert!(message.contains(crate::error::GENERIC_FAILURE_MESSAGE));
    }

    #[test]
    fn test_process_card_after_synchronous_start() {
        let service = StubService::returning(Ok("Sample reading"));
        let mut wizard = wizard_at_upload("質問");
        wizard.start_submission(1).unwrap();

        block_on(process_card(&mut wizard, card(), &NoTranscode, &service, |_| {})).unwrap();

        assert_eq!(wizard.reading(), Some("Sample reading"));
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn test_preprocess_failure_returns_to_upload() {
        let service = StubService::returning(Ok("unused"));
        let mut wizard = wizard_at_upload("質問");
        let broken = UploadedFile { file_name: "card.heic".into(), mime_type: "image/heic".into(), bytes: vec![1, 2, 3] };

        let message = block_on(submit_card(&mut wizard, vec![broken], &NoTranscode, &service, |_| {})).unwrap_err();

        assert!(message.contains("HEIC変換"));
        assert_eq!(wizard.step(), WizardStep::UploadCard);
        assert!(service.requests.borrow().is_empty());
    }
}
