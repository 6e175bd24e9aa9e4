//! ウィザード状態機械
//!
//! 質問入力 → カード画像アップロード → 結果表示 の3ステップ。
//! 戻り遷移は「最初から」（常に質問入力へ）と、失敗時の結果表示→アップロードのみ。

use std::fmt;

/// ウィザードのステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    AskQuestion,
    UploadCard,
    ShowResult,
}

impl WizardStep {
    /// 遷移表
    pub fn can_transition_to(self, next: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, next),
            (AskQuestion, UploadCard)
                | (UploadCard, ShowResult)
                | (ShowResult, UploadCard)
                | (_, AskQuestion)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::AskQuestion => "ask-question",
            WizardStep::UploadCard => "upload-card",
            WizardStep::ShowResult => "show-result",
        }
    }

    /// 画面名（ユーザー表示用）
    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::AskQuestion => "質問入力",
            WizardStep::UploadCard => "カードアップロード",
            WizardStep::ShowResult => "リーディング結果",
        }
    }
}

/// アップロード送信の拒否理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    NoFile,
    TooManyFiles(usize),
    /// 送信中の二重送信
    Busy,
    /// アップロード画面以外からの送信
    WrongStep(WizardStep),
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::NoFile => write!(f, "カードをアップロードしてください。"),
            UploadRejection::TooManyFiles(_) => write!(f, "カードは正確に1枚だけアップロードしてください。"),
            UploadRejection::Busy => write!(f, "カードを解釈中です。しばらくお待ちください。"),
            UploadRejection::WrongStep(step) => write!(f, "{}画面では送信できません。", step.label()),
        }
    }
}

impl std::error::Error for UploadRejection {}

impl UploadRejection {
    /// 枚数だけで決まる拒否理由（ちょうど1枚なら `None`）
    pub fn for_count(file_count: usize) -> Option<UploadRejection> {
        match file_count {
            0 => Some(UploadRejection::NoFile),
            1 => None,
            n => Some(UploadRejection::TooManyFiles(n)),
        }
    }
}

/// ウィザード全体の状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wizard {
    step: WizardStep,
    question: String,
    preview: Option<String>,
    reading: Option<String>,
    submitting: bool,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// プレビュー用Data URL
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn reading(&self) -> Option<&str> {
        self.reading.as_deref()
    }

    /// 送信ボタンを無効化すべきか
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// 結果画面で応答待ち
    pub fn is_loading(&self) -> bool {
        self.step == WizardStep::ShowResult && self.submitting
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        if self.step == WizardStep::AskQuestion {
            self.question = question.into();
        }
    }

    /// 質問を確定してアップロードへ進む
    ///
    /// 空白のみの質問では何もせず false を返す
    pub fn submit_question(&mut self) -> bool {
        if self.step != WizardStep::AskQuestion || self.question.trim().is_empty() {
            return false;
        }
        self.go(WizardStep::UploadCard);
        true
    }

    /// アップロード送信を受け付ける
    ///
    /// ファイル数がちょうど1のときだけ送信中になる。拒否時は状態を変えない。
    pub fn start_submission(&mut self, file_count: usize) -> Result<(), UploadRejection> {
        if self.step != WizardStep::UploadCard {
            return Err(UploadRejection::WrongStep(self.step));
        }
        if self.submitting {
            return Err(UploadRejection::Busy);
        }
        if let Some(rejection) = UploadRejection::for_count(file_count) {
            return Err(rejection);
        }
        self.submitting = true;
        self.reading = None;
        Ok(())
    }

    /// 画像の準備ができたら結果画面（読み込み中）へ
    pub fn show_preview(&mut self, data_url: impl Into<String>) {
        if self.step != WizardStep::UploadCard || !self.submitting {
            return;
        }
        self.preview = Some(data_url.into());
        self.go(WizardStep::ShowResult);
    }

    /// リーディング結果を受け取る
    pub fn finish(&mut self, reading: impl Into<String>) {
        if !self.is_loading() {
            return;
        }
        self.reading = Some(reading.into());
        self.submitting = false;
    }

    /// 失敗したらアップロードへ戻る（質問は保持）
    pub fn fail(&mut self) {
        if !self.submitting {
            return;
        }
        self.submitting = false;
        self.preview = None;
        self.reading = None;
        if self.step == WizardStep::ShowResult {
            self.go(WizardStep::UploadCard);
        }
    }

    /// 最初から
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    fn go(&mut self, next: WizardStep) {
        debug_assert!(
            self.step.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.step,
            next
        );
        self.step = next;
    }
}
