//! 対話式タロットリーディング（ターミナル版ウィザード）
//!
//! ブラウザ版と同じ `Wizard` / `submit_card` を使い、
//! 質問入力 → カード画像指定 → 結果表示 を繰り返す。

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};
use log::debug;
use tarot_common::{submit_card, ImageFormat, UploadRejection, UploadedFile, Wizard, WizardStep};

use crate::client::HttpReadingService;
use crate::error::{TarotError, Result};
use crate::transcode::{ensure_decodable, HeifConvert};

/// 対話式リーディング
///
/// `question` / `images` を渡した場合は最初の1回だけ入力を省略する
pub async fn run_interactive_reading(
    server: &str,
    question: Option<String>,
    images: Vec<PathBuf>,
) -> Result<()> {
    let service = HttpReadingService::new(server);
    let transcoder = HeifConvert::default();
    let mut wizard = Wizard::new();
    let mut preset_question = question;
    let mut preset_images = images;

    debug!("reading endpoint: {}", service.url());
    println!("🔮 タロット セルフリーディング\n");

    loop {
        match wizard.step() {
            WizardStep::AskQuestion => {
                let question = match preset_question.take() {
                    Some(q) => q,
                    None => prompt_text("心の中の質問は何ですか？")?,
                };
                wizard.set_question(question);
                wizard.submit_question();
            }

            WizardStep::UploadCard => {
                println!("\n🃏 実際にカードを1枚引いて、その写真を指定してください");
                let paths = if preset_images.is_empty() {
                    parse_paths(&prompt_text("カード画像のパス")?)
                } else {
                    std::mem::take(&mut preset_images)
                };

                let files = match load_card(&paths) {
                    Ok(file) => vec![file],
                    Err(e) => {
                        eprintln!("✖ {}", e);
                        continue;
                    }
                };

                let outcome = submit_card(&mut wizard, files, &transcoder, &service, |w| {
                    if w.is_loading() {
                        println!("\nカードを解釈中です...");
                    }
                })
                .await;

                if let Err(message) = outcome {
                    eprintln!("✖ {}", message);
                }
            }

            WizardStep::ShowResult => {
                println!("\n🧾 リーディング結果\n");
                println!("{}\n", wizard.reading().unwrap_or_default());

                let again = Confirm::new()
                    .with_prompt("もう一度占いますか？")
                    .default(false)
                    .interact()
                    .map_err(|e| TarotError::CliExecution(e.to_string()))?;
                if !again {
                    break;
                }
                wizard.restart();
            }
        }
    }

    Ok(())
}

fn prompt_text(prompt: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| TarotError::CliExecution(e.to_string()))
}

/// カンマ区切りのパス入力を分解
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(|s| s.trim().trim_matches('"'))
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// カード画像を1枚読み込む
///
/// 枚数は読み込み前に確認する。HEIC以外はこの時点でデコードできることを確認する
pub fn load_card(paths: &[PathBuf]) -> Result<UploadedFile> {
    if let Some(rejection) = UploadRejection::for_count(paths.len()) {
        return Err(TarotError::CliExecution(rejection.to_string()));
    }
    load_file(&paths[0])
}

fn load_file(path: &Path) -> Result<UploadedFile> {
    if !path.is_file() {
        return Err(TarotError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;

    match ImageFormat::sniff(&bytes) {
        Some(ImageFormat::Heic) | None => {}
        Some(_) => {
            let (width, height) = ensure_decodable(&bytes)?;
            debug!("{}: {}x{}", path.display(), width, height);
        }
    }

    Ok(UploadedFile {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        mime_type: String::new(),
        bytes,
    })
}
