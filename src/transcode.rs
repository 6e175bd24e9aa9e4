//! ネイティブ環境のHEIC→JPEG変換
//!
//! libheif付属の `heif-convert` コマンドを呼び出す。
//! 変換結果と通常画像は `image` クレートでデコードできるか確認する。

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tarot_common::JpegTranscoder;
use tokio::process::Command;

use crate::error::{TarotError, Result};

/// `heif-convert` を使う変換器
pub struct HeifConvert {
    program: String,
}

impl Default for HeifConvert {
    fn default() -> Self {
        Self { program: "heif-convert".to_string() }
    }
}

impl HeifConvert {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    async fn convert(&self, heic: &[u8], quality: f32) -> Result<Vec<u8>> {
        let temp_dir = temp_dir().await?;
        let jpeg = self.convert_in(&temp_dir, heic, quality).await;
        remove_temp_dir(&temp_dir).await;
        let jpeg = jpeg?;

        let (width, height) = ensure_decodable(&jpeg)?;
        debug!("HEIC変換完了: {}x{}, {} bytes", width, height, jpeg.len());
        Ok(jpeg)
    }

    async fn convert_in(&self, dir: &Path, heic: &[u8], quality: f32) -> Result<Vec<u8>> {
        let input = dir.join("card.heic");
        let output = dir.join("card.jpg");
        tokio::fs::write(&input, heic).await?;

        self.run(&input, &output, jpeg_quality(quality)).await?;
        Ok(tokio::fs::read(&output).await?)
    }

    async fn run(&self, input: &Path, output: &Path, quality: u8) -> Result<()> {
        let out = Command::new(&self.program)
            .arg("-q")
            .arg(quality.to_string())
            .arg(input)
            .arg(output)
            .output()
            .await
            .map_err(|e| TarotError::Transcode(format!("{} を実行できません: {}", self.program, e)))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(TarotError::Transcode(format!(
                "{} failed (code {:?}): {}",
                self.program,
                out.status.code(),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl JpegTranscoder for HeifConvert {
    async fn to_jpeg(&self, heic: &[u8], quality: f32) -> tarot_common::Result<Vec<u8>> {
        self.convert(heic, quality)
            .await
            .map_err(|e| tarot_common::Error::Transcode(e.detail()))
    }
}

/// 0.0-1.0 の品質を `heif-convert -q` の 0-100 に変換
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// 画像としてデコードできるか確認し、サイズを返す
pub fn ensure_decodable(bytes: &[u8]) -> Result<(u32, u32)> {
    let img = image::load_from_memory(bytes).map_err(|e| TarotError::ImageLoad(e.to_string()))?;
    Ok((img.width(), img.height()))
}

async fn temp_dir() -> Result<PathBuf> {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("tarot-heic-{}-{}", std::process::id(), nanos));
    tokio::fs::create_dir_all(&dir).await?;
    Ok(dir)
}

/// 作業ディレクトリを削除（失敗しても変換結果には影響させない）
async fn remove_temp_dir(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        warn!("一時ディレクトリを削除できません: {}: {}", dir.display(), e);
    }
}
