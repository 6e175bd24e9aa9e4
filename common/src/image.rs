//! 画像前処理モジュール
//!
//! - ImageFormat::sniff: 先頭バイトから形式を判定（HEIC/HEIFを含む）
//! - prepare_image: HEICはJPEGへ変換、それ以外はそのまま通す
//! - Data URLの生成と分解

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};
use crate::types::UploadedFile;

/// HEIC→JPEG変換時の品質 (0.0-1.0)
pub const JPEG_QUALITY: f32 = 0.8;

/// HEIF系コンテナのメジャーブランド
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

/// 判定した画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Heic,
}

impl ImageFormat {
    /// ファイル先頭のマジックバイトから形式を判定
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            let brand = &bytes[8..12];
            if HEIF_BRANDS.iter().any(|b| &b[..] == brand) {
                return Some(ImageFormat::Heic);
            }
        }
        None
    }

    /// 申告されたMIMEタイプ・拡張子からHEICかどうかを推定
    ///
    /// マジックバイトで判定できなかった場合の補助
    pub fn declared_heic(file_name: &str, mime_type: &str) -> bool {
        let mime = mime_type.to_lowercase();
        if mime == "image/heic" || mime == "image/heif" {
            return true;
        }
        let name = file_name.to_lowercase();
        name.ends_with(".heic") || name.ends_with(".heif")
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Heic => "image/heic",
        }
    }

    /// 一般的なブラウザでそのまま表示できない形式か
    pub fn needs_transcode(&self) -> bool {
        matches!(self, ImageFormat::Heic)
    }
}

/// HEIC→JPEG変換器
///
/// ブラウザではJSライブラリ、ネイティブでは外部コマンドが実装する
#[allow(async_fn_in_trait)]
pub trait JpegTranscoder {
    /// `quality` は 0.0-1.0
    async fn to_jpeg(&self, heic: &[u8], quality: f32) -> Result<Vec<u8>>;
}

/// 送信準備済みの画像
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    data_url: String,
}

impl PreparedImage {
    pub fn new(file_name: impl Into<String>, format: ImageFormat, bytes: Vec<u8>) -> Self {
        let data_url = to_data_url(format.mime_type(), &STANDARD.encode(&bytes));
        Self { file_name: file_name.into(), format, bytes, data_url }
    }

    /// プレビュー表示用のData URL
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// 送信用のBase64（Data URLプレフィックスを除いた部分）
    pub fn payload(&self) -> &str {
        extract_base64_from_data_url(&self.data_url).unwrap_or_default()
    }
}

/// アップロードされたファイルを送信可能な形に整える
///
/// HEICは `JPEG_QUALITY` でJPEGに変換し、それ以外の対応形式は元のバイト列のまま。
/// 判定できない形式は `Error::UnsupportedImage` で拒否する。
pub async fn prepare_image<T: JpegTranscoder>(file: UploadedFile, transcoder: &T) -> Result<PreparedImage> {
    let format = match ImageFormat::sniff(&file.bytes) {
        Some(format) => format,
        None if ImageFormat::declared_heic(&file.file_name, &file.mime_type) => ImageFormat::Heic,
        None => return Err(Error::UnsupportedImage(file.file_name)),
    };

    if !format.needs_transcode() {
        return Ok(PreparedImage::new(file.file_name, format, file.bytes));
    }

    let jpeg = transcoder.to_jpeg(&file.bytes, JPEG_QUALITY).await?;
    if ImageFormat::sniff(&jpeg) != Some(ImageFormat::Jpeg) {
        return Err(Error::Transcode("変換結果がJPEGではありません".to_string()));
    }
    Ok(PreparedImage::new(file.file_name, ImageFormat::Jpeg, jpeg))
}

/// MIMEタイプとBase64からData URLを組み立てる
pub fn to_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    if !data_url.starts_with("data:") {
        return None;
    }
    data_url.split_once(',').map(|(_, data)| data)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出できない場合は"image/jpeg"を返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .strip_prefix("data:")
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty() && !s.contains(','))
        .unwrap_or("image/jpeg")
}

/// Data URLを元のバイト列に戻す
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let data = extract_base64_from_data_url(data_url).ok_or(Error::InvalidDataUrl)?;
    STANDARD.decode(data).map_err(|_| Error::InvalidDataUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    fn heic_bytes(brand: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(brand);
        bytes.extend_from_slice(&[0x00; 8]);
        bytes
    }

    /// 呼ばれた回数を数え、固定のJPEGを返す変換器
    struct FakeTranscoder {
        calls: Cell<usize>,
        output: Vec<u8>,
    }

    impl FakeTranscoder {
        fn new(output: &[u8]) -> Self {
            Self { calls: Cell::new(0), output: output.to_vec() }
        }
    }

    impl JpegTranscoder for FakeTranscoder {
        async fn to_jpeg(&self, _heic: &[u8], quality: f32) -> Result<Vec<u8>> {
            assert_eq!(quality, JPEG_QUALITY);
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.clone())
        }
    }

    fn upload(name: &str, mime: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile { file_name: name.into(), mime_type: mime.into(), bytes: bytes.to_vec() }
    }

    // =============================================
    // 形式判定テスト
    // =============================================

    #[test]
    fn test_sniff_common_formats() {
        assert_eq!(ImageFormat::sniff(JPEG), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some(ImageFormat::Webp));
    }

    #[test]
    fn test_sniff_heif_brands() {
        for brand in [b"heic", b"heix", b"mif1", b"msf1"] {
            assert_eq!(ImageFormat::sniff(&heic_bytes(brand)), Some(ImageFormat::Heic));
        }
        // AVIFは同じISOBMFFだが対象外
        assert_eq!(ImageFormat::sniff(&heic_bytes(b"avif")), None);
    }

    #[test]
    fn test_sniff_unknown() {
        assert_eq!(ImageFormat::sniff(b""), None);
        assert_eq!(ImageFormat::sniff(b"hello world"), None);
    }

    #[test]
    fn test_declared_heic() {
        assert!(ImageFormat::declared_heic("IMG_0001.HEIC", ""));
        assert!(ImageFormat::declared_heic("card", "image/heif"));
        assert!(!ImageFormat::declared_heic("card.jpg", "image/jpeg"));
    }

    // =============================================
    // 前処理テスト
    // =============================================

    #[test]
    fn test_prepare_heic_is_transcoded_to_jpeg() {
        let transcoder = FakeTranscoder::new(JPEG);
        let prepared = block_on(prepare_image(upload("card.heic", "image/heic", &heic_bytes(b"heic")), &transcoder)).unwrap();

        assert_eq!(transcoder.calls.get(), 1);
        assert_eq!(prepared.format, ImageFormat::Jpeg);
        assert_eq!(prepared.bytes, JPEG);
        assert!(prepared.data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_prepare_passes_other_formats_unchanged() {
        let transcoder = FakeTranscoder::new(JPEG);
        for (name, bytes) in [("card.jpg", JPEG), ("card.png", PNG)] {
            let prepared = block_on(prepare_image(upload(name, "", bytes), &transcoder)).unwrap();
            assert_eq!(prepared.bytes, bytes);
            assert_eq!(decode_data_url(prepared.data_url()).unwrap(), bytes);
        }
        assert_eq!(transcoder.calls.get(), 0);
    }

    #[test]
    fn test_prepare_declared_heic_without_signature() {
        let transcoder = FakeTranscoder::new(JPEG);
        let prepared = block_on(prepare_image(upload("IMG_1.HEIC", "", b"????"), &transcoder)).unwrap();
        assert_eq!(transcoder.calls.get(), 1);
        assert_eq!(prepared.format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_prepare_rejects_unknown_format() {
        let transcoder = FakeTranscoder::new(JPEG);
        let err = block_on(prepare_image(upload("notes.txt", "text/plain", b"hello"), &transcoder)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImage(ref name) if name == "notes.txt"));
        assert_eq!(transcoder.calls.get(), 0);
    }

    #[test]
    fn test_prepare_rejects_non_jpeg_transcoder_output() {
        let transcoder = FakeTranscoder::new(PNG);
        let err = block_on(prepare_image(upload("card.heic", "", &heic_bytes(b"heic")), &transcoder)).unwrap_err();
        assert!(matches!(err, Error::Transcode(_)));
    }

    // =============================================
    // Data URLテスト
    // =============================================

    #[test]
    fn test_payload_is_data_url_without_prefix() {
        let prepared = PreparedImage::new("card.jpg", ImageFormat::Jpeg, JPEG.to_vec());
        assert_eq!(prepared.payload(), STANDARD.encode(JPEG));
        assert_eq!(
            to_data_url(prepared.format.mime_type(), prepared.payload()),
            prepared.data_url()
        );
    }

    #[test]
    fn test_data_url_roundtrip_restores_bytes() {
        let prepared = PreparedImage::new("card.png", ImageFormat::Png, PNG.to_vec());
        let rebuilt = to_data_url(extract_mime_type_from_data_url(prepared.data_url()), prepared.payload());
        assert_eq!(extract_mime_type_from_data_url(&rebuilt), "image/png");
        assert_eq!(decode_data_url(&rebuilt).unwrap(), PNG);
    }

    #[test]
    fn test_extract_base64_from_data_url() {
        assert_eq!(extract_base64_from_data_url("data:image/jpeg;base64,/9j/4AAQSkZJRg=="), Some("/9j/4AAQSkZJRg=="));
        assert_eq!(extract_base64_from_data_url("not a data url"), None);
        assert_eq!(extract_base64_from_data_url(""), None);
    }

    #[test]
    fn test_extract_mime_type() {
        assert_eq!(extract_mime_type_from_data_url("data:image/webp;base64,UklGR"), "image/webp");
        // 不正なフォーマットの場合はデフォルト値を返す
        assert_eq!(extract_mime_type_from_data_url("invalid"), "image/jpeg");
    }

    #[test]
    fn test_decode_invalid_data_url() {
        assert!(matches!(decode_data_url("plain"), Err(Error::InvalidDataUrl)));
        assert!(matches!(decode_data_url("data:image/png;base64,@@@"), Err(Error::InvalidDataUrl)));
    }
}
