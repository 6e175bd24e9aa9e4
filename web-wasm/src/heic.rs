//! HEIC→JPEG変換（JSライブラリ heic-to 経由）

use tarot_common::{Error, JpegTranscoder, Result};
use wasm_bindgen::prelude::*;

use crate::api::js_error_message;

#[wasm_bindgen(module = "/js/heic.js")]
extern "C" {
    #[wasm_bindgen(js_name = "heicToJpeg", catch)]
    async fn heic_to_jpeg_js(data: &[u8], quality: f64) -> std::result::Result<JsValue, JsValue>;
}

/// ブラウザ内で変換する変換器
pub struct BrowserTranscoder;

impl JpegTranscoder for BrowserTranscoder {
    async fn to_jpeg(&self, heic: &[u8], quality: f32) -> Result<Vec<u8>> {
        let value = heic_to_jpeg_js(heic, f64::from(quality))
            .await
            .map_err(|e| Error::Transcode(js_error_message(&e)))?;
        Ok(js_sys::Uint8Array::new(&value).to_vec())
    }
}
