//! サーバーAPI呼び出し

pub mod reading;

use wasm_bindgen::{JsCast, JsValue};

/// JS例外を表示用の文字列に変換
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
