//! Tarot Reading Common Library
//!
//! サーバー・CLI・Web(WASM)で共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod image;
pub mod prompts;
pub mod wizard;
pub mod flow;

pub use types::{ErrorResponse, ReadingRequest, ReadingResponse, UploadedFile, READING_ENDPOINT};
pub use error::{Error, Result, user_message};
pub use image::{
    ImageFormat, JpegTranscoder, PreparedImage, JPEG_QUALITY,
    decode_data_url, extract_base64_from_data_url, extract_mime_type_from_data_url, prepare_image,
    to_data_url,
};
pub use prompts::build_reading_prompt;
pub use wizard::{UploadRejection, Wizard, WizardStep};
pub use flow::{ReadingService, failure_message, process_card, submit_card};
