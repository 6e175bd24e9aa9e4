//! タロット セルフリーディング
//!
//! リーディングAPIサーバーとターミナル版ウィザード

pub mod ask;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod server;
pub mod transcode;
