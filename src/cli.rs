use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::DEFAULT_SERVER;

#[derive(Parser)]
#[command(name = "tarot")]
#[command(about = "タロットカード1枚引きのAIリーディング", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// リーディングAPIサーバーを起動
    Serve {
        /// 待ち受けアドレス（デフォルト: 設定ファイルの値）
        #[arg(short, long)]
        bind: Option<String>,

        /// Geminiモデル名
        #[arg(short, long)]
        model: Option<String>,

        /// ビルド済みWebアプリのディレクトリ
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// ターミナルで対話的に占う
    Ask {
        /// 起動中のサーバーURL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,

        /// 質問（省略時は対話入力）
        #[arg(short, long)]
        question: Option<String>,

        /// カード画像（省略時は対話入力）
        images: Vec<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
