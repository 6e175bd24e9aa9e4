//! プロンプト生成モジュール
//!
//! CLIとWeb(WASM)で共有されるリーディング用プロンプト

/// 1枚引きリーディング用プロンプト生成
///
/// # Arguments
/// * `question` - ユーザーの質問（前後の空白は除去される）
pub fn build_reading_prompt(question: &str) -> String {
    format!(
        r#"ユーザーがタロットカードを1枚引きました。
ユーザーの質問:
「{question}」

画像のカードの意味を、この質問の文脈に沿って詳しく解釈してください。
できるだけ前向きで希望の持てるメッセージで答えてください。"#,
        question = question.trim()
    )
}
