//! 解釈中インジケーター

use leptos::prelude::*;
use tarot_common::Wizard;

/// 解釈待ちの表示（変換済みならカード画像も出す）
#[component]
pub fn Loading(wizard: RwSignal<Wizard>) -> impl IntoView {
    let preview = move || wizard.with(|w| w.preview().map(str::to_string));

    view! {
        <div class="loading">
            <p class="step-title">"カードを解釈しています..."</p>
            {move || preview().map(|src| view! {
                <img src=src alt="タロットカード" class="card-image" />
            })}
            <div class="spinner" />
        </div>
    }
}
