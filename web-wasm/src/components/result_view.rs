//! リーディング結果コンポーネント

use leptos::prelude::*;
use tarot_common::Wizard;

#[component]
pub fn ResultView(wizard: RwSignal<Wizard>) -> impl IntoView {
    let preview = move || wizard.with(|w| w.preview().unwrap_or_default().to_string());
    let reading = move || wizard.with(|w| w.reading().unwrap_or_default().to_string());

    view! {
        <div class="result-step">
            <h2 class="step-title">"🧾 リーディング結果"</h2>
            <Show when=move || wizard.with(|w| w.reading().is_some())>
                <div class="card result-card">
                    <img src=preview alt="タロットカード" class="card-image" />
                    <p class="reading">{reading}</p>
                </div>
            </Show>
            <div class="actions">
                <button class="primary" on:click=move |_| wizard.update(|w| w.restart())>
                    "最初からやり直す"
                </button>
            </div>
        </div>
    }
}
