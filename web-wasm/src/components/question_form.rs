//! 質問入力コンポーネント

use leptos::prelude::*;
use tarot_common::Wizard;

#[component]
pub fn QuestionForm(wizard: RwSignal<Wizard>) -> impl IntoView {
    // 空白のみの質問では進まない
    let submit = move || {
        wizard.update(|w| {
            w.submit_question();
        });
    };

    view! {
        <div class="card question-step">
            <p class="step-title">"あなたの心の中の質問は何ですか？"</p>
            <input
                type="text"
                class="question-input"
                placeholder="例: これからのキャリアの方向性はどうなる？"
                prop:value=move || wizard.with(|w| w.question().to_string())
                on:input=move |ev| wizard.update(|w| w.set_question(event_target_value(&ev)))
                on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        submit();
                    }
                }
            />
            <div class="actions">
                <button class="primary" on:click=move |_| submit()>
                    "質問をはじめる"
                </button>
            </div>
        </div>
    }
}
