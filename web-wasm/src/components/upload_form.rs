//! カード画像アップロードコンポーネント

use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tarot_common::{failure_message, process_card, UploadedFile, Wizard};
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use crate::api::{js_error_message, reading::ApiReadingService};
use crate::heic::BrowserTranscoder;

#[component]
pub fn UploadForm(wizard: RwSignal<Wizard>) -> impl IntoView {
    let file_input: NodeRef<Input> = NodeRef::new();
    let is_submitting = move || wizard.with(|w| w.is_submitting());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let selected: Vec<File> = file_input
            .get_untracked()
            .and_then(|input| input.files())
            .map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
            .unwrap_or_default();

        // 件数チェックと二重送信防止はクリック時点で同期的に行う
        let mut state = wizard.get_untracked();
        if let Err(rejection) = state.start_submission(selected.len()) {
            notify_failure(&rejection.to_string());
            return;
        }
        wizard.set(state.clone());

        spawn_local(async move {
            let mut state = state;
            let upload = match selected.into_iter().next() {
                Some(file) => read_file(file).await,
                None => Err(String::new()),
            };

            let upload = match upload {
                Ok(upload) => upload,
                Err(message) => {
                    state.fail();
                    wizard.set(state);
                    notify_failure(&failure_message(&message));
                    return;
                }
            };

            let result = process_card(
                &mut state,
                upload,
                &BrowserTranscoder,
                &ApiReadingService::default(),
                |w| wizard.set(w.clone()),
            )
            .await;

            if let Err(message) = result {
                notify_failure(&message);
            }
        });
    };

    view! {
        <div class="upload-step">
            <p class="step-title">"実際にカードを1枚引いてみてください 🃏"</p>
            <form class="upload-form" on:submit=on_submit>
                <p class="text-muted">"引いたカード1枚の写真をアップロードしてください。"</p>
                <input
                    type="file"
                    name="cards"
                    accept="image/*,.heic,.heif"
                    required=true
                    node_ref=file_input
                />
                <div class="actions">
                    <button type="submit" class="primary" disabled=is_submitting>
                        {move || if is_submitting() { "解釈中..." } else { "カードを解釈する" }}
                    </button>
                </div>
            </form>
        </div>
    }
}

async fn read_file(file: File) -> Result<UploadedFile, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| js_error_message(&e))?;

    Ok(UploadedFile {
        file_name: file.name(),
        mime_type: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

/// ブロッキング通知（alert）
fn notify_failure(message: &str) {
    web_sys::console::error_1(&message.into());
    gloo::dialogs::alert(message);
}
