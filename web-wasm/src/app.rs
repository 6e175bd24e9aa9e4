//! メインアプリケーションコンポーネント

use leptos::prelude::*;
use tarot_common::{Wizard, WizardStep};

use crate::components::{
    header::Header,
    question_form::QuestionForm,
    upload_form::UploadForm,
    loading::Loading,
    result_view::ResultView,
};

/// メインアプリケーションコンポーネント
///
/// 表示するステップは `Wizard` の状態だけで決まる
#[component]
pub fn App() -> impl IntoView {
    let wizard = RwSignal::new(Wizard::new());

    let step_view = move || {
        let (step, loading) = wizard.with(|w| (w.step(), w.is_loading()));
        match step {
            WizardStep::AskQuestion => view! { <QuestionForm wizard=wizard /> }.into_any(),
            WizardStep::UploadCard => view! { <UploadForm wizard=wizard /> }.into_any(),
            WizardStep::ShowResult if loading => view! { <Loading wizard=wizard /> }.into_any(),
            WizardStep::ShowResult => view! { <ResultView wizard=wizard /> }.into_any(),
        }
    };

    view! {
        <div class="container" data-step=move || wizard.with(|w| w.step().as_str())>
            <Header />
            {step_view}
        </div>
    }
}
