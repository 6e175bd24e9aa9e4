pub mod header;
pub mod question_form;
pub mod upload_form;
pub mod loading;
pub mod result_view;
