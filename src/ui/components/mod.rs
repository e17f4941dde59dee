pub mod article_list;
pub mod history_panel;
pub mod progress_bar;
pub mod reference_panel;
pub mod session_summary;
