pub mod dashboard;
pub mod progress_bar;
pub mod question_card;
pub mod review_table;
pub mod setup_form;
