pub mod admin_header;
pub mod docs_panel;
pub mod review_details;
pub mod reviews_list;
pub mod settings_page;
