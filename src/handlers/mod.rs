pub mod snippet_handler;
pub mod user_handler;
