pub mod extraction;
pub mod handlers;
pub mod models;
pub mod prompts;
