pub mod builder;
pub mod client;
pub mod generate;
pub mod handlers;
pub mod prompts;
