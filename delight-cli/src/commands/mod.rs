pub mod chat;
pub mod config;
pub mod poll;

pub use chat::{handle_chat_command, handle_send_command, MessageArgs};
pub use config::{handle_config_command, ConfigCommand};
pub use poll::handle_poll_command;
