pub mod assistants;
pub mod chat;
pub mod pages;
pub mod run;
pub mod threads;

pub use assistants::list_assistants;
pub use chat::chat_api;
pub use pages::{data, health, home};
pub use run::{run_api, OFFLINE_MESSAGE};
pub use threads::create_thread;
