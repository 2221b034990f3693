//! Command handlers for the PolicyQA CLI.

pub mod ask;
mod client;
pub mod serve;
pub mod verify;

pub use ask::AskCommand;
pub use serve::ServeCommand;
pub use verify::VerifyCommand;
