pub mod client;
pub mod gateway;
pub mod parsing;
pub mod prompts;

pub use client::*;
pub use gateway::*;
pub use parsing::*;
pub use prompts::*;
