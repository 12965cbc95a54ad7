pub mod base;
pub mod bot;
pub mod llm;
pub mod logging;
pub mod prompts;
pub mod ytdlp;

pub use base::*;
pub use bot::*;
pub use llm::*;
pub use logging::*;
pub use prompts::*;
pub use ytdlp::*;
