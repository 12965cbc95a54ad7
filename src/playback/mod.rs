mod bot;
mod error;
mod state;
pub mod stream;


pub use bot::{Bot, QueueOptions};
pub use error::BotError;
pub use stream::{StreamOutcome, stream_entry};

pub use crate::configs::{BotConfig, ExtrapolationMode};
