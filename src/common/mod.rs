pub mod banner;
pub mod logger;
pub mod time;
pub mod types;

pub use self::time::format_relative_duration;
pub use self::types::*;
