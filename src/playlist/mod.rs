//! Queue, suggestion and history lists shared by the playback loop and the
//! command handlers.

pub mod entry;
pub mod priority;
pub mod store;
pub mod template;

pub use entry::{Entity, PlaylistEntry, Role, Source};
pub use priority::{Fifo, PriorityStrategy, UserFirst};
pub use store::Playlist;
pub use template::{Template, TemplateContext, TemplateError};
