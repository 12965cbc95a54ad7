pub mod plugin;
pub mod ytdlp;

pub use plugin::{AudioStream, SearchError, SearchProvider, SearchResult, SourceError, SourceProvider};
pub use ytdlp::{YtDlpSearch, YtDlpSource};
