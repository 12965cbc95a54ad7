use async_trait::async_trait;
use tokio::io::AsyncRead;

/// A compressed audio byte stream handed to the demuxer.
///
/// Reading yields container bytes. Once reading hits end of stream the
/// caller should [`finish`](Self::finish) the stream to learn whether the
/// producer succeeded, or [`close`](Self::close) it to stop early.
#[async_trait]
pub trait AudioStream: AsyncRead + Send + Unpin {
    /// MIME type including the codec parameter, e.g.
    /// `audio/webm; codecs="opus"`.
    fn mime_type(&self) -> &str;

    fn title(&self) -> &str;

    /// Waits for the producer after end of stream and reports its outcome.
    async fn finish(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Stops the producer. Safe to call more than once.
    async fn close(&mut self) {}
}

/// Resolves an entry uri into an audio stream.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Unique identifier for this source (e.g. "ytdlp").
    fn name(&self) -> &str;

    async fn open(&self, uri: &str) -> Result<Box<dyn AudioStream>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Source specific id, stored as the entry uri.
    pub id: String,
    pub title: String,
}

/// Free text search. An empty result list is a valid answer.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The media exists but not as Opus in WebM.
    #[error("no opus/webm format available for {0}")]
    UnsupportedFormat(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code:?}: {stderr}")]
    Process {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("search for {query:?} failed with code {code:?}: {stderr}")]
    Process {
        query: String,
        code: Option<i32>,
        stderr: String,
    },
}
