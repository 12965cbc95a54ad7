use crate::{
    audio::demux::DemuxError,
    llm::ChatError,
    sources::{SearchError, SourceError},
};

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("already playing")]
    AlreadyPlaying,

    #[error("too many consecutive failures ({0})")]
    TooManyFailures(u32),

    #[error("no chat backend is configured")]
    MissingAiClient,

    /// The transport stopped receiving frames. Besides an exhausted failure
    /// budget, this is the only error that ends playback.
    #[error("output channel closed")]
    OutputClosed,

    #[error("unsupported codec: expected {expected}, got {found}")]
    UnsupportedCodec { expected: String, found: String },

    #[error("source: {0}")]
    Source(#[from] SourceError),

    #[error("search: {0}")]
    Search(#[from] SearchError),

    #[error("chat: {0}")]
    Chat(#[from] ChatError),

    #[error("demux: {0}")]
    Demux(#[from] DemuxError),

    #[error("stream task failed: {0}")]
    Task(String),
}

impl BotError {
    /// Entries failing this way are skipped without counting as a failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCodec { .. }
                | Self::Source(SourceError::UnsupportedFormat(_))
                | Self::Demux(DemuxError::UnsupportedContainer { .. })
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Chat(ChatError::RateLimited))
    }
}
