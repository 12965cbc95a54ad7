//! Demux layer: container sniffing and WebM/Opus frame extraction.
//!
//! ```rust,ignore
//! use jukelink::audio::demux::{WebmOpusDemuxer, detect_format, AudioFormat};
//!
//! if detect_format(&head) == AudioFormat::Webm {
//!     let mut demuxer = WebmOpusDemuxer::new(reader);
//!     while let Some(frame) = demuxer.next_frame()? {
//!         transport.send(frame.payload)?;
//!     }
//! }
//! ```

pub mod element;
pub mod format;
pub mod ids;
pub mod webm_opus;

pub use element::{ElementAction, ElementSpec, lookup};
pub use format::{AudioFormat, detect_format};
pub use webm_opus::{Frame, WEBM_DOC_TYPE, WebmOpusDemuxer};

use crate::audio::ebml::EbmlError;

#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    #[error("unsupported container: expected doc type {expected:?}, found {found:?}")]
    UnsupportedContainer { expected: String, found: String },

    #[error("block is too short to hold a frame header")]
    TruncatedBlock,

    /// The source was closed by the writer before the stream finished.
    #[error("stream closed")]
    ClosedPipe,

    #[error(transparent)]
    Ebml(EbmlError),
}

impl DemuxError {
    /// Closed pipes end a stream without it being a failure.
    pub fn is_termination(&self) -> bool {
        matches!(self, Self::ClosedPipe)
    }
}

impl From<EbmlError> for DemuxError {
    fn from(err: EbmlError) -> Self {
        match err {
            EbmlError::ClosedPipe => Self::ClosedPipe,
            other => Self::Ebml(other),
        }
    }
}
