pub mod constants;
pub mod demux;
pub mod ebml;
pub mod pipe;

#[cfg(test)]
pub(crate) mod fixture;

pub use demux::{AudioFormat, DemuxError, Frame, WebmOpusDemuxer, detect_format};
pub use pipe::{PipeReader, PipeWriter, pipe};
