//! Minimal streaming EBML reader.
//!
//! Only the read side is implemented: variable-size integers and a
//! sequential element walker with per-element payload bounds. Nesting is
//! left to the caller, which makes the reader usable on unseekable,
//! unbounded inputs such as a subprocess pipe.

pub mod reader;
pub mod vint;

pub use reader::{ElementHeader, ElementReader, Payload};
pub use vint::{Vint, encode, encode_with_width, read_vint};

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum EbmlError {
    /// The stream ended cleanly on an element boundary.
    #[error("ebml: end of stream")]
    Eof,

    /// The stream ended inside an element header or payload.
    #[error("ebml: unexpected end of stream")]
    UnexpectedEof,

    /// The writing side of the stream was closed before it finished.
    #[error("ebml: stream closed")]
    ClosedPipe,

    #[error("ebml: vint is too long")]
    VintTooLong,

    #[error("ebml: element id {0:#x} is wider than 4 bytes")]
    IdTooLong(u64),

    #[error("ebml: value {0} does not fit in a vint")]
    ValueTooLarge(u64),

    #[error("ebml: element header not read")]
    HeaderNotRead,

    #[error("ebml: element {0:#x} has unknown size and cannot be read as a leaf")]
    UnknownSize(u32),

    #[error("ebml: element {id:#x} ended at byte {actual}, expected {expected}")]
    Overrun { id: u32, expected: u64, actual: u64 },

    #[error("ebml: {0}")]
    Io(io::Error),
}

impl EbmlError {
    /// Maps the error of a `read_exact` that started mid-structure.
    pub(crate) fn from_short_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => err.into(),
        }
    }

    /// True for the two non-error ways a stream can stop.
    pub fn is_termination(&self) -> bool {
        matches!(self, Self::Eof | Self::ClosedPipe)
    }
}

impl From<io::Error> for EbmlError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe => Self::ClosedPipe,
            _ => Self::Io(err),
        }
    }
}
