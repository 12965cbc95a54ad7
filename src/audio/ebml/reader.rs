use std::io::{self, Read};

use super::{EbmlError, vint::read_vint};

/// Widest element id accepted, in bytes.
pub const MAX_ID_WIDTH: u8 = 4;

/// Upper bound for a single up-front payload allocation. Larger payloads
/// still read fine, the buffer just grows as data arrives.
const MAX_PREALLOC: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// Element id in its raw encoded form (marker bits included).
    pub id: u32,
    /// Payload size, `None` when the element declared an unknown size.
    pub size: Option<u64>,
    /// Bytes taken by the id and size fields.
    pub header_len: u8,
    /// Stream offset of the first id byte.
    pub offset: u64,
}

impl ElementHeader {
    /// Stream offset right after the payload, if the size is known.
    pub fn end(&self) -> Option<u64> {
        self.size
            .map(|size| self.offset + u64::from(self.header_len) + size)
    }
}

struct Counted<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Walks a byte stream as a flat sequence of EBML elements.
///
/// Every call to [`next_element_header`](Self::next_element_header) bounds
/// the payload reader to the declared size. Master elements are entered by
/// simply asking for the next header without touching the payload.
pub struct ElementReader<R> {
    source: Counted<R>,
    current: Option<ElementHeader>,
    remaining: u64,
}

impl<R: Read> ElementReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            source: Counted { inner, position: 0 },
            current: None,
            remaining: 0,
        }
    }

    /// Absolute number of bytes consumed from the underlying stream.
    pub fn position(&self) -> u64 {
        self.source.position
    }

    /// Header of the element currently being read.
    pub fn header(&self) -> Option<&ElementHeader> {
        self.current.as_ref()
    }

    /// Unread payload bytes of the current element.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn into_inner(self) -> R {
        self.source.inner
    }

    /// Reads the next element's id and size.
    ///
    /// Returns [`EbmlError::Eof`] if the stream ends exactly on an element
    /// boundary.
    pub fn next_element_header(&mut self) -> Result<ElementHeader, EbmlError> {
        let offset = self.source.position;

        let id = read_vint(&mut self.source)?;
        if id.width > MAX_ID_WIDTH {
            return Err(EbmlError::IdTooLong(id.raw));
        }

        let size = read_vint(&mut self.source).map_err(|e| match e {
            EbmlError::Eof => EbmlError::UnexpectedEof,
            other => other,
        })?;

        let header = ElementHeader {
            id: id.raw as u32,
            size: (!size.is_all_ones()).then_some(size.value),
            header_len: id.width + size.width,
            offset,
        };

        self.current = Some(header);
        self.remaining = header.size.unwrap_or(0);
        Ok(header)
    }

    /// Bounded reader over the current element's payload.
    pub fn payload(&mut self) -> Result<Payload<'_, R>, EbmlError> {
        let header = self.current.ok_or(EbmlError::HeaderNotRead)?;
        if header.size.is_none() {
            return Err(EbmlError::UnknownSize(header.id));
        }
        Ok(Payload { reader: self })
    }

    /// Reads the remainder of the current element's payload.
    pub fn read_payload(&mut self) -> Result<Vec<u8>, EbmlError> {
        let mut data = Vec::with_capacity(self.remaining.min(MAX_PREALLOC) as usize);
        self.payload()?
            .read_to_end(&mut data)
            .map_err(EbmlError::from_short_read)?;
        self.check_end()?;
        Ok(data)
    }

    /// Drops the remainder of the current element's payload.
    ///
    /// Returns the number of bytes skipped.
    pub fn discard(&mut self) -> Result<u64, EbmlError> {
        let skipped = io::copy(&mut self.payload()?, &mut io::sink())
            .map_err(EbmlError::from_short_read)?;
        self.check_end()?;
        Ok(skipped)
    }

    fn check_end(&self) -> Result<(), EbmlError> {
        let Some(header) = self.current else {
            return Err(EbmlError::HeaderNotRead);
        };
        match header.end() {
            Some(expected) if expected != self.source.position => Err(EbmlError::Overrun {
                id: header.id,
                expected,
                actual: self.source.position,
            }),
            _ => Ok(()),
        }
    }
}

/// Payload of one element. Reads past the declared size return `Ok(0)`.
pub struct Payload<'a, R> {
    reader: &'a mut ElementReader<R>,
}

impl<R: Read> Read for Payload<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.reader.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = buf.len().min(self.reader.remaining.min(usize::MAX as u64) as usize);
        let n = self.reader.source.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside an element",
            ));
        }

        self.reader.remaining -= n as u64;
        Ok(n)
    }
}
