//! WebM / Matroska → raw Opus packet demuxer.
//!
//! Walks the container incrementally with an [`ElementReader`] and yields the
//! payload of every `SimpleBlock` / `Block` as a [`Frame`], ready to be sent
//! to the voice transport without re-encoding. Nothing is buffered beyond
//! the block currently being decoded, so the source may be an endless pipe.

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};
use tracing::{debug, trace};

use super::{
    DemuxError,
    element::{ElementAction, lookup},
};
use crate::audio::ebml::{EbmlError, ElementReader, read_vint};

/// Document type Opus streams are delivered in.
pub const WEBM_DOC_TYPE: &str = "webm";

/// One compressed audio unit from a data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub track: u64,
    /// Offset from the enclosing cluster's timecode, in timecode-scale units.
    pub timecode: i16,
    pub flags: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn is_keyframe(&self) -> bool {
        self.flags & 0x80 != 0
    }

    /// Lacing mode bits (0 = none, 1 = Xiph, 2 = fixed, 3 = EBML).
    pub fn lacing(&self) -> u8 {
        (self.flags >> 1) & 0x03
    }
}

pub struct WebmOpusDemuxer<R> {
    reader: ElementReader<R>,
    doc_type: String,
    frames: u64,
}

impl<R: Read> WebmOpusDemuxer<R> {
    pub fn new(source: R) -> Self {
        Self::with_doc_type(source, WEBM_DOC_TYPE)
    }

    /// Demuxer that accepts `doc_type` instead of `"webm"`.
    pub fn with_doc_type(source: R, doc_type: impl Into<String>) -> Self {
        Self {
            reader: ElementReader::new(source),
            doc_type: doc_type.into(),
            frames: 0,
        }
    }

    /// Number of frames yielded so far.
    pub fn frames_read(&self) -> u64 {
        self.frames
    }

    /// Bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Read the next audio frame.
    ///
    /// Returns `Ok(None)` at end-of-stream, [`DemuxError::ClosedPipe`] when
    /// the source was closed from the writing side, and `Err(_)` on hard
    /// errors.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DemuxError> {
        loop {
            let header = match self.reader.next_element_header() {
                Ok(header) => header,
                Err(EbmlError::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let Some(spec) = lookup(header.id) else {
                debug!(
                    "webm: discarding unexpected element {:#x} ({:?} bytes) at {}",
                    header.id, header.size, header.offset
                );
                self.discard_unknown(header.id)?;
                continue;
            };

            trace!("webm: {} at {}", spec.name, header.offset);

            match spec.action {
                ElementAction::Enter => {}
                ElementAction::Skip => {
                    self.reader.discard()?;
                }
                ElementAction::DocType => {
                    let raw = self.reader.read_payload()?;
                    // Strings may be zero padded up to the element size.
                    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
                    let found = String::from_utf8_lossy(&raw[..end]).into_owned();
                    if found != self.doc_type {
                        return Err(DemuxError::UnsupportedContainer {
                            expected: self.doc_type.clone(),
                            found,
                        });
                    }
                }
                ElementAction::Block => {
                    let frame = self.read_block()?;
                    self.frames += 1;
                    return Ok(Some(frame));
                }
            }
        }
    }

    fn discard_unknown(&mut self, id: u32) -> Result<(), DemuxError> {
        match self.reader.discard() {
            Ok(_) => Ok(()),
            // An unknown element of unknown size can only be a container;
            // walk into it like any other master element.
            Err(EbmlError::UnknownSize(_)) => {
                debug!("webm: entering unknown-size element {:#x}", id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_block(&mut self) -> Result<Frame, DemuxError> {
        let mut payload = self.reader.payload()?;

        let track = read_vint(&mut payload).map_err(|e| match e {
            EbmlError::Eof => DemuxError::TruncatedBlock,
            other => other.into(),
        })?;
        let timecode = payload.read_i16::<BigEndian>().map_err(block_header_error)?;
        let flags = payload.read_u8().map_err(block_header_error)?;

        let mut data = Vec::new();
        payload
            .read_to_end(&mut data)
            .map_err(EbmlError::from_short_read)?;

        Ok(Frame {
            track: track.value,
            timecode,
            flags,
            payload: data,
        })
    }
}

fn block_header_error(err: io::Error) -> DemuxError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => DemuxError::TruncatedBlock,
        _ => EbmlError::from(err).into(),
    }
}

impl<R: Read> Iterator for WebmOpusDemuxer<R> {
    type Item = Result<Frame, DemuxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::demux::ids;
    use crate::audio::fixture::{
        block_body, ebml_header, element, master, minimal_webm, one_second_webm, opus_packet,
        simple_block, uint,
    };
    use std::io::{self, Cursor};

    #[test]
    fn minimal_container_yields_exactly_one_frame() {
        let data = minimal_webm("webm", b"\xfc\xff\xfe");
        let mut demuxer = WebmOpusDemuxer::new(Cursor::new(data));

        let frame = demuxer.next_frame().unwrap().expect("one frame");
        assert_eq!(frame.track, 1);
        assert_eq!(frame.timecode, 0);
        assert!(frame.is_keyframe());
        assert_eq!(frame.payload, b"\xfc\xff\xfe");

        assert!(demuxer.next_frame().unwrap().is_none());
        assert_eq!(demuxer.frames_read(), 1);
    }

    #[test]
    fn wrong_doc_type_fails_before_any_frame() {
        let data = minimal_webm("matroska", b"\x01");
        let mut demuxer = WebmOpusDemuxer::new(Cursor::new(data));

        match demuxer.next_frame() {
            Err(DemuxError::UnsupportedContainer { expected, found }) => {
                assert_eq!(expected, "webm");
                assert_eq!(found, "matroska");
            }
            other => panic!("expected unsupported container, got {other:?}"),
        }
        assert_eq!(demuxer.frames_read(), 0);
    }

    #[test]
    fn doc_type_comparison_is_case_sensitive() {
        let data = minimal_webm("WebM", b"\x01");
        let result = WebmOpusDemuxer::new(Cursor::new(data)).next_frame();
        assert!(matches!(result, Err(DemuxError::UnsupportedContainer { .. })));
    }

    #[test]
    fn custom_doc_type_is_accepted() {
        let data = minimal_webm("matroska", b"\x01");
        let mut demuxer = WebmOpusDemuxer::with_doc_type(Cursor::new(data), "matroska");
        assert!(demuxer.next_frame().unwrap().is_some());
    }

    #[test]
    fn block_group_blocks_decode_like_simple_blocks() {
        let mut data = ebml_header("webm");
        data.extend(master(
            ids::SEGMENT,
            &[master(
                ids::CLUSTER,
                &[
                    uint(ids::CLUSTER_TIMECODE, 1000),
                    master(
                        ids::BLOCK_GROUP,
                        &[
                            element(ids::BLOCK, &block_body(2, -40, 0x00, b"abc")),
                            uint(ids::BLOCK_DURATION, 20),
                        ],
                    ),
                ],
            )],
        ));

        let frames: Vec<Frame> = WebmOpusDemuxer::new(Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            frames,
            vec![Frame {
                track: 2,
                timecode: -40,
                flags: 0,
                payload: b"abc".to_vec(),
            }]
        );
    }

    #[test]
    fn unknown_elements_are_skipped() {
        let mut data = ebml_header("webm");
        data.extend(master(
            ids::SEGMENT,
            &[
                element(0x5A5A, &[1, 2, 3, 4]),
                master(ids::CLUSTER, &[element(0x7ABC, &[9; 40]), simple_block(1, 20, b"x")]),
            ],
        ));

        let frames: Vec<Frame> = WebmOpusDemuxer::new(Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].timecode, 20);
    }

    #[test]
    fn truncated_block_is_an_error() {
        let mut data = ebml_header("webm");
        data.extend(element(ids::SIMPLE_BLOCK, &[0x81, 0x00]));
        let result = WebmOpusDemuxer::new(Cursor::new(data)).next_frame();
        assert!(matches!(result, Err(DemuxError::TruncatedBlock)));
    }

    #[test]
    fn stream_cut_inside_block_is_unexpected_eof() {
        let mut data = minimal_webm("webm", &[7u8; 64]);
        data.truncate(data.len() - 10);
        let result = WebmOpusDemuxer::new(Cursor::new(data)).next_frame();
        assert!(matches!(
            result,
            Err(DemuxError::Ebml(EbmlError::UnexpectedEof))
        ));
    }

    struct ClosedAfter {
        data: Cursor<Vec<u8>>,
    }

    impl Read for ClosedAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn closed_pipe_is_reported_distinctly() {
        let mut data = ebml_header("webm");
        data.extend(simple_block(1, 0, b"a"));
        let mut demuxer = WebmOpusDemuxer::new(ClosedAfter {
            data: Cursor::new(data),
        });

        assert!(demuxer.next_frame().unwrap().is_some());
        let err = demuxer.next_frame().unwrap_err();
        assert!(matches!(err, DemuxError::ClosedPipe));
        assert!(err.is_termination());
    }

    #[test]
    fn one_second_fixture_has_contiguous_timecodes() {
        let demuxer = WebmOpusDemuxer::new(Cursor::new(one_second_webm()));
        let frames: Vec<Frame> = demuxer.collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.len(), 50);
        for (n, frame) in frames.iter().enumerate() {
            assert!(!frame.payload.is_empty());
            assert_eq!(frame.payload, opus_packet(n));
            assert_eq!(frame.track, 1);
        }

        // Timecodes are cluster relative; rebuild absolute ones per cluster.
        let absolute: Vec<i64> = frames
            .iter()
            .enumerate()
            .map(|(n, f)| if n < 25 { 0 } else { 500 } + i64::from(f.timecode))
            .collect();
        assert!(absolute.windows(2).all(|w| w[0] <= w[1]));
        assert!(absolute.windows(2).all(|w| w[1] - w[0] == 20));
        assert_eq!(absolute.last(), Some(&980));
    }
}
