//! Synthetic WebM/Opus streams for tests.

use super::demux::ids;
use super::ebml::vint;

/// Encoded bytes of an element id (ids are stored in raw form).
pub fn id_bytes(id: u32) -> Vec<u8> {
    let bytes = id.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(3);
    bytes[skip..].to_vec()
}

pub fn element(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.extend(vint::encode(payload.len() as u64).unwrap().to_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn master(id: u32, children: &[Vec<u8>]) -> Vec<u8> {
    element(id, &children.concat())
}

/// Master element with the reserved "unknown size" marker, as produced by
/// live muxers.
pub fn unknown_size_master(id: u32, children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.extend([0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    out.extend(children.concat());
    out
}

pub fn uint(id: u32, value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    element(id, &bytes[skip..])
}

pub fn block_body(track: u64, timecode: i16, flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vint::encode(track).unwrap().to_bytes();
    body.extend(timecode.to_be_bytes());
    body.push(flags);
    body.extend_from_slice(payload);
    body
}

pub fn simple_block(track: u64, timecode: i16, payload: &[u8]) -> Vec<u8> {
    element(ids::SIMPLE_BLOCK, &block_body(track, timecode, 0x80, payload))
}

pub fn ebml_header(doc_type: &str) -> Vec<u8> {
    master(
        ids::EBML,
        &[
            uint(ids::EBML_VERSION, 1),
            uint(ids::EBML_READ_VERSION, 1),
            uint(ids::EBML_MAX_ID_LENGTH, 4),
            uint(ids::EBML_MAX_SIZE_LENGTH, 8),
            element(ids::DOC_TYPE, doc_type.as_bytes()),
            uint(ids::DOC_TYPE_VERSION, 4),
            uint(ids::DOC_TYPE_READ_VERSION, 2),
        ],
    )
}

pub fn opus_track() -> Vec<u8> {
    master(
        ids::TRACKS,
        &[master(
            ids::TRACK_ENTRY,
            &[
                uint(ids::TRACK_NUMBER, 1),
                uint(ids::TRACK_UID, 0x1234),
                uint(ids::FLAG_LACING, 0),
                element(ids::LANGUAGE, b"und"),
                element(ids::CODEC_ID, b"A_OPUS"),
                uint(ids::CODEC_DELAY, 6_500_000),
                uint(ids::SEEK_PRE_ROLL, 80_000_000),
                uint(ids::TRACK_TYPE, 2),
                master(
                    ids::AUDIO,
                    &[uint(ids::CHANNELS, 2), element(ids::SAMPLING_FREQUENCY, &48_000f32.to_be_bytes())],
                ),
                element(ids::CODEC_PRIVATE, b"OpusHead\x01\x02\x38\x01\x80\xbb\x00\x00\x00\x00\x00"),
            ],
        )],
    )
}

/// Header, one Opus track and one cluster holding a single audio block.
pub fn minimal_webm(doc_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = ebml_header(doc_type);
    out.extend(master(
        ids::SEGMENT,
        &[
            master(ids::INFO, &[uint(ids::TIMECODE_SCALE, 1_000_000)]),
            opus_track(),
            master(
                ids::CLUSTER,
                &[uint(ids::CLUSTER_TIMECODE, 0), simple_block(1, 0, payload)],
            ),
        ],
    ));
    out
}

/// Fake Opus packet for frame `n`; never empty, varies in size.
pub fn opus_packet(n: usize) -> Vec<u8> {
    let len = 40 + (n * 7) % 80;
    (0..len).map(|i| (n + i) as u8).collect()
}

/// One second of 20 ms Opus frames, split over two unknown-size clusters the
/// way streaming muxers write them. The second cluster stores its frames in
/// block groups, and metadata the demuxer never needs is sprinkled in.
pub fn one_second_webm() -> Vec<u8> {
    const FRAME_MS: i16 = 20;
    const FRAMES: usize = 50;

    let mut first = vec![uint(ids::CLUSTER_TIMECODE, 0)];
    let mut second = vec![uint(ids::CLUSTER_TIMECODE, 500)];
    for n in 0..FRAMES {
        let packet = opus_packet(n);
        if n < FRAMES / 2 {
            first.push(simple_block(1, n as i16 * FRAME_MS, &packet));
        } else {
            let timecode = (n - FRAMES / 2) as i16 * FRAME_MS;
            second.push(master(
                ids::BLOCK_GROUP,
                &[
                    element(ids::BLOCK, &block_body(1, timecode, 0x00, &packet)),
                    uint(ids::DISCARD_PADDING, 0),
                ],
            ));
        }
    }

    let mut out = ebml_header("webm");
    out.extend(unknown_size_master(
        ids::SEGMENT,
        &[
            master(ids::SEEK_HEAD, &[element(0x4DBB, &[0u8; 12])]),
            element(ids::VOID, &[0u8; 32]),
            master(
                ids::INFO,
                &[uint(ids::TIMECODE_SCALE, 1_000_000), element(0x4D80, b"fixture")],
            ),
            opus_track(),
            master(
                ids::TAGS,
                &[master(
                    ids::TAG,
                    &[
                        master(ids::TARGETS, &[]),
                        master(
                            ids::SIMPLE_TAG,
                            &[element(ids::TAG_NAME, b"ENCODER"), element(ids::TAG_STRING, b"test")],
                        ),
                    ],
                )],
            ),
            unknown_size_master(ids::CLUSTER, &first),
            unknown_size_master(ids::CLUSTER, &second),
        ],
    ));
    out
}
