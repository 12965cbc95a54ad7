//! Central constants for the streaming pipeline.
//!
//! Magic numbers used by `src/audio/**` and the playback loop live here so
//! they can be tuned in one place.

// ── Opus ─────────────────────────────────────────────────────────────────────

/// Duration of one Opus frame as muxed by the upstream encoder (ms).
pub const OPUS_FRAME_MS: u64 = 20;

/// MIME type a source stream must report to be demuxed.
pub const EXPECTED_MIME_TYPE: &str = "audio/webm; codecs=\"opus\"";

// ── Pipe ─────────────────────────────────────────────────────────────────────

/// Bytes read from a source per pipe chunk (16 KB).
pub const PIPE_CHUNK_SIZE: usize = 16 * 1_024;

/// Chunks buffered between ingestion and demuxing before the writer parks
/// (64 × 16 KB = 1 MB).
pub const PIPE_CAPACITY: usize = 64;

/// Buffer wrapped around the pipe reader on the demux side (64 KB).
pub const DEMUX_READ_BUFFER: usize = 64 * 1_024;

// ── Forwarding ───────────────────────────────────────────────────────────────

/// How long a blocked frame send waits before re-checking cancellation (ms).
pub const FORWARD_POLL_MS: u64 = 50;

/// How long a "now playing" announcement may wait on a full status channel
/// before it is dropped (ms).
pub const STATUS_SEND_TIMEOUT_MS: u64 = 250;
