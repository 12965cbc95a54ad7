//! Per-entry pipeline: async ingestion into a pipe, blocking demux and
//! frame forwarding on the other end.

use std::{io::BufReader, time::Duration};

use flume::SendTimeoutError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::BotError;
use crate::{
    audio::{
        constants::{DEMUX_READ_BUFFER, EXPECTED_MIME_TYPE, FORWARD_POLL_MS, PIPE_CAPACITY},
        demux::WebmOpusDemuxer,
        pipe::{PipeReader, pipe},
    },
    sources::{AudioStream, SourceError},
};

/// How a stream that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Finished { frames: u64 },
    Cancelled { frames: u64 },
}

impl StreamOutcome {
    pub fn frames(&self) -> u64 {
        match self {
            Self::Finished { frames } | Self::Cancelled { frames } => *frames,
        }
    }
}

/// Streams one opened source into `output` until it ends, fails or `cancel`
/// fires.
///
/// When several things go wrong at once the ingestion error wins over the
/// demux error, which wins over cancellation.
pub async fn stream_entry(
    mut stream: Box<dyn AudioStream>,
    output: flume::Sender<Vec<u8>>,
    cancel: CancellationToken,
) -> Result<StreamOutcome, BotError> {
    if stream.mime_type() != EXPECTED_MIME_TYPE {
        let found = stream.mime_type().to_string();
        stream.close().await;
        return Err(BotError::UnsupportedCodec {
            expected: EXPECTED_MIME_TYPE.to_string(),
            found,
        });
    }

    let (writer, reader) = pipe(PIPE_CAPACITY);
    // Also fired by the demux side when it stops early.
    let local = cancel.child_token();
    let demux_cancel = local.clone();
    let demux = tokio::task::spawn_blocking(move || forward_frames(reader, output, demux_cancel));

    let copied = tokio::select! {
        res = writer.copy_from(&mut stream) => Some(res),
        _ = local.cancelled() => None,
    };

    let ingest: Result<(), BotError> = match copied {
        Some(Ok(bytes)) => match stream.finish().await {
            Ok(()) => {
                debug!("stream: source ended after {} bytes", bytes);
                drop(writer);
                Ok(())
            }
            Err(e) => {
                writer.abort();
                Err(e.into())
            }
        },
        // The demux side is gone; its own result says why.
        Some(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            writer.abort();
            stream.close().await;
            Ok(())
        }
        Some(Err(e)) => {
            writer.abort();
            stream.close().await;
            Err(SourceError::Io(e).into())
        }
        None => {
            writer.abort();
            stream.close().await;
            Ok(())
        }
    };

    let demuxed = demux
        .await
        .map_err(|e| BotError::Task(e.to_string()))?;

    ingest?;
    let frames = demuxed?;

    if cancel.is_cancelled() {
        Ok(StreamOutcome::Cancelled { frames })
    } else {
        Ok(StreamOutcome::Finished { frames })
    }
}

/// Blocking half: demuxes the pipe and forwards every payload. Returns the
/// number of frames delivered.
fn forward_frames(
    reader: PipeReader,
    output: flume::Sender<Vec<u8>>,
    cancel: CancellationToken,
) -> Result<u64, BotError> {
    let mut demuxer =
        WebmOpusDemuxer::new(BufReader::with_capacity(DEMUX_READ_BUFFER, reader));
    let poll = Duration::from_millis(FORWARD_POLL_MS);
    let mut frames = 0u64;

    let result = 'frames: loop {
        let frame = match demuxer.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break Ok(frames),
            Err(e) if e.is_termination() => {
                debug!("stream: pipe closed after {} frames", frames);
                break Ok(frames);
            }
            Err(e) => {
                warn!("stream: demux failed after {} frames: {}", frames, e);
                break Err(BotError::Demux(e));
            }
        };

        let mut payload = frame.payload;
        loop {
            if cancel.is_cancelled() {
                break 'frames Ok(frames);
            }
            match output.send_timeout(payload, poll) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(back)) => payload = back,
                Err(SendTimeoutError::Disconnected(_)) => break 'frames Err(BotError::OutputClosed),
            }
        }
        frames += 1;
    };

    if result.is_err() {
        cancel.cancel();
    }
    result
}
