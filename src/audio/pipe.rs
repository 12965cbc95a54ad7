//! In-process byte pipe between async ingestion and blocking demuxing.
//!
//! The writer half lives on the runtime and pushes [`Bytes`] chunks into a
//! bounded flume channel; the reader half implements [`std::io::Read`] so the
//! demuxer can consume it on a blocking thread. A full channel parks the
//! writer, which is what applies backpressure to the network.
//!
//! Dropping the writer is a clean end of stream (`read` returns `0`).
//! [`PipeWriter::abort`] instead makes every later read fail with
//! [`io::ErrorKind::BrokenPipe`], which the EBML layer reports as a closed
//! pipe.

use std::{
    io::{self, Read},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::constants::PIPE_CHUNK_SIZE;

struct Shared {
    aborted: AtomicBool,
}

/// Creates a pipe buffering at most `capacity` chunks.
pub fn pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let (tx, rx) = flume::bounded(capacity.max(1));
    let shared = Arc::new(Shared {
        aborted: AtomicBool::new(false),
    });

    (
        PipeWriter {
            tx,
            shared: shared.clone(),
        },
        PipeReader {
            rx,
            current: Bytes::new(),
            shared,
        },
    )
}

pub struct PipeWriter {
    tx: flume::Sender<Bytes>,
    shared: Arc<Shared>,
}

impl PipeWriter {
    /// Queues one chunk, waiting while the pipe is full.
    ///
    /// Fails with `BrokenPipe` once the reader is gone.
    pub async fn write(&self, chunk: Bytes) -> io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.tx
            .send_async(chunk)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader dropped"))
    }

    /// Copies `source` into the pipe until it reaches end of stream.
    pub async fn copy_from<R>(&self, source: &mut R) -> io::Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut total = 0u64;
        loop {
            let mut buf = BytesMut::with_capacity(PIPE_CHUNK_SIZE);
            let n = source.read_buf(&mut buf).await?;
            if n == 0 {
                return Ok(total);
            }
            total += n as u64;
            self.write(buf.freeze()).await?;
        }
    }

    /// Whether the reading half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_disconnected()
    }

    /// Closes the pipe so the reader fails instead of seeing a clean end.
    pub fn abort(self) {
        self.shared.aborted.store(true, Ordering::Release);
    }
}

pub struct PipeReader {
    rx: flume::Receiver<Bytes>,
    current: Bytes,
    shared: Arc<Shared>,
}

impl PipeReader {
    fn aborted(&self) -> bool {
        self.shared.aborted.load(Ordering::Acquire)
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.aborted() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }

            if !self.current.is_empty() {
                let n = buf.len().min(self.current.len());
                buf[..n].copy_from_slice(&self.current[..n]);
                self.current.advance(n);
                return Ok(n);
            }

            match self.rx.recv() {
                Ok(chunk) => self.current = chunk,
                // Writer dropped; abort() stores the flag before the drop.
                Err(flume::RecvError::Disconnected) if self.aborted() => continue,
                Err(flume::RecvError::Disconnected) => return Ok(0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn bytes_arrive_in_order_then_eof() {
        let (writer, mut reader) = pipe(4);

        let consumer = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            reader.read_to_end(&mut out).map(|_| out)
        });

        writer.write(Bytes::from_static(b"hello ")).await.unwrap();
        writer.write(Bytes::new()).await.unwrap();
        writer.write(Bytes::from_static(b"world")).await.unwrap();
        drop(writer);

        let out = consumer.await.unwrap().unwrap();
        assert_eq!(out, b"hello world");
    }

    #[tokio::test]
    async fn small_reads_split_chunks() {
        let (writer, mut reader) = pipe(2);
        writer.write(Bytes::from_static(b"abcdef")).await.unwrap();
        drop(writer);

        let mut two = [0u8; 2];
        reader.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"ab");
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"cdef");
    }

    #[tokio::test]
    async fn abort_is_a_broken_pipe() {
        let (writer, mut reader) = pipe(2);
        writer.write(Bytes::from_static(b"abc")).await.unwrap();
        writer.abort();

        let err = reader.read(&mut [0u8; 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn abort_wakes_a_parked_reader() {
        let (writer, mut reader) = pipe(2);
        let consumer = tokio::task::spawn_blocking(move || reader.read(&mut [0u8; 8]));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        writer.abort();

        let err = consumer.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn dropped_reader_fails_the_writer() {
        let (writer, reader) = pipe(1);
        drop(reader);
        assert!(writer.is_closed());
        let err = writer.write(Bytes::from_static(b"x")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn copy_from_forwards_a_whole_source() {
        let data: Vec<u8> = (0..100_000u32).map(|i| i as u8).collect();
        let (writer, mut reader) = pipe(4);

        let consumer = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            reader.read_to_end(&mut out).map(|_| out)
        });

        let mut source = Cursor::new(data.clone());
        let copied = writer.copy_from(&mut source).await.unwrap();
        drop(writer);

        assert_eq!(copied, data.len() as u64);
        assert_eq!(consumer.await.unwrap().unwrap(), data);
    }
}
