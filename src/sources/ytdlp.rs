//! Sources backed by the `yt-dlp` command line tool.

use std::{
    pin::Pin,
    process::{ExitStatus, Stdio},
    task::{Context, Poll},
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncReadExt, ReadBuf},
    process::{Child, ChildStdout, Command},
    task::JoinHandle,
};
use tracing::{debug, warn};

use super::plugin::{
    AudioStream, SearchError, SearchProvider, SearchResult, SourceError, SourceProvider,
};
use crate::{audio::constants::EXPECTED_MIME_TYPE, configs::YtDlpConfig};

const FORMAT_UNAVAILABLE: &str = "Requested format is not available";

/// Turns a bare video id into a watch url; anything with a scheme is kept.
pub fn watch_url(uri: &str) -> String {
    if uri.contains("://") {
        uri.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={uri}")
    }
}

fn classify_exit(uri: &str, program: &str, status: ExitStatus, stderr: String) -> SourceError {
    if stderr.contains(FORMAT_UNAVAILABLE) {
        SourceError::UnsupportedFormat(uri.to_string())
    } else {
        SourceError::Process {
            program: program.to_string(),
            code: status.code(),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Streams audio by piping `yt-dlp -o -` stdout.
pub struct YtDlpSource {
    config: YtDlpConfig,
}

impl YtDlpSource {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    fn stream_args(&self, uri: &str) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            self.config.format.clone(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.extend(["-o".to_string(), "-".to_string(), watch_url(uri)]);
        args
    }
}

#[async_trait]
impl SourceProvider for YtDlpSource {
    fn name(&self) -> &str {
        "ytdlp"
    }

    async fn open(&self, uri: &str) -> Result<Box<dyn AudioStream>, SourceError> {
        let args = self.stream_args(uri);
        debug!("ytdlp: spawning {} {}", self.config.binary, args.join(" "));

        let mut child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: self.config.binary.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SourceError::Io(std::io::Error::other("child stdout was not captured"))
        })?;

        // Drained concurrently so a chatty process never blocks on stderr.
        let stderr = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text).await;
                text
            })
        });

        Ok(Box::new(YtDlpStream {
            program: self.config.binary.clone(),
            uri: uri.to_string(),
            child,
            stdout,
            stderr,
        }))
    }
}

pub struct YtDlpStream {
    program: String,
    uri: String,
    child: Child,
    stdout: ChildStdout,
    stderr: Option<JoinHandle<String>>,
}

impl YtDlpStream {
    async fn collect_stderr(&mut self) -> String {
        match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        }
    }
}

impl AsyncRead for YtDlpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

#[async_trait]
impl AudioStream for YtDlpStream {
    fn mime_type(&self) -> &str {
        EXPECTED_MIME_TYPE
    }

    fn title(&self) -> &str {
        &self.uri
    }

    async fn finish(&mut self) -> Result<(), SourceError> {
        let status = self.child.wait().await?;
        let stderr = self.collect_stderr().await;
        if status.success() {
            return Ok(());
        }
        Err(classify_exit(&self.uri, &self.program, status, stderr))
    }

    async fn close(&mut self) {
        if let Err(e) = self.child.start_kill() {
            // Already exited.
            debug!("ytdlp: kill {}: {}", self.uri, e);
        }
        let _ = self.child.wait().await;
        if let Some(handle) = self.stderr.take() {
            handle.abort();
        }
    }
}

/// Searches YouTube through `yt-dlp ytsearchN:`.
pub struct YtDlpSearch {
    config: YtDlpConfig,
}

impl YtDlpSearch {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    fn search_args(&self, query: &str) -> Vec<String> {
        vec![
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
            "--print".to_string(),
            "%(id)s\t%(title)s".to_string(),
            format!("ytsearch{}:{}", self.config.search_results.max(1), query),
        ]
    }
}

fn parse_search_output(stdout: &str) -> Vec<SearchResult> {
    stdout
        .lines()
        .filter_map(|line| {
            let (id, title) = line.split_once('\t')?;
            let (id, title) = (id.trim(), title.trim());
            (!id.is_empty() && !title.is_empty()).then(|| SearchResult {
                id: id.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl SearchProvider for YtDlpSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let output = Command::new(&self.config.binary)
            .args(self.search_args(query))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SearchError::Spawn {
                program: self.config.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("ytdlp: search {:?} failed: {}", query, stderr);
            return Err(SearchError::Process {
                query: query.to_string(),
                code: output.status.code(),
                stderr,
            });
        }

        let results = parse_search_output(&String::from_utf8_lossy(&output.stdout));
        debug!("ytdlp: {} results for {:?}", results.len(), query);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_args() {
        let source = YtDlpSource::new(YtDlpConfig::default());
        assert_eq!(
            source.stream_args("dQw4w9WgXcQ"),
            [
                "--quiet",
                "--no-playlist",
                "-f",
                "ba[ext=webm][acodec=opus]",
                "-o",
                "-",
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            ]
        );
    }

    #[test]
    fn test_full_urls_are_kept() {
        assert_eq!(watch_url("https://youtu.be/abc"), "https://youtu.be/abc");
    }

    #[test]
    fn test_search_args_and_parsing() {
        let search = YtDlpSearch::new(YtDlpConfig::default());
        assert_eq!(search.search_args("daft punk").last().map(String::as_str), Some("ytsearch5:daft punk"));

        let stdout = "abc123\tDaft Punk - Around the World\n\nbroken line\nxyz\t  \ndef456\tAir - Playground Love\n";
        assert_eq!(
            parse_search_output(stdout),
            [
                SearchResult {
                    id: "abc123".into(),
                    title: "Daft Punk - Around the World".into(),
                },
                SearchResult {
                    id: "def456".into(),
                    title: "Air - Playground Love".into(),
                },
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_format_errors_are_classified() {
        use std::os::unix::process::ExitStatusExt;

        let failed = ExitStatus::from_raw(1 << 8);
        let err = classify_exit(
            "id",
            "yt-dlp",
            failed,
            "ERROR: [youtube] id: Requested format is not available".into(),
        );
        assert!(matches!(err, SourceError::UnsupportedFormat(ref uri) if uri == "id"));

        let err = classify_exit("id", "yt-dlp", failed, "ERROR: Video unavailable\n".into());
        match err {
            SourceError::Process { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "ERROR: Video unavailable");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
