use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

/// Drops ANSI escape sequences so colour codes never reach the log file.
pub fn strip_ansi_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Append-only log file that keeps roughly the last `max_lines` lines.
///
/// Trimming happens after every tenth of `max_lines` appended lines (at
/// least 50), so the file may briefly exceed the cap.
#[derive(Clone)]
pub struct LineCappedWriter {
    path: Arc<PathBuf>,
    max_lines: usize,
    pending: Arc<Mutex<usize>>,
}

impl LineCappedWriter {
    pub fn new(path: impl AsRef<Path>, max_lines: u32) -> Self {
        Self {
            path: Arc::new(path.as_ref().to_path_buf()),
            max_lines: max_lines.max(1) as usize,
            pending: Arc::new(Mutex::new(0)),
        }
    }

    fn trim_threshold(&self) -> usize {
        (self.max_lines / 10).max(50)
    }

    /// Appends `msg`, reporting failures on stderr instead of the caller.
    pub fn append(&self, msg: &str) {
        if let Err(e) = self.write_bytes(msg.as_bytes()) {
            eprintln!("Failed to write log file {}: {}", self.path.display(), e);
        }
    }

    fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
        // Held for the whole append so trimming never races a writer.
        let mut pending = self.pending.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())?;
        file.write_all(buf)?;

        *pending += buf.iter().filter(|&&b| b == b'\n').count();
        if *pending >= self.trim_threshold() {
            *pending = 0;
            self.trim()?;
        }
        Ok(())
    }

    fn trim(&self) -> io::Result<()> {
        let content = match fs::read_to_string(self.path.as_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let lines: Vec<&str> = content.lines().collect();
        if lines.len() <= self.max_lines {
            return Ok(());
        }

        let mut kept = lines[lines.len() - self.max_lines..].join("\n");
        kept.push('\n');
        fs::write(self.path.as_path(), kept)
    }
}

impl Write for LineCappedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LineCappedWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
